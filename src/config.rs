//! Runtime settings for the auth layer.
//!
//! Values come from defaults, then `AUTHWARE_*` environment variables; the server binary
//! layers CLI flags on top.

use chrono::{Duration, Utc};
use tracing::warn;

use crate::error::{AuthError, AuthResult};

pub const ENV_MECHS: &str = "AUTHWARE_BASIC_MECHS";
pub const ENV_SESSION_KEY: &str = "AUTHWARE_SESSION_KEY";
pub const ENV_SESSION_LIFETIME: &str = "AUTHWARE_SESSION_LIFETIME";
pub const ENV_LOGIN_PATH: &str = "AUTHWARE_LOGIN_PATH";
pub const ENV_LOGOUT_REDIRECT: &str = "AUTHWARE_LOGOUT_REDIRECT";

pub const DEFAULT_MECH: &str = "memory";
pub const DEFAULT_SESSION_LIFETIME: &str = "1h";

#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// Mechanism names in priority order.
    pub mechanisms: Vec<String>,
    /// Operator key material; `None` means generate an ephemeral key at startup.
    pub session_key: Option<String>,
    pub session_lifetime: Duration,
    /// Form field names read by the login handler.
    pub user_field: String,
    pub pass_field: String,
    /// Where a successful login goes when the request carries no usable `next`.
    pub default_next: String,
    /// Login page that the cookie flow redirects to.
    pub login_path: String,
    /// Where logout sends the caller.
    pub logout_redirect: String,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            mechanisms: vec![DEFAULT_MECH.to_string()],
            session_key: None,
            session_lifetime: Duration::hours(1),
            user_field: "username".into(),
            pass_field: "password".into(),
            default_next: "/".into(),
            login_path: "/login".into(),
            logout_redirect: "/".into(),
        }
    }
}

impl AuthConfig {
    pub fn from_env() -> AuthResult<Self> {
        Self::from_lookup(|k| std::env::var(k).ok())
    }

    /// Same as [`AuthConfig::from_env`] over an arbitrary variable source.
    pub fn from_lookup<F: Fn(&str) -> Option<String>>(lookup: F) -> AuthResult<Self> {
        let mut cfg = Self::default();

        match lookup(ENV_MECHS).map(|v| parse_mechanisms(&v)) {
            Some(list) if !list.is_empty() => cfg.mechanisms = list,
            _ => warn!(list = ?cfg.mechanisms, "no auth mechanisms specified, defaulting to built in list"),
        }

        cfg.session_key = lookup(ENV_SESSION_KEY).filter(|s| !s.is_empty());

        let lifetime = lookup(ENV_SESSION_LIFETIME).unwrap_or_else(|| DEFAULT_SESSION_LIFETIME.to_string());
        cfg.session_lifetime = parse_duration(&lifetime)?;

        if let Some(p) = lookup(ENV_LOGIN_PATH).filter(|s| !s.is_empty()) { cfg.login_path = p; }
        if let Some(p) = lookup(ENV_LOGOUT_REDIRECT).filter(|s| !s.is_empty()) { cfg.logout_redirect = p; }
        Ok(cfg)
    }

    pub fn with_mechanisms<S: Into<String>>(mut self, mechs: impl IntoIterator<Item = S>) -> Self {
        self.mechanisms = mechs.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_session_key<S: Into<String>>(mut self, key: S) -> Self {
        self.session_key = Some(key.into());
        self
    }

    pub fn with_session_lifetime(mut self, lifetime: Duration) -> Self {
        self.session_lifetime = lifetime;
        self
    }

    pub fn with_form_fields<S: Into<String>>(mut self, user_field: S, pass_field: S) -> Self {
        self.user_field = user_field.into();
        self.pass_field = pass_field.into();
        self
    }

    pub fn with_default_next<S: Into<String>>(mut self, path: S) -> Self {
        self.default_next = path.into();
        self
    }

    pub fn with_login_path<S: Into<String>>(mut self, path: S) -> Self {
        self.login_path = path.into();
        self
    }

    pub fn with_logout_redirect<S: Into<String>>(mut self, path: S) -> Self {
        self.logout_redirect = path.into();
        self
    }
}

/// Split a `:`-separated mechanism list, dropping empty entries.
pub fn parse_mechanisms(s: &str) -> Vec<String> {
    s.split(':').map(str::trim).filter(|m| !m.is_empty()).map(str::to_string).collect()
}

/// Parse durations such as `1h`, `90m`, `1h30m`, `45s`, `500ms` or bare seconds (`3600`).
/// The result must be positive and small enough that a session issued now, plus the
/// cookie grace minute, still has a representable expiry.
pub fn parse_duration(s: &str) -> AuthResult<Duration> {
    let s = s.trim();
    let bad = || AuthError::Config(format!("invalid duration '{}'", s));
    if s.is_empty() { return Err(bad()); }

    let total = if let Ok(secs) = s.parse::<i64>() {
        Duration::try_seconds(secs).ok_or_else(bad)?
    } else {
        let mut total = Duration::zero();
        let mut rest = s;
        while !rest.is_empty() {
            let digits = rest.find(|c: char| !c.is_ascii_digit()).ok_or_else(bad)?;
            if digits == 0 { return Err(bad()); }
            let n: i64 = rest[..digits].parse().map_err(|_| bad())?;
            rest = &rest[digits..];
            let unit_len = rest.find(|c: char| c.is_ascii_digit()).unwrap_or(rest.len());
            let part = match &rest[..unit_len] {
                "h" => Duration::try_hours(n),
                "m" => Duration::try_minutes(n),
                "s" => Duration::try_seconds(n),
                "ms" => Duration::try_milliseconds(n),
                _ => return Err(bad()),
            }
            .ok_or_else(bad)?;
            total = total.checked_add(&part).ok_or_else(bad)?;
            rest = &rest[unit_len..];
        }
        total
    };

    if total <= Duration::zero() { return Err(bad()); }
    let fits = total
        .checked_add(&Duration::minutes(1))
        .and_then(|d| Utc::now().checked_add_signed(d))
        .is_some();
    if !fits {
        return Err(AuthError::Config(format!("duration '{}' is too long", s)));
    }
    Ok(total)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |k| map.get(k).cloned()
    }

    #[test]
    fn durations() {
        assert_eq!(parse_duration("1h").unwrap(), Duration::hours(1));
        assert_eq!(parse_duration("90m").unwrap(), Duration::minutes(90));
        assert_eq!(parse_duration("1h30m").unwrap(), Duration::minutes(90));
        assert_eq!(parse_duration("45s").unwrap(), Duration::seconds(45));
        assert_eq!(parse_duration("1500ms").unwrap(), Duration::milliseconds(1500));
        assert_eq!(parse_duration("3600").unwrap(), Duration::hours(1));
        for bad in ["", "h", "1d", "abc", "0", "0s", "-5", "1h30"] {
            assert!(parse_duration(bad).is_err(), "accepted {bad:?}");
        }
    }

    #[test]
    fn oversized_durations_are_config_errors() {
        for big in ["99999999999999h", "10000000000h", "9223372036854775807", "9223372036854775807ms9223372036854775807ms", "99999999999999999999s"] {
            assert!(matches!(parse_duration(big), Err(AuthError::Config(_))), "accepted {big:?}");
        }
        assert_eq!(parse_duration("8760h").unwrap(), Duration::days(365));
    }

    #[test]
    fn oversized_lifetime_env_fails_config() {
        let res = AuthConfig::from_lookup(lookup_from(&[(ENV_SESSION_LIFETIME, "99999999999999h")]));
        assert!(matches!(res, Err(AuthError::Config(_))));
    }

    #[test]
    fn mechanisms_split_on_colon() {
        assert_eq!(parse_mechanisms("ldap:htpasswd"), vec!["ldap", "htpasswd"]);
        assert_eq!(parse_mechanisms("pam::netauth:"), vec!["pam", "netauth"]);
        assert!(parse_mechanisms("").is_empty());
    }

    #[test]
    fn env_defaults() {
        let cfg = AuthConfig::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(cfg.mechanisms, vec![DEFAULT_MECH.to_string()]);
        assert_eq!(cfg.session_lifetime, Duration::hours(1));
        assert!(cfg.session_key.is_none());
        assert_eq!(cfg.login_path, "/login");
    }

    #[test]
    fn env_overrides() {
        let cfg = AuthConfig::from_lookup(lookup_from(&[
            (ENV_MECHS, "ldap:memory"),
            (ENV_SESSION_KEY, "s3cret"),
            (ENV_SESSION_LIFETIME, "15m"),
            (ENV_LOGIN_PATH, "/signin"),
            (ENV_LOGOUT_REDIRECT, "/bye"),
        ])).unwrap();
        assert_eq!(cfg.mechanisms, vec!["ldap", "memory"]);
        assert_eq!(cfg.session_key.as_deref(), Some("s3cret"));
        assert_eq!(cfg.session_lifetime, Duration::minutes(15));
        assert_eq!(cfg.login_path, "/signin");
        assert_eq!(cfg.logout_redirect, "/bye");
    }

    #[test]
    fn empty_key_means_ephemeral() {
        let cfg = AuthConfig::from_lookup(lookup_from(&[(ENV_SESSION_KEY, "")])).unwrap();
        assert!(cfg.session_key.is_none());
    }

    #[test]
    fn bad_lifetime_is_config_error() {
        let res = AuthConfig::from_lookup(lookup_from(&[(ENV_SESSION_LIFETIME, "forever")]));
        assert!(matches!(res, Err(AuthError::Config(_))));
    }
}
