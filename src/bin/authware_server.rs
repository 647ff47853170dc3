//!
//! authware demo server binary
//! ----------------------------
//! Starts the demo HTTP server. Configuration comes from `AUTHWARE_*` environment
//! variables, with CLI flags taking precedence.

use anyhow::{Context, Result};
use std::env;

use authware::config::{AuthConfig, parse_duration, parse_mechanisms};
use authware::http::AuthState;

fn parse_port_env(name: &str) -> Option<u16> {
    match env::var(name) {
        Ok(val) => val.parse::<u16>().ok(),
        Err(_) => None,
    }
}

fn arg_value(args: &[String], flag: &str) -> Option<String> {
    let mut i = 0;
    while i < args.len() {
        if args[i] == flag && i + 1 < args.len() {
            return Some(args[i + 1].clone());
        }
        i += 1;
    }
    None
}

fn has_flag(args: &[String], flag: &str) -> bool {
    args.iter().any(|a| a == flag)
}

#[tokio::main]
async fn main() -> Result<()> {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .try_init();

    let args: Vec<String> = env::args().collect();

    if has_flag(&args, "--help") || has_flag(&args, "-h") {
        println!("authware demo server\n\nUSAGE:\n  authware_server [--http-port N] [--mechs a:b] [--session-lifetime D]\n\nOPTIONS:\n  --http-port N           HTTP port (env: AUTHWARE_HTTP_PORT, default 8000)\n  --mechs a:b             Mechanisms in priority order (env: AUTHWARE_BASIC_MECHS, default memory)\n  --session-lifetime D    Session lifetime such as 1h or 30m (env: AUTHWARE_SESSION_LIFETIME, default 1h)\n\nAUTHWARE_SESSION_KEY sets the session key; without it a per-process key is generated.\n");
        return Ok(());
    }

    let default_http: u16 = 8000;
    let http_port = arg_value(&args, "--http-port")
        .and_then(|v| v.parse::<u16>().ok())
        .or_else(|| parse_port_env("AUTHWARE_HTTP_PORT"))
        .unwrap_or(default_http);

    let mut config = AuthConfig::from_env().context("While reading AUTHWARE_* environment")?
        .with_default_next("/logged-in/");
    if let Some(m) = arg_value(&args, "--mechs") {
        config = config.with_mechanisms(parse_mechanisms(&m));
    }
    if let Some(d) = arg_value(&args, "--session-lifetime") {
        config = config.with_session_lifetime(parse_duration(&d).context("While parsing --session-lifetime")?);
    }

    tracing::info!(
        mechanisms = ?config.mechanisms,
        session_lifetime_secs = config.session_lifetime.num_seconds(),
        http_port,
        "authware starting"
    );

    let registry = authware::server::demo_registry()?;
    tracing::info!(user = authware::server::DEMO_USER, password = authware::server::DEMO_PASSWORD, "memory backend demo credentials");
    let state = AuthState::from_registry(&registry, config).context("While initializing auth mechanisms")?;

    authware::server::run_with_port(http_port, state).await
}
