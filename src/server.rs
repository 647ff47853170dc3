//!
//! authware demo HTTP server
//! --------------------------
//! Axum router wiring the auth middleware onto a handful of demo routes:
//!
//! - `/`            public landing page
//! - `/basic/`      HTTP Basic protected
//! - `/login`       login page (GET) and form handler (POST)
//! - `/logged-in/`  session cookie protected
//! - `/multi/`      Basic or session cookie
//! - `/logout`      clears the session cookie

use std::net::SocketAddr;

use anyhow::Context;
use axum::middleware::from_fn_with_state;
use axum::response::Html;
use axum::routing::get;
use axum::Router;
use tracing::info;

use crate::backend::MemoryAuthenticator;
use crate::http::{AuthState, RequestContext, login_form, logout, require_any, require_basic, require_session};
use crate::identity::Registry;

pub const DEMO_USER: &str = "user";
pub const DEMO_PASSWORD: &str = "password";

const LOGIN_PAGE: &str = r#"<html>
<body>
<form method="post">
Username: <input type="text" name="username" /><br />
Password: <input type="password" name="password" /><br />
<input type="submit" />
</form>
</body>
</html>
"#;

/// Registry with the built-in `memory` mechanism seeded with the demo account.
pub fn demo_registry() -> anyhow::Result<Registry> {
    let memory = MemoryAuthenticator::new("memory").with_user(DEMO_USER, DEMO_PASSWORD, ["users"])?;
    let mut registry = Registry::new();
    registry.register("memory", memory.factory());
    Ok(registry)
}

pub fn router(state: AuthState) -> Router {
    let basic: Router<AuthState> = Router::new()
        .route("/basic/", get(secure_landing))
        .route_layer(from_fn_with_state(state.clone(), require_basic));
    let logged_in: Router<AuthState> = Router::new()
        .route("/logged-in/", get(secure_landing))
        .route_layer(from_fn_with_state(state.clone(), require_session));
    let multi: Router<AuthState> = Router::new()
        .route("/multi/", get(secure_landing))
        .route_layer(from_fn_with_state(state.clone(), require_any));

    Router::new()
        .route("/", get(root_landing))
        .route("/login", get(login_page).post(login_form))
        .route("/logout", get(logout).post(logout))
        .merge(basic)
        .merge(logged_in)
        .merge(multi)
        .with_state(state)
}

/// Serve the demo router on `0.0.0.0:<port>` until Ctrl-C.
pub async fn run_with_port(http_port: u16, state: AuthState) -> anyhow::Result<()> {
    let app = router(state);
    let addr: SocketAddr = format!("0.0.0.0:{}", http_port).parse()?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("While binding HTTP listener on {}", addr))?;
    info!("Demo is running on http://localhost:{}", http_port);
    info!("Try loading http://localhost:{}/basic/ for basic auth", http_port);
    info!("Try loading http://localhost:{}/logged-in/ for login auth", http_port);
    info!("Try loading http://localhost:{}/multi/ for multi-auth matching", http_port);
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("Shutting down...");
        })
        .await?;
    Ok(())
}

async fn root_landing() -> &'static str {
    "You've reached the webserver\n"
}

async fn login_page() -> Html<&'static str> {
    Html(LOGIN_PAGE)
}

async fn secure_landing(ctx: RequestContext) -> String {
    let mut out = String::from("You're on a secure prefix, this prefix is authenticated\n");
    out.push_str(&format!("You are authenticated as '{}' by '{}'\n", ctx.user.identity(), ctx.user.authed_by()));
    if !ctx.user.groups().is_empty() {
        out.push_str("You have membership in the following groups\n");
    }
    for g in ctx.user.groups() {
        out.push_str(&format!("  * {}\n", g));
    }
    out
}
