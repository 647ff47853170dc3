pub mod error;
pub mod config;
pub mod identity;
pub mod backend;
pub mod http;
pub mod server;

pub use error::{AuthError, AuthResult};
pub use identity::{Authenticator, Chain, Registry, Session, SessionCodec, User};
