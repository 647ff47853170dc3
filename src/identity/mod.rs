//! Identity core: authenticator capability, mechanism registry, chained dispatch and
//! the sealed session envelope. HTTP concerns live in `crate::http`.

mod authenticator;
mod registry;
mod chain;
mod user;
mod session;
mod request_context;
#[cfg(test)]
pub(crate) mod testing;

pub use authenticator::{Authenticator, Factory, factory};
pub use registry::Registry;
pub use chain::Chain;
pub use user::User;
pub use session::{Session, SessionCodec};
pub use request_context::{AuthScheme, RequestContext};
