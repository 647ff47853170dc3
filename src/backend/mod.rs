//! Authenticator implementations shipped with the crate. Directory, PAM and remote
//! identity backends live outside this crate and only need to implement
//! [`crate::identity::Authenticator`].

pub mod memory;

pub use memory::{MemoryAuthenticator, hash_password};
