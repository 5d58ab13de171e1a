//! Authentication support: token acquisition and the local session blob.
//!
//! This crate never implements the identity provider's login flow; it
//! only reads credentials that flow already produced - either the cached
//! provider session in the OS keychain, or the dev session blob on disk.

pub mod session;
pub mod token;

pub use session::{SessionData, SessionStore};
pub use token::{AuthToken, TokenKind, TokenProvider};
