//! Credential resolution and per-request identity.

mod error;
mod identity;
mod resolver;

pub use error::AuthError;
pub use identity::{Identity, OrganizationIdentity, UserIdentity};
pub use resolver::CredentialResolver;
