//! Narrow repository traits through which the core consumes persistence.
//!
//! The authorization core only ever needs "look up a user by API key hash",
//! "look up an organization by API key hash", and "look up an organization
//! by id"; the remaining operations serve the CRUD surface.

mod contracts;
mod organizations;
mod services;
mod users;

pub use contracts::*;
pub use organizations::*;
pub use services::*;
pub use users::*;
