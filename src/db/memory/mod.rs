//! In-memory repositories backing the dev server and the test suite.
//!
//! Backed by `DashMap`, so safe for concurrent use without external locking.
//! Production deployments bind their own implementations of the repo traits.

mod contracts;
mod organizations;
mod services;
mod users;

pub use contracts::MemoryContractRepo;
pub use organizations::MemoryOrganizationRepo;
pub use services::MemoryServiceRepo;
pub use users::MemoryUserRepo;
