//! Request middleware: authentication, table authorization, org-role checks.

mod authn;
mod authz;
mod org_role;

pub use authn::authenticate;
pub use authz::authorize;
pub use org_role::{OrgAccess, OrgRoleResolver};
