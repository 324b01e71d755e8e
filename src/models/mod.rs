mod api_key;
mod api_key_gen;
mod contract;
mod organization;
mod service;
mod user;
mod validators;

pub use api_key::*;
pub use api_key_gen::*;
pub use contract::*;
pub use organization::*;
pub use service::*;
pub use user::*;
