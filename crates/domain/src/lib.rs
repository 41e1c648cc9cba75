//! Domain entities and invariants.

#![forbid(unsafe_code)]

mod model_ref;
mod security;
mod user;

pub use model_ref::{ModelKey, ModelRef};
pub use security::{Permission, PermissionId, Role, RoleId, permission_matches};
pub use user::{RecordAttributes, User, UserId};
