mod cache;
mod repositories;

pub use cache::{CacheGateway, remember};
pub use repositories::{GrantOwner, PermissionGrantRepository, RoleAssignmentRepository};
