//! Application services and ports.

#![forbid(unsafe_code)]

mod authorization_service;
mod cache_keys;
mod membership_service;
mod name_query;
mod rbac_ports;
mod role_permission_service;

#[cfg(test)]
mod test_support;

pub use authorization_service::{AbilityCheck, AuthorizationService};
pub use cache_keys::CacheKeys;
pub use membership_service::MembershipService;
pub use name_query::NameQuery;
pub use rbac_ports::{
    CacheGateway, GrantOwner, PermissionGrantRepository, RoleAssignmentRepository, remember,
};
pub use role_permission_service::RolePermissionService;
