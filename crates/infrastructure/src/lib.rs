//! Infrastructure adapters for application ports.

#![forbid(unsafe_code)]

mod in_memory_cache_gateway;
mod in_memory_rbac_repository;
mod postgres_rbac_repository;
mod redis_cache_gateway;


pub use in_memory_cache_gateway::InMemoryCacheGateway;
pub use in_memory_rbac_repository::InMemoryRbacRepository;
pub use postgres_rbac_repository::PostgresRbacRepository;
pub use redis_cache_gateway::RedisCacheGateway;
