// Service exports
pub mod cache;
pub mod coordinator;
pub mod postgres;

pub use cache::{CacheError, CacheKey, CacheManager};
pub use coordinator::{ConnectionRequest, CoordinatorError, CoordinatorService, HttpCoordinator};
pub use postgres::{RelationshipStore, StoreError};
