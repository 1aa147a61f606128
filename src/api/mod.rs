//! API Module
//!
//! HTTP adapters for the two services. Handlers validate and translate;
//! all semantics live in the cache engine and the store manager.

pub mod cache_handlers;
pub mod cache_routes;
pub mod rate_limit;
pub mod store_handlers;
pub mod store_routes;

pub use cache_handlers::CacheState;
pub use cache_routes::create_cache_router;
pub use rate_limit::RateLimiter;
pub use store_handlers::StoreState;
pub use store_routes::create_store_router;
