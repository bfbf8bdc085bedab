//! Command implementations for the ontolink CLI

pub mod cache;
pub mod link;

pub use cache::{cmd_cache, CacheAction, CacheArgs};
pub use link::{cmd_link, LinkArgs};
