//! Two-tier thumbnail cache.

mod cache;
mod disk_tier;
mod memory_tier;

pub use cache::ThumbnailCache;
pub use disk_tier::DiskTier;
pub use memory_tier::MemoryTier;
