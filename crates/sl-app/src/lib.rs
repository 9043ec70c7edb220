//! Snaplog Application Orchestration Layer
//!
//! This crate contains the use cases that tie the ports together: ingesting a
//! new screenshot, uploading it, serving thumbnails, looking up records and
//! driving the watcher lifecycle.

pub mod deps;
pub mod events;
pub mod retry;
pub mod usecases;

pub use deps::AppDeps;
pub use events::{PipelineEvent, PipelineEvents};
pub use retry::RetryPolicy;
