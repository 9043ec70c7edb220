//! # sl-infra
//!
//! Infrastructure adapters for the sl-core ports: PNG text chunk walking,
//! embedded metadata decoding, session log parsing and tailing, the upload
//! image transform, the two-tier thumbnail cache, the photo record store and
//! its key-value backends, and the outbox upload collaborator.

pub mod db;
pub mod fs;
pub mod imaging;
pub mod kv;
pub mod metadata;
pub mod photo;
pub mod png;
pub mod session_log;
pub mod thumbnail;
pub mod time;

pub use time::SystemClock;
