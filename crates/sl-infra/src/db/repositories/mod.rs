mod kv_repo;

pub use kv_repo::*;
