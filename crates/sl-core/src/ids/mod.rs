//! ID type wrappers for type safety.

mod id_macro;
mod record_key;

pub use record_key::PhotoRecordKey;
