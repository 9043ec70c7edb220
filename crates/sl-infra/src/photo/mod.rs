mod record_store;

pub use record_store::{PhotoRecordStore, INDEX_KEY, RECORD_KEY_PREFIX};
