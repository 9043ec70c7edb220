mod kv_entry_row;

pub use kv_entry_row::{KvEntryRow, NewKvEntryRow};
