use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::id_macro::impl_id;

/// Storage identity of a photo record: `(filename, takenAt)`.
///
/// The key is derived, never generated, so the same screenshot processed twice
/// always lands on the same record.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PhotoRecordKey(String);

impl_id!(PhotoRecordKey);

impl PhotoRecordKey {
    pub fn for_photo(filename: &str, taken_at: &DateTime<Utc>) -> Self {
        Self(format!("{}@{}", filename, taken_at.timestamp_millis()))
    }
}
