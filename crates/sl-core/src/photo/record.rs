use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::identity::Roster;
use super::session::SessionMetadata;
use super::world::WorldDescriptor;
use crate::ids::PhotoRecordKey;

/// An enriched screenshot.
///
/// Records are created the first time a screenshot is processed and are only
/// ever merged afterwards (see [`PhotoRecord::merge_from`]).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PhotoRecord {
    pub taken_at: DateTime<Utc>,
    pub filename: String,
    /// Server-owned view counter; only ever grows locally.
    #[serde(default)]
    pub views: u64,
    #[serde(default)]
    pub world: Option<WorldDescriptor>,
    #[serde(default)]
    pub players: Roster,
    #[serde(default)]
    pub local_path: Option<PathBuf>,
    #[serde(default)]
    pub gallery_url: Option<String>,
}

impl PhotoRecord {
    pub fn new(filename: impl Into<String>, taken_at: DateTime<Utc>) -> Self {
        Self {
            taken_at,
            filename: filename.into(),
            views: 0,
            world: None,
            players: Roster::new(),
            local_path: None,
            gallery_url: None,
        }
    }

    pub fn with_local_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.local_path = Some(path.into());
        self
    }

    pub fn with_session(mut self, session: SessionMetadata) -> Self {
        self.world = session.world;
        self.players = session.players;
        self
    }

    pub fn key(&self) -> PhotoRecordKey {
        PhotoRecordKey::for_photo(&self.filename, &self.taken_at)
    }

    pub fn session(&self) -> SessionMetadata {
        SessionMetadata {
            world: self.world.clone(),
            players: self.players.clone(),
        }
    }

    pub fn matches_path(&self, path: &Path) -> bool {
        self.local_path.as_deref() == Some(path)
    }

    pub fn matches_filename_fragment(&self, fragment: &str) -> bool {
        !fragment.is_empty() && self.filename.contains(fragment)
    }

    /// Merge `incoming` into `self`.
    ///
    /// Rules:
    /// - a populated field is never replaced by an empty one
    /// - world fields only fill gaps (same world) and players are unioned
    /// - `local_path` and `gallery_url` take the incoming value when present
    /// - `views` keeps the larger counter
    ///
    /// Merging the same record twice yields the same state as merging it once.
    /// Returns `true` when anything changed.
    pub fn merge_from(&mut self, incoming: &PhotoRecord) -> bool {
        let before = self.clone();

        self.world = match (self.world.take(), &incoming.world) {
            (Some(mine), Some(theirs)) => Some(mine.fill_gaps(theirs)),
            (Some(mine), None) => Some(mine),
            (None, theirs) => theirs.clone(),
        };
        self.players.union_with(&incoming.players);
        if incoming.local_path.is_some() {
            self.local_path = incoming.local_path.clone();
        }
        if incoming.gallery_url.is_some() {
            self.gallery_url = incoming.gallery_url.clone();
        }
        self.views = self.views.max(incoming.views);

        *self != before
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::photo::Identity;
    use chrono::TimeZone;

    fn taken_at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap()
    }

    fn incoming() -> PhotoRecord {
        let mut record = PhotoRecord::new("VRChat_a.png", taken_at())
            .with_local_path("/photos/VRChat_a.png");
        let mut world = WorldDescriptor::new("TestWorld", "wrld_1");
        world.region = Some("us".into());
        record.world = Some(world);
        record.players = vec![Identity::new("usr_2", "Alice")].into();
        record.gallery_url = Some("https://gallery/1".into());
        record.views = 3;
        record
    }

    #[test]
    fn merge_fills_gaps_without_clearing() {
        let mut existing = PhotoRecord::new("VRChat_a.png", taken_at());
        existing.players = vec![Identity::new("usr_9", "Zed")].into();

        let empty = PhotoRecord::new("VRChat_a.png", taken_at());
        assert!(!existing.merge_from(&empty));
        assert_eq!(existing.players.len(), 1);

        assert!(existing.merge_from(&incoming()));
        assert_eq!(existing.players.len(), 2);
        assert_eq!(existing.world.as_ref().unwrap().region.as_deref(), Some("us"));
        assert_eq!(existing.gallery_url.as_deref(), Some("https://gallery/1"));
    }

    #[test]
    fn merge_is_idempotent() {
        let mut once = PhotoRecord::new("VRChat_a.png", taken_at());
        once.merge_from(&incoming());
        let mut twice = once.clone();
        let changed = twice.merge_from(&incoming());

        assert!(!changed);
        assert_eq!(once, twice);
    }

    #[test]
    fn gallery_url_can_be_refreshed_but_not_cleared() {
        let mut record = incoming();
        let mut refresh = PhotoRecord::new("VRChat_a.png", taken_at());
        refresh.gallery_url = Some("https://gallery/2".into());
        record.merge_from(&refresh);
        assert_eq!(record.gallery_url.as_deref(), Some("https://gallery/2"));

        record.merge_from(&PhotoRecord::new("VRChat_a.png", taken_at()));
        assert_eq!(record.gallery_url.as_deref(), Some("https://gallery/2"));
    }

    #[test]
    fn views_never_decrease() {
        let mut record = incoming();
        let mut stale = record.clone();
        stale.views = 1;
        record.merge_from(&stale);
        assert_eq!(record.views, 3);
    }

    #[test]
    fn record_serializes_in_camel_case() {
        let json = serde_json::to_value(incoming()).unwrap();
        assert!(json.get("takenAt").is_some());
        assert!(json.get("galleryUrl").is_some());
        let back: PhotoRecord = serde_json::from_value(json).unwrap();
        assert_eq!(back, incoming());
    }
}
