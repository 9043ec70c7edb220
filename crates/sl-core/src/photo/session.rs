use serde::{Deserialize, Serialize};

use super::identity::Roster;
use super::world::WorldDescriptor;

/// World + roster captured by one extraction.
///
/// Built fresh per extraction and only ever merged into photo records.
/// An empty value is a normal outcome (no session yet, no embedded data).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionMetadata {
    pub world: Option<WorldDescriptor>,
    pub players: Roster,
}

impl SessionMetadata {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.world.is_none() && self.players.is_empty()
    }

    /// Combine two extractions; `self` wins where both carry a value.
    pub fn merged_with(mut self, other: &SessionMetadata) -> SessionMetadata {
        self.world = match (self.world.take(), &other.world) {
            (Some(mine), Some(theirs)) => Some(mine.fill_gaps(theirs)),
            (Some(mine), None) => Some(mine),
            (None, theirs) => theirs.clone(),
        };
        self.players.union_with(&other.players);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::photo::Identity;

    #[test]
    fn empty_metadata_is_empty() {
        assert!(SessionMetadata::empty().is_empty());
    }

    #[test]
    fn merged_with_prefers_self_and_unions_players() {
        let embedded = SessionMetadata {
            world: Some(WorldDescriptor::new("Embedded", "wrld_1")),
            players: vec![Identity::new("usr_1", "Alice")].into(),
        };
        let live = SessionMetadata {
            world: Some(WorldDescriptor::new("Live", "wrld_1")),
            players: vec![Identity::new("usr_2", "Bob")].into(),
        };

        let merged = embedded.merged_with(&live);

        assert_eq!(merged.world.unwrap().name, "Embedded");
        assert_eq!(merged.players.len(), 2);
    }
}
