use std::collections::BTreeMap;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

/// A user present in a session.
///
/// Equality and hashing consider only `id`; display names change over time.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Identity {
    pub id: String,
    pub display_name: String,
}

impl Identity {
    pub fn new(id: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            display_name: display_name.into(),
        }
    }
}

impl PartialEq for Identity {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Identity {}

impl Hash for Identity {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

/// Set of identities keyed by id.
///
/// Iteration order is by id so serialized records are stable.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<Identity>", into = "Vec<Identity>")]
pub struct Roster {
    members: BTreeMap<String, String>,
}

impl Roster {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace the display name for `identity.id`.
    pub fn upsert(&mut self, identity: Identity) {
        self.members.insert(identity.id, identity.display_name);
    }

    /// Insert only when the id is not present yet. Returns `true` when added.
    pub fn insert_if_absent(&mut self, identity: Identity) -> bool {
        if self.members.contains_key(&identity.id) {
            return false;
        }
        self.members.insert(identity.id, identity.display_name);
        true
    }

    pub fn remove(&mut self, id: &str) -> bool {
        self.members.remove(id).is_some()
    }

    pub fn clear(&mut self) {
        self.members.clear();
    }

    pub fn contains(&self, id: &str) -> bool {
        self.members.contains_key(id)
    }

    pub fn display_name(&self, id: &str) -> Option<&str> {
        self.members.get(id).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = Identity> + '_ {
        self.members
            .iter()
            .map(|(id, name)| Identity::new(id.clone(), name.clone()))
    }

    /// Add every member of `other` whose id is missing here. Existing names win.
    pub fn union_with(&mut self, other: &Roster) {
        for (id, name) in &other.members {
            self.members
                .entry(id.clone())
                .or_insert_with(|| name.clone());
        }
    }
}

impl From<Vec<Identity>> for Roster {
    fn from(identities: Vec<Identity>) -> Self {
        identities.into_iter().collect()
    }
}

impl From<Roster> for Vec<Identity> {
    fn from(roster: Roster) -> Self {
        roster
            .members
            .into_iter()
            .map(|(id, display_name)| Identity { id, display_name })
            .collect()
    }
}

impl FromIterator<Identity> for Roster {
    fn from_iter<T: IntoIterator<Item = Identity>>(iter: T) -> Self {
        let mut roster = Roster::new();
        for identity in iter {
            roster.upsert(identity);
        }
        roster
    }
}
