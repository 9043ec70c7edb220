//! Decoder for the JSON payload a screenshot tool embeds in the PNG text chunk.
//!
//! ```json
//! {
//!   "application": "VRCX",
//!   "version": 1,
//!   "author": { "id": "usr_..", "displayName": ".." },
//!   "world": { "name": "..", "id": "wrld_..", "instanceId": "wrld_..:123~region(us)" },
//!   "players": [{ "id": "usr_..", "displayName": ".." }]
//! }
//! ```
//!
//! The raw JSON is checked once here; the rest of the system only sees
//! [`EmbeddedMetadata`] and [`SessionMetadata`]. Broken sub-objects are dropped
//! individually instead of failing the whole payload.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use sl_core::photo::{Identity, InstanceId, Roster, SessionMetadata, WorldDescriptor};

/// `application` value written by the producer we understand.
pub const PRODUCER: &str = "VRCX";

/// Text-chunk keyword the producer stores its payload under.
pub const METADATA_FIELD: &str = "Description";

pub const PAYLOAD_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerEntry {
    pub id: String,
    #[serde(default)]
    pub display_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorldBlock {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub instance_id: String,
}

/// Validated producer payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmbeddedMetadata {
    pub application: String,
    pub version: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<PlayerEntry>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub world: Option<WorldBlock>,
    #[serde(default)]
    pub players: Vec<PlayerEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseOutcome {
    Parsed(EmbeddedMetadata),
    /// Valid JSON written by some other application.
    ForeignProducer,
    /// Not JSON, not an object, or missing `application`/`version`.
    Malformed,
}

/// Parse the text extracted from the metadata chunk.
pub fn parse_embedded(text: &str) -> ParseOutcome {
    let value: Value = match serde_json::from_str(text.trim_end_matches('\0').trim()) {
        Ok(value) => value,
        Err(_) => return ParseOutcome::Malformed,
    };
    let Some(object) = value.as_object() else {
        return ParseOutcome::Malformed;
    };

    let Some(application) = object.get("application").and_then(Value::as_str) else {
        return ParseOutcome::Malformed;
    };
    if application != PRODUCER {
        return ParseOutcome::ForeignProducer;
    }
    let Some(version) = object.get("version").and_then(version_of) else {
        return ParseOutcome::Malformed;
    };

    let author = object
        .get("author")
        .and_then(|v| serde_json::from_value::<PlayerEntry>(v.clone()).ok())
        .filter(|p| !p.id.is_empty());
    let world = object
        .get("world")
        .and_then(|v| serde_json::from_value::<WorldBlock>(v.clone()).ok());
    let players = object
        .get("players")
        .and_then(Value::as_array)
        .map(|entries| {
            entries
                .iter()
                .filter_map(|v| serde_json::from_value::<PlayerEntry>(v.clone()).ok())
                .filter(|p| !p.id.is_empty())
                .collect()
        })
        .unwrap_or_default();

    ParseOutcome::Parsed(EmbeddedMetadata {
        application: application.to_string(),
        version,
        author,
        world,
        players,
    })
}

/// Accepts `1` as well as `"1"`.
fn version_of(value: &Value) -> Option<u32> {
    match value {
        Value::Number(n) => n.as_u64().and_then(|v| u32::try_from(v).ok()),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

impl EmbeddedMetadata {
    /// Build the payload the producer would have written for `session`.
    pub fn from_session(session: &SessionMetadata, author: Option<Identity>) -> Self {
        let world = session.world.as_ref().map(|world| WorldBlock {
            name: world.name.clone(),
            id: world.id.clone(),
            instance_id: if world.instance_id.is_some() {
                world.to_instance().compose()
            } else {
                String::new()
            },
        });

        Self {
            application: PRODUCER.to_string(),
            version: PAYLOAD_VERSION,
            author: author.map(|a| PlayerEntry {
                id: a.id,
                display_name: a.display_name,
            }),
            world,
            players: session
                .players
                .iter()
                .map(|p| PlayerEntry {
                    id: p.id,
                    display_name: p.display_name,
                })
                .collect(),
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    /// Map onto the canonical session shape.
    ///
    /// The author joins the roster only when no player entry shares its id.
    pub fn into_session(self) -> SessionMetadata {
        let world = self.world.and_then(|block| {
            if block.name.is_empty() && block.id.is_empty() {
                return None;
            }
            if block.instance_id.trim().is_empty() {
                return Some(WorldDescriptor::new(block.name, block.id));
            }
            let instance = InstanceId::parse(&block.instance_id);
            let world_id = (!block.id.is_empty()).then_some(block.id.as_str());
            Some(WorldDescriptor::from_instance(block.name.clone(), world_id, &instance))
        });

        let mut players: Roster = self
            .players
            .into_iter()
            .map(|p| Identity::new(p.id, p.display_name))
            .collect();
        if let Some(author) = self.author {
            players.insert_if_absent(Identity::new(author.id, author.display_name));
        }

        SessionMetadata { world, players }
    }
}
