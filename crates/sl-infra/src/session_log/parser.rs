//! Session log grammar.
//!
//! Only the newest session matters. Its window starts at the earlier of the
//! last `Joining wrld_` line and the last `Entering Room:` line, which covers
//! both orders the producer writes those two lines in. Inside the window:
//!
//! - the room name comes from the last room marker line
//! - the world comes from the last `Joining` line, matched against
//!   [`JOIN_RULES`] in order (first match wins)
//! - the roster is the fold of every join/leave line, in file order

use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use sl_core::photo::{AccessType, Identity, Roster, SessionMetadata, WorldDescriptor};

const JOIN_MARKER: &str = "Joining wrld_";
const ROOM_MARKER: &str = "Entering Room:";
const LEFT_ROOM_MARKER: &str = "OnLeftRoom";

static ROOM_NAME: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?:Entering Room|Joining or Creating Room): (?P<name>.+?)\s*$")
        .expect("room name pattern is valid")
});

static BARE_WORLD_ID: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"Joining (?P<world>wrld_[^:~\s]+)").expect("world id pattern is valid"));

static PLAYER_JOINED: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"OnPlayerJoined (?P<name>.+?) \((?P<id>usr_[^)\s]+)\)\s*$")
        .expect("join pattern is valid")
});

static PLAYER_LEFT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"OnPlayerLeft (?P<name>.+?) \((?P<id>usr_[^)\s]+)\)\s*$")
        .expect("leave pattern is valid")
});

static LEFT_ROOM: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\bOnLeftRoom\s*$").expect("left room pattern is valid"));

/// One world-join dialect.
pub struct JoinRule {
    pub name: &'static str,
    pattern: Regex,
    can_request_invite: bool,
    invite_only: bool,
}

const HEAD: &str = r"Joining (?P<world>wrld_[^:~\s]+):(?P<instance>[^~\s]+)";
const OWNER: &str = r"~(?P<owner_kind>private|friends|hidden)\((?P<owner>[^)]+)\)";
const GROUP: &str = r"~group\((?P<group>[^)]+)\)~groupAccessType\((?P<group_access>[^)]+)\)";
const REGION: &str = r"~region\((?P<region>[^)]+)\)\s*$";

fn rule(name: &'static str, body: String, can_request_invite: bool, invite_only: bool) -> JoinRule {
    JoinRule {
        name,
        pattern: Regex::new(&body).expect("join rule pattern is valid"),
        can_request_invite,
        invite_only,
    }
}

/// Most field-rich dialect first.
pub static JOIN_RULES: Lazy<Vec<JoinRule>> = Lazy::new(|| {
    vec![
        rule(
            "owner_region_invite",
            format!("{HEAD}{OWNER}~canRequestInvite{REGION}"),
            true,
            false,
        ),
        rule("owner_region", format!("{HEAD}{OWNER}{REGION}"), false, false),
        rule(
            "group_region_invite_only",
            format!("{HEAD}{GROUP}~inviteOnly{REGION}"),
            false,
            true,
        ),
        rule("group_region", format!("{HEAD}{GROUP}{REGION}"), false, false),
        rule("region_only", format!("{HEAD}{REGION}"), false, false),
    ]
});

impl JoinRule {
    fn apply(&self, line: &str, room_name: &str) -> Option<WorldDescriptor> {
        let caps = self.pattern.captures(line)?;
        Some(self.descriptor(&caps, room_name))
    }

    fn descriptor(&self, caps: &Captures<'_>, room_name: &str) -> WorldDescriptor {
        let text = |name: &str| caps.name(name).map(|m| m.as_str().to_string());

        let group_id = text("group");
        let access_type = match (caps.name("owner_kind"), &group_id) {
            (Some(kind), _) => AccessType::from_instance_tag(kind.as_str()).unwrap_or_default(),
            (None, Some(_)) if self.invite_only => AccessType::InviteOnly,
            (None, Some(_)) => AccessType::Group,
            (None, None) => AccessType::Public,
        };

        let mut world = WorldDescriptor::new(room_name, text("world").unwrap_or_default());
        world.instance_id = text("instance");
        world.access_type = Some(access_type);
        world.owner_id = text("owner");
        world.group_id = group_id;
        world.group_access_type = text("group_access");
        world.region = text("region");
        world.can_request_invite = self.can_request_invite.then_some(true);
        world.invite_only = self.invite_only.then_some(true);
        world
    }
}

/// A presence event in the log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RosterEvent {
    Joined(Identity),
    Left(String),
    /// The local user left the room; everyone else is gone too.
    LeftRoom,
}

impl RosterEvent {
    pub fn from_line(line: &str) -> Option<Self> {
        if let Some(caps) = PLAYER_JOINED.captures(line) {
            return Some(RosterEvent::Joined(Identity::new(&caps["id"], &caps["name"])));
        }
        if let Some(caps) = PLAYER_LEFT.captures(line) {
            return Some(RosterEvent::Left(caps["id"].to_string()));
        }
        LEFT_ROOM.is_match(line).then_some(RosterEvent::LeftRoom)
    }
}

/// Fold presence events in order.
pub fn reduce_roster<I>(events: I) -> Roster
where
    I: IntoIterator<Item = RosterEvent>,
{
    events.into_iter().fold(Roster::new(), |mut roster, event| {
        match event {
            RosterEvent::Joined(identity) => roster.upsert(identity),
            RosterEvent::Left(id) => {
                roster.remove(&id);
            }
            RosterEvent::LeftRoom => roster.clear(),
        }
        roster
    })
}

/// The tail of `text` that belongs to the newest session, if any.
///
/// The window starts at the earlier of the last join and last room-entry
/// lines, but never before the room exit that precedes the newest marker.
pub fn session_window(text: &str) -> Option<&str> {
    let markers = [text.rfind(JOIN_MARKER), text.rfind(ROOM_MARKER)];
    let newest = markers.into_iter().flatten().max()?;
    let floor = text[..newest]
        .rfind(LEFT_ROOM_MARKER)
        .map(|idx| idx + LEFT_ROOM_MARKER.len())
        .unwrap_or(0);
    let start = markers
        .into_iter()
        .flatten()
        .filter(|&idx| idx >= floor)
        .min()
        .unwrap_or(newest);
    let line_start = text[..start].rfind('\n').map(|idx| idx + 1).unwrap_or(0);
    Some(&text[line_start..])
}

/// Extract the newest session from a log. Never fails.
pub fn parse_session(text: &str) -> SessionMetadata {
    let Some(window) = session_window(text) else {
        return SessionMetadata::empty();
    };

    let room_name = window
        .lines()
        .filter_map(|line| ROOM_NAME.captures(line))
        .last()
        .map(|caps| caps["name"].to_string());

    let join_line = window.lines().filter(|line| line.contains(JOIN_MARKER)).last();

    let world = join_line.and_then(|line| {
        let name = room_name.as_deref().unwrap_or_default();
        JOIN_RULES
            .iter()
            .find_map(|rule| rule.apply(line, name))
            .or_else(|| {
                let room = room_name.as_deref()?;
                let caps = BARE_WORLD_ID.captures(line)?;
                Some(WorldDescriptor::new(room, &caps["world"]))
            })
    });

    let players = reduce_roster(window.lines().filter_map(RosterEvent::from_line));

    SessionMetadata { world, players }
}
