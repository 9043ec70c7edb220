//! Instance id grammar.
//!
//! An instance id is a `~`-joined list of segments:
//!
//! ```text
//! [wrld_<id>:]<name>[~<access>][~groupAccessType(<tag>)][~canRequestInvite][~inviteOnly][~region(<code>)]
//! ```
//!
//! `<access>` is `private(<usr>)`, `friends(<usr>)`, `hidden(<usr>)`,
//! `group(<grp>)` or a bare tag. Value segments are fixed-order but each is
//! optional; flag segments may appear anywhere. Unknown segments are skipped.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Who may join an instance. Derived from the instance id, never stored raw.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AccessType {
    #[default]
    Public,
    FriendsPlus,
    Friends,
    Private,
    Group,
    InviteOnly,
}

impl AccessType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AccessType::Public => "public",
            AccessType::FriendsPlus => "friends-plus",
            AccessType::Friends => "friends",
            AccessType::Private => "private",
            AccessType::Group => "group",
            AccessType::InviteOnly => "invite-only",
        }
    }

    /// Map an instance-id tag (`hidden`, `private`, ...) to an access type.
    pub fn from_instance_tag(tag: &str) -> Option<Self> {
        match tag {
            "public" => Some(AccessType::Public),
            "hidden" => Some(AccessType::FriendsPlus),
            "friends" => Some(AccessType::Friends),
            "private" => Some(AccessType::Private),
            "group" => Some(AccessType::Group),
            _ => None,
        }
    }

    fn instance_tag(&self) -> Option<&'static str> {
        match self {
            AccessType::Public | AccessType::InviteOnly => None,
            AccessType::FriendsPlus => Some("hidden"),
            AccessType::Friends => Some("friends"),
            AccessType::Private => Some("private"),
            AccessType::Group => Some("group"),
        }
    }
}

impl fmt::Display for AccessType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parsed instance id.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InstanceId {
    pub world_id: Option<String>,
    pub name: String,
    pub access_type: AccessType,
    pub owner_id: Option<String>,
    pub group_id: Option<String>,
    pub group_access_type: Option<String>,
    pub can_request_invite: bool,
    pub invite_only: bool,
    pub region: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Slot {
    Access,
    GroupAccess,
    Region,
    Done,
}

impl InstanceId {
    /// Parse an instance id. Never fails: unrecognised pieces are ignored.
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim();
        let (world_id, rest) = match raw.split_once(':') {
            Some((world, rest)) if world.starts_with("wrld_") => (Some(world.to_string()), rest),
            _ => (None, raw),
        };

        let mut segments = rest.split('~');
        let mut parsed = InstanceId {
            world_id,
            name: segments.next().unwrap_or_default().to_string(),
            ..Default::default()
        };

        let mut explicit_access: Option<AccessType> = None;
        let mut slot = Slot::Access;

        for segment in segments {
            match segment {
                "canRequestInvite" => {
                    parsed.can_request_invite = true;
                    continue;
                }
                "inviteOnly" => {
                    parsed.invite_only = true;
                    continue;
                }
                _ => {}
            }

            match split_call(segment) {
                Some((tag @ ("private" | "friends" | "hidden"), arg)) if slot <= Slot::Access => {
                    explicit_access = AccessType::from_instance_tag(tag);
                    parsed.owner_id = Some(arg.to_string());
                    slot = Slot::GroupAccess;
                }
                Some(("group", arg)) if slot <= Slot::Access => {
                    explicit_access = Some(AccessType::Group);
                    parsed.group_id = Some(arg.to_string());
                    slot = Slot::GroupAccess;
                }
                Some(("groupAccessType", arg)) if slot <= Slot::GroupAccess => {
                    parsed.group_access_type = Some(arg.to_string());
                    slot = Slot::Region;
                }
                Some(("region", arg)) if slot <= Slot::Region => {
                    parsed.region = Some(arg.to_string());
                    slot = Slot::Done;
                }
                Some(_) => {}
                None if slot == Slot::Access => {
                    if let Some(access) = AccessType::from_instance_tag(segment) {
                        explicit_access = Some(access);
                        slot = Slot::GroupAccess;
                    }
                }
                None => {}
            }
        }

        parsed.access_type = match explicit_access {
            Some(AccessType::Group) if parsed.invite_only => AccessType::InviteOnly,
            Some(access) => access,
            None if parsed.invite_only => AccessType::InviteOnly,
            None => AccessType::Public,
        };
        parsed
    }

    /// Render back into the `~`-joined grammar accepted by [`InstanceId::parse`].
    pub fn compose(&self) -> String {
        let mut out = String::new();
        if let Some(world_id) = &self.world_id {
            out.push_str(world_id);
            out.push(':');
        }
        out.push_str(&self.name);

        if let Some(group_id) = &self.group_id {
            out.push_str(&format!("~group({group_id})"));
            if let Some(group_access) = &self.group_access_type {
                out.push_str(&format!("~groupAccessType({group_access})"));
            }
        } else if let Some(tag) = self.access_type.instance_tag() {
            match &self.owner_id {
                Some(owner) => out.push_str(&format!("~{tag}({owner})")),
                None => out.push_str(&format!("~{tag}")),
            }
        }

        if self.can_request_invite {
            out.push_str("~canRequestInvite");
        }
        if self.invite_only {
            out.push_str("~inviteOnly");
        }
        if let Some(region) = &self.region {
            out.push_str(&format!("~region({region})"));
        }
        out
    }
}

fn split_call(segment: &str) -> Option<(&str, &str)> {
    let body = segment.strip_suffix(')')?;
    let (tag, arg) = body.split_once('(')?;
    if tag.is_empty() {
        return None;
    }
    Some((tag, arg))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_full_private_instance() {
        let parsed = InstanceId::parse("wrld_123:456~private(usr_1)~canRequestInvite~region(us)");
        assert_eq!(parsed.world_id.as_deref(), Some("wrld_123"));
        assert_eq!(parsed.name, "456");
        assert_eq!(parsed.access_type, AccessType::Private);
        assert_eq!(parsed.owner_id.as_deref(), Some("usr_1"));
        assert!(parsed.can_request_invite);
        assert_eq!(parsed.region.as_deref(), Some("us"));
    }

    #[test]
    fn tolerates_missing_optional_segments() {
        let bare = InstanceId::parse("12345");
        assert_eq!(bare.name, "12345");
        assert_eq!(bare.access_type, AccessType::Public);
        assert_eq!(bare.region, None);

        let region_only = InstanceId::parse("12345~region(jp)");
        assert_eq!(region_only.access_type, AccessType::Public);
        assert_eq!(region_only.region.as_deref(), Some("jp"));

        let no_region = InstanceId::parse("12345~hidden(usr_9)");
        assert_eq!(no_region.access_type, AccessType::FriendsPlus);
        assert_eq!(no_region.owner_id.as_deref(), Some("usr_9"));
        assert_eq!(no_region.region, None);
    }

    #[test]
    fn group_instances_keep_group_fields() {
        let parsed =
            InstanceId::parse("77~group(grp_abc)~groupAccessType(members)~inviteOnly~region(eu)");
        assert_eq!(parsed.group_id.as_deref(), Some("grp_abc"));
        assert_eq!(parsed.group_access_type.as_deref(), Some("members"));
        assert!(parsed.invite_only);
        assert_eq!(parsed.access_type, AccessType::InviteOnly);
        assert_eq!(parsed.region.as_deref(), Some("eu"));
    }

    #[test]
    fn out_of_order_value_segments_are_ignored() {
        let parsed = InstanceId::parse("1~region(us)~private(usr_1)");
        assert_eq!(parsed.region.as_deref(), Some("us"));
        assert_eq!(parsed.owner_id, None);
        assert_eq!(parsed.access_type, AccessType::Public);
    }

    #[test]
    fn unknown_segments_are_skipped() {
        let parsed = InstanceId::parse("1~private(usr_1)~nonce(abc)~strict~region(us)");
        assert_eq!(parsed.owner_id.as_deref(), Some("usr_1"));
        assert_eq!(parsed.region.as_deref(), Some("us"));
    }

    #[test]
    fn compose_round_trips_valid_subsets() {
        let samples = [
            "wrld_1:1",
            "wrld_1:1~region(us)",
            "wrld_1:1~private(usr_1)",
            "wrld_1:1~private(usr_1)~canRequestInvite~region(us)",
            "2~hidden(usr_2)~region(jp)",
            "3~friends(usr_3)",
            "4~group(grp_1)~groupAccessType(public)~region(eu)",
            "5~group(grp_1)~groupAccessType(members)~inviteOnly~region(eu)",
        ];
        for sample in samples {
            let parsed = InstanceId::parse(sample);
            assert_eq!(parsed.compose(), sample, "compose mismatch for {sample}");
            assert_eq!(InstanceId::parse(&parsed.compose()), parsed);
        }
    }
}
