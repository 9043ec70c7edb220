use serde::{Deserialize, Serialize};

use super::instance::{AccessType, InstanceId};

/// The virtual world a session took place in.
///
/// Built once by an extractor and never mutated afterwards; merging produces a
/// new value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorldDescriptor {
    pub name: String,
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instance_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_type: Option<AccessType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_access_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub can_request_invite: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub invite_only: Option<bool>,
}

impl WorldDescriptor {
    /// Minimal descriptor with only a name and world id.
    pub fn new(name: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            id: id.into(),
            instance_id: None,
            access_type: None,
            region: None,
            owner_id: None,
            group_id: None,
            group_access_type: None,
            can_request_invite: None,
            invite_only: None,
        }
    }

    /// Build a descriptor from a parsed instance id.
    ///
    /// `world_id` wins over any id embedded in the instance string.
    pub fn from_instance(name: impl Into<String>, world_id: Option<&str>, instance: &InstanceId) -> Self {
        let id = world_id
            .map(str::to_string)
            .or_else(|| instance.world_id.clone())
            .unwrap_or_default();

        Self {
            name: name.into(),
            id,
            instance_id: (!instance.name.is_empty()).then(|| instance.name.clone()),
            access_type: Some(instance.access_type),
            region: instance.region.clone(),
            owner_id: instance.owner_id.clone(),
            group_id: instance.group_id.clone(),
            group_access_type: instance.group_access_type.clone(),
            can_request_invite: instance.can_request_invite.then_some(true),
            invite_only: instance.invite_only.then_some(true),
        }
    }

    /// Recreate the instance id grammar for this descriptor.
    pub fn to_instance(&self) -> InstanceId {
        InstanceId {
            world_id: (!self.id.is_empty()).then(|| self.id.clone()),
            name: self.instance_id.clone().unwrap_or_default(),
            access_type: self.access_type.unwrap_or_default(),
            owner_id: self.owner_id.clone(),
            group_id: self.group_id.clone(),
            group_access_type: self.group_access_type.clone(),
            can_request_invite: self.can_request_invite.unwrap_or(false),
            invite_only: self.invite_only.unwrap_or(false),
            region: self.region.clone(),
        }
    }

    /// Fill every empty field of `self` from `other` when both describe the same world.
    ///
    /// A descriptor of a different world is ignored: populated data is never replaced.
    pub fn fill_gaps(&self, other: &WorldDescriptor) -> WorldDescriptor {
        if !self.id.is_empty() && !other.id.is_empty() && self.id != other.id {
            return self.clone();
        }

        WorldDescriptor {
            name: if self.name.is_empty() {
                other.name.clone()
            } else {
                self.name.clone()
            },
            id: if self.id.is_empty() {
                other.id.clone()
            } else {
                self.id.clone()
            },
            instance_id: self.instance_id.clone().or_else(|| other.instance_id.clone()),
            access_type: self.access_type.or(other.access_type),
            region: self.region.clone().or_else(|| other.region.clone()),
            owner_id: self.owner_id.clone().or_else(|| other.owner_id.clone()),
            group_id: self.group_id.clone().or_else(|| other.group_id.clone()),
            group_access_type: self
                .group_access_type
                .clone()
                .or_else(|| other.group_access_type.clone()),
            can_request_invite: self.can_request_invite.or(other.can_request_invite),
            invite_only: self.invite_only.or(other.invite_only),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_instance_copies_grammar_fields() {
        let instance = InstanceId::parse("wrld_123:456~private(usr_1)~canRequestInvite~region(us)");
        let world = WorldDescriptor::from_instance("TestWorld", None, &instance);

        assert_eq!(world.id, "wrld_123");
        assert_eq!(world.instance_id.as_deref(), Some("456"));
        assert_eq!(world.access_type, Some(AccessType::Private));
        assert_eq!(world.owner_id.as_deref(), Some("usr_1"));
        assert_eq!(world.can_request_invite, Some(true));
        assert_eq!(world.invite_only, None);
        assert_eq!(world.region.as_deref(), Some("us"));
        assert_eq!(world.to_instance(), instance);
    }

    #[test]
    fn fill_gaps_keeps_populated_fields() {
        let mut existing = WorldDescriptor::new("Home", "wrld_1");
        existing.region = Some("us".to_string());
        let mut incoming = WorldDescriptor::new("", "wrld_1");
        incoming.region = Some("jp".to_string());
        incoming.owner_id = Some("usr_1".to_string());

        let merged = existing.fill_gaps(&incoming);

        assert_eq!(merged.name, "Home");
        assert_eq!(merged.region.as_deref(), Some("us"));
        assert_eq!(merged.owner_id.as_deref(), Some("usr_1"));
    }

    #[test]
    fn fill_gaps_ignores_other_world() {
        let existing = WorldDescriptor::new("Home", "wrld_1");
        let mut other = WorldDescriptor::new("Away", "wrld_2");
        other.region = Some("eu".to_string());

        assert_eq!(existing.fill_gaps(&other), existing);
    }
}
