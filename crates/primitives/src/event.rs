//! Semantic event types and the attribute registry.

use std::{
    collections::BTreeMap,
    time::{SystemTime, UNIX_EPOCH},
};

use alloy_primitives::Address;

/// Category of a semantic event.
///
/// Closed set; the `u8` wire value is what the on-chain collaborator receives
/// in the `kinds` array of a batched call.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum EventKind {
    /// Gameplay action (runs, scores, pickups).
    PlayerAction = 0,
    /// Learning-module progress (lessons, certifications).
    EducationAction = 1,
    /// DeFi interaction (staking, pools, token flows).
    DefiAction = 2,
    /// Governance participation (proposals, votes).
    GovernanceAction = 3,
    /// Social/community activity (guilds, friends).
    SocialAction = 4,
}

impl EventKind {
    /// Wire value for contract calls.
    pub const fn wire(self) -> u8 {
        self as u8
    }

    /// Decode a wire value. Returns `None` for unknown kinds.
    pub const fn from_wire(value: u8) -> Option<Self> {
        match value {
            0 => Some(Self::PlayerAction),
            1 => Some(Self::EducationAction),
            2 => Some(Self::DefiAction),
            3 => Some(Self::GovernanceAction),
            4 => Some(Self::SocialAction),
            _ => None,
        }
    }
}

/// Attribute key with a built-in alias registry.
///
/// Well-known keys carry a short numeric alias used by the compression
/// strategies; anything else falls through to [`AttrKey::Custom`] and is
/// serialized under its original name.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum AttrKey {
    /// Run score.
    Score,
    /// Coins collected.
    Coins,
    /// Level reached.
    Level,
    /// Obstacles cleared.
    Obstacles,
    /// Power-ups used.
    Powerups,
    /// Learning module identifier.
    ModuleId,
    /// Certification identifier.
    CertificationId,
    /// Token amount (smallest unit).
    TokenAmount,
    /// Liquidity pool identifier.
    PoolId,
    /// Subnet identifier.
    SubnetId,
    /// Governance proposal identifier.
    ProposalId,
    /// Achievement identifier.
    AchievementId,
    /// Guild identifier.
    GuildId,
    /// Friend wallet address (as supplied by the caller).
    FriendAddress,
    /// Fallback for keys outside the registry; passes through unchanged.
    Custom(String),
}

impl AttrKey {
    /// Resolve a caller-supplied key name. Never fails; unknown names become
    /// [`AttrKey::Custom`].
    pub fn from_name(name: &str) -> Self {
        match name {
            "score" => Self::Score,
            "coins" => Self::Coins,
            "level" => Self::Level,
            "obstacles" => Self::Obstacles,
            "powerups" => Self::Powerups,
            "moduleId" => Self::ModuleId,
            "certificationId" => Self::CertificationId,
            "tokenAmount" => Self::TokenAmount,
            "poolId" => Self::PoolId,
            "subnetId" => Self::SubnetId,
            "proposalId" => Self::ProposalId,
            "achievementId" => Self::AchievementId,
            "guildId" => Self::GuildId,
            "friendAddress" => Self::FriendAddress,
            other => Self::Custom(other.to_string()),
        }
    }

    /// The key's original name.
    pub fn name(&self) -> &str {
        match self {
            Self::Score => "score",
            Self::Coins => "coins",
            Self::Level => "level",
            Self::Obstacles => "obstacles",
            Self::Powerups => "powerups",
            Self::ModuleId => "moduleId",
            Self::CertificationId => "certificationId",
            Self::TokenAmount => "tokenAmount",
            Self::PoolId => "poolId",
            Self::SubnetId => "subnetId",
            Self::ProposalId => "proposalId",
            Self::AchievementId => "achievementId",
            Self::GuildId => "guildId",
            Self::FriendAddress => "friendAddress",
            Self::Custom(name) => name,
        }
    }

    /// Numeric alias for the compression strategies.
    ///
    /// `Custom` keys have no alias and must pass through by name.
    pub const fn alias(&self) -> Option<u8> {
        match self {
            Self::Score => Some(0),
            Self::Coins => Some(1),
            Self::Level => Some(2),
            Self::Obstacles => Some(3),
            Self::Powerups => Some(4),
            Self::ModuleId => Some(5),
            Self::CertificationId => Some(6),
            Self::TokenAmount => Some(7),
            Self::PoolId => Some(8),
            Self::SubnetId => Some(9),
            Self::ProposalId => Some(10),
            Self::AchievementId => Some(11),
            Self::GuildId => Some(12),
            Self::FriendAddress => Some(13),
            Self::Custom(_) => None,
        }
    }
}

/// Attribute value: numbers or short strings.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AttrValue {
    /// Integer payload value.
    Int(i64),
    /// Text payload value.
    Text(String),
}

/// Open attribute mapping attached to a semantic event.
///
/// `BTreeMap` keeps iteration order deterministic, which the compression
/// strategies rely on.
pub type Attributes = BTreeMap<AttrKey, AttrValue>;

/// Caller-facing unit of work submitted to the pipeline.
#[derive(Clone, Debug)]
pub struct SemanticEvent {
    /// Event category.
    pub kind: EventKind,
    /// Originating wallet.
    pub actor: Address,
    /// Milliseconds since epoch, assigned at construction. Immutable.
    pub occurred_at: u64,
    /// Caller-supplied session/grouping id. Opaque to the pipeline.
    pub correlation_id: String,
    /// Payload to compress.
    pub attributes: Attributes,
    /// Urgency; higher values dispatch sooner.
    pub priority: u8,
}

impl SemanticEvent {
    /// Create an event timestamped at the current wall clock.
    pub fn new(
        kind: EventKind,
        actor: Address,
        correlation_id: impl Into<String>,
        attributes: Attributes,
        priority: u8,
    ) -> Self {
        Self {
            kind,
            actor,
            occurred_at: now_millis(),
            correlation_id: correlation_id.into(),
            attributes,
            priority,
        }
    }
}

/// Current wall-clock time in milliseconds since the Unix epoch.
pub fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case(EventKind::PlayerAction, 0)]
    #[case(EventKind::EducationAction, 1)]
    #[case(EventKind::DefiAction, 2)]
    #[case(EventKind::GovernanceAction, 3)]
    #[case(EventKind::SocialAction, 4)]
    fn event_kind_wire_roundtrip(#[case] kind: EventKind, #[case] wire: u8) {
        assert_eq!(kind.wire(), wire);
        assert_eq!(EventKind::from_wire(wire), Some(kind));
    }

    #[rstest]
    #[case(5)]
    #[case(255)]
    fn event_kind_unknown_wire(#[case] wire: u8) {
        assert_eq!(EventKind::from_wire(wire), None);
    }

    #[rstest]
    #[case("score", Some(0))]
    #[case("coins", Some(1))]
    #[case("level", Some(2))]
    #[case("obstacles", Some(3))]
    #[case("powerups", Some(4))]
    #[case("moduleId", Some(5))]
    #[case("certificationId", Some(6))]
    #[case("tokenAmount", Some(7))]
    #[case("poolId", Some(8))]
    #[case("subnetId", Some(9))]
    #[case("proposalId", Some(10))]
    #[case("achievementId", Some(11))]
    #[case("guildId", Some(12))]
    #[case("friendAddress", Some(13))]
    #[case("comboMultiplier", None)]
    fn attr_key_alias_table(#[case] name: &str, #[case] alias: Option<u8>) {
        let key = AttrKey::from_name(name);
        assert_eq!(key.alias(), alias);
        assert_eq!(key.name(), name);
    }

    #[test]
    fn attr_key_custom_preserves_name() {
        let key = AttrKey::from_name("sessionSeed");
        assert_eq!(key, AttrKey::Custom("sessionSeed".to_string()));
        assert_eq!(key.name(), "sessionSeed");
        assert_eq!(key.alias(), None);
    }

    #[test]
    fn semantic_event_new_assigns_timestamp() {
        let before = now_millis();
        let event = SemanticEvent::new(
            EventKind::PlayerAction,
            Address::repeat_byte(0x11),
            "session-1",
            Attributes::new(),
            3,
        );
        let after = now_millis();

        assert!(event.occurred_at >= before);
        assert!(event.occurred_at <= after);
        assert_eq!(event.correlation_id, "session-1");
        assert_eq!(event.priority, 3);
    }

    #[test]
    fn attributes_iterate_deterministically() {
        let mut attrs = Attributes::new();
        attrs.insert(AttrKey::Level, AttrValue::Int(2));
        attrs.insert(AttrKey::Score, AttrValue::Int(10));
        attrs.insert(AttrKey::Custom("seed".into()), AttrValue::Text("abc".into()));

        let first: Vec<_> = attrs.keys().cloned().collect();
        let second: Vec<_> = attrs.keys().cloned().collect();
        assert_eq!(first, second);
    }
}
