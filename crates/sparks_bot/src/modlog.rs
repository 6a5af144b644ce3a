//! Members who just left, held briefly so a ban entry can show who they were.

use sparks_cache::ExpiringSet;
use std::time::Duration;
use tracing::debug;

/// What the ban log needs to know about a departed member.
#[derive(Debug, Clone, PartialEq, Eq, derive_new::new)]
pub struct LeftMember {
    /// User snowflake
    pub user_id: u64,
    /// Guild the member left
    pub guild_id: u64,
    /// Guild nickname, if one was set
    pub nickname: Option<String>,
    /// Roles held at departure
    pub role_ids: Vec<u64>,
}

/// Departed members, each dropped after the retention period.
///
/// The platform delivers the member-left event before the audit log entry
/// for a ban, so the ban handler looks the member up here.
#[derive(Debug)]
pub struct RecentlyLeftMembers {
    members: ExpiringSet<LeftMember>,
    retention: Duration,
}

impl RecentlyLeftMembers {
    /// Create an empty set keeping members for `retention`.
    pub fn new(retention: Duration) -> Self {
        Self {
            members: ExpiringSet::new(),
            retention,
        }
    }

    /// Remember a member who just left.
    pub fn store(&self, member: LeftMember) {
        debug!(
            user_id = member.user_id,
            guild_id = member.guild_id,
            "Holding departed member"
        );
        self.members.add_scheduled(member, self.retention);
    }

    /// Claim the departed member for a ban entry.
    ///
    /// The member is removed, so a second claim returns `None`.
    pub fn take(&self, guild_id: u64, user_id: u64) -> Option<LeftMember> {
        self.members
            .take_first(|member| member.guild_id == guild_id && member.user_id == user_id)
    }

    /// Whether the member is still held.
    pub fn contains(&self, guild_id: u64, user_id: u64) -> bool {
        self.members
            .any(|member| member.guild_id == guild_id && member.user_id == user_id)
    }

    /// Number of members held.
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Whether no member is held.
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}
