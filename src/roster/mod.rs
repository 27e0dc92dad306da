pub mod enricher;
pub mod fetcher;

use std::collections::BTreeMap;
use std::fmt;

use crate::error::SyncError;
use crate::graph::GraphClient;
use crate::graph::types::ChannelMember;
use crate::pool::WorkerPool;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Graph `userId` of a channel member.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct UserId(String);

impl UserId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberRecord {
    pub user_id: UserId,
    pub display_name: String,
    pub email: String,
    /// Filled in by the enricher; `None` when the lookup failed.
    pub department: Option<String>,
}

impl MemberRecord {
    /// Members without a `userId` (bots, guests without a directory entry)
    /// are not part of the roster.
    pub fn from_member(member: ChannelMember) -> Option<Self> {
        let user_id = member.user_id.filter(|id| !id.is_empty())?;
        Some(Self {
            user_id: UserId(user_id),
            display_name: member.display_name.unwrap_or_default(),
            email: member.email.unwrap_or_default(),
            department: None,
        })
    }
}

/// Team and channel whose members make up the roster.
#[derive(Debug, Clone)]
pub struct ChannelScope {
    pub team_id: String,
    pub channel_id: String,
}

/// Deduplicated roster, keyed and ordered by user id.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Roster {
    members: BTreeMap<UserId, MemberRecord>,
}

impl Roster {
    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn get(&self, user_id: &UserId) -> Option<&MemberRecord> {
        self.members.get(user_id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &MemberRecord> {
        self.members.values()
    }

    pub fn user_ids(&self) -> impl Iterator<Item = &UserId> {
        self.members.keys()
    }

    /// Insert or replace the record for its user id.
    pub fn upsert(&mut self, record: MemberRecord) {
        self.members.insert(record.user_id.clone(), record);
    }

    /// Returns `false` if the user is not in the roster.
    pub fn set_department(&mut self, user_id: &UserId, department: Option<String>) -> bool {
        match self.members.get_mut(user_id) {
            Some(record) => {
                record.department = department;
                true
            }
            None => false,
        }
    }

    pub fn with_department(&self) -> usize {
        self.iter().filter(|m| m.department.is_some()).count()
    }

    /// Records in user id order, as handed to persistence.
    pub fn to_records(&self) -> Vec<MemberRecord> {
        self.members.values().cloned().collect()
    }
}

impl FromIterator<MemberRecord> for Roster {
    fn from_iter<I: IntoIterator<Item = MemberRecord>>(iter: I) -> Self {
        let mut roster = Self::default();
        for record in iter {
            roster.upsert(record);
        }
        roster
    }
}

// ---------------------------------------------------------------------------
// fetch_all
// ---------------------------------------------------------------------------

/// Paginate the channel roster, then enrich every member with a department.
///
/// Both phases share one worker pool; enrichment starts only after every
/// reachable page has been merged.
#[tracing::instrument(skip(client, scope), fields(team_id = %scope.team_id, channel_id = %scope.channel_id), err)]
pub async fn fetch_all(
    client: &GraphClient,
    scope: &ChannelScope,
    workers: usize,
) -> Result<Roster, SyncError> {
    let pool = WorkerPool::new(workers);
    let mut roster = fetcher::fetch_roster(client, &pool, scope).await?;
    enricher::enrich_departments(client, &pool, &mut roster).await;
    Ok(roster)
}
