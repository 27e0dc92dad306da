use std::collections::{HashMap, HashSet};

use futures_util::StreamExt;
use futures_util::future::BoxFuture;
use futures_util::stream::FuturesUnordered;

use super::{ChannelScope, MemberRecord, Roster, UserId};
use crate::error::SyncError;
use crate::graph::types::{ChannelMember, MemberPage};
use crate::graph::{GraphClient, GraphError};
use crate::pool::{TaskError, WorkerPool};

// ---------------------------------------------------------------------------
// Merge state
// ---------------------------------------------------------------------------

/// Roster under construction.
///
/// Each page carries the sequence number it was discovered with (the first
/// page is 0). A record is only overwritten by an entry from a page with an
/// equal or later sequence number, so the later page wins even when pages
/// complete out of order.
#[derive(Debug, Default)]
pub(crate) struct RosterMerge {
    roster: Roster,
    origin: HashMap<UserId, u64>,
}

impl RosterMerge {
    /// Merge one page's entries; returns how many records were written.
    pub(crate) fn merge_page(&mut self, seq: u64, members: Vec<ChannelMember>) -> usize {
        let mut written = 0;
        for record in members.into_iter().filter_map(MemberRecord::from_member) {
            let newer = self
                .origin
                .get(&record.user_id)
                .is_none_or(|&existing| seq >= existing);
            if newer {
                self.origin.insert(record.user_id.clone(), seq);
                self.roster.upsert(record);
                written += 1;
            }
        }
        written
    }

    pub(crate) fn finish(self) -> Roster {
        self.roster
    }
}

// ---------------------------------------------------------------------------
// Link bookkeeping
// ---------------------------------------------------------------------------

/// Visited set for continuation links. A link is claimed at most once, at
/// submission time, so the same link can never be in flight twice.
#[derive(Debug, Default)]
pub(crate) struct LinkTracker {
    visited: HashSet<String>,
    next_seq: u64,
}

impl LinkTracker {
    /// Mark `link` visited. Returns the page sequence number for a new link,
    /// `None` if it was seen before.
    pub(crate) fn claim(&mut self, link: &str) -> Option<u64> {
        if link.is_empty() || !self.visited.insert(link.to_owned()) {
            return None;
        }
        let seq = self.next_seq;
        self.next_seq += 1;
        Some(seq)
    }

    pub(crate) fn visited(&self) -> usize {
        self.visited.len()
    }
}

// ---------------------------------------------------------------------------
// Fetcher
// ---------------------------------------------------------------------------

type PageResult = ((u64, String), Result<Result<MemberPage, GraphError>, TaskError>);

fn submit_page(
    client: &GraphClient,
    pool: &WorkerPool,
    seq: u64,
    link: String,
) -> BoxFuture<'static, PageResult> {
    let client = client.clone();
    let url = link.clone();
    pool.submit_keyed((seq, link), async move { client.member_page(&url).await })
}

/// Fetch the deduplicated channel roster.
///
/// The first page is fetched inline and is fatal on failure. Continuation
/// links are then drained as a work queue on `pool`: every newly seen link is
/// submitted as soon as it is discovered, and a failed page only loses its
/// own entries.
#[tracing::instrument(skip(client, pool, scope), fields(team_id = %scope.team_id, channel_id = %scope.channel_id), err)]
pub async fn fetch_roster(
    client: &GraphClient,
    pool: &WorkerPool,
    scope: &ChannelScope,
) -> Result<Roster, SyncError> {
    let first_url = client.members_url(&scope.team_id, &scope.channel_id);

    let mut links = LinkTracker::default();
    let first_seq = links.claim(first_url.as_str()).unwrap_or_default();

    let first = client
        .member_page(first_url.as_str())
        .await
        .map_err(SyncError::FatalFetch)?;

    let mut merge = RosterMerge::default();
    merge.merge_page(first_seq, first.value);

    let mut in_flight = FuturesUnordered::new();
    if let Some(link) = first.next_link
        && let Some(seq) = links.claim(&link)
    {
        in_flight.push(submit_page(client, pool, seq, link));
    }

    let mut failed_pages = 0_usize;
    while let Some(((seq, link), result)) = in_flight.next().await {
        let page = match result {
            Ok(Ok(page)) => page,
            Ok(Err(e)) => {
                failed_pages += 1;
                tracing::warn!(%link, error = %e, "roster page fetch failed, skipping page");
                continue;
            }
            Err(e) => {
                failed_pages += 1;
                tracing::warn!(%link, error = %e, "roster page task failed, skipping page");
                continue;
            }
        };

        let merged = merge.merge_page(seq, page.value);
        tracing::debug!(seq, merged, "roster page merged");

        if let Some(next) = page.next_link
            && let Some(next_seq) = links.claim(&next)
        {
            in_flight.push(submit_page(client, pool, next_seq, next));
        }
    }

    let roster = merge.finish();
    tracing::info!(
        members = roster.len(),
        pages = links.visited(),
        failed_pages,
        "roster fetched"
    );
    Ok(roster)
}
