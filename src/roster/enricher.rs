use futures_util::StreamExt;
use futures_util::stream::FuturesUnordered;

use super::Roster;
use crate::graph::GraphClient;
use crate::pool::WorkerPool;

/// Look up every member's department concurrently on `pool`.
///
/// A failed lookup leaves that member's department unset; it never affects
/// the other members. Returns the number of members enriched.
#[tracing::instrument(skip_all, fields(members = roster.len()))]
pub async fn enrich_departments(
    client: &GraphClient,
    pool: &WorkerPool,
    roster: &mut Roster,
) -> usize {
    let mut lookups: FuturesUnordered<_> = roster
        .user_ids()
        .map(|user_id| {
            let client = client.clone();
            let lookup_id = user_id.clone();
            pool.submit_keyed(user_id.clone(), async move {
                client.user_department(&lookup_id).await
            })
        })
        .collect();

    let mut enriched = 0_usize;
    let mut failed = 0_usize;
    while let Some((user_id, result)) = lookups.next().await {
        match result {
            Ok(Ok(department)) => {
                // A user with no department set still counts as enriched.
                roster.set_department(&user_id, Some(department.unwrap_or_default()));
                enriched += 1;
            }
            Ok(Err(e)) => {
                failed += 1;
                tracing::warn!(%user_id, error = %e, "failed to fetch department");
            }
            Err(e) => {
                failed += 1;
                tracing::warn!(%user_id, error = %e, "department lookup task failed");
            }
        }
    }

    tracing::info!(enriched, failed, "departments fetched");
    enriched
}
