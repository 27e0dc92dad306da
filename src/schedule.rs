use std::time::Duration;

use tokio::sync::watch;
use tokio::time::{Instant, MissedTickBehavior};

use crate::store::RosterStore;
use crate::sync::{self, SyncContext};

/// A tick handled later than this after its deadline counts as past due.
pub const PAST_DUE_GRACE: Duration = Duration::from_secs(1);

pub fn is_past_due(scheduled: Instant, now: Instant) -> bool {
    now.saturating_duration_since(scheduled) > PAST_DUE_GRACE
}

/// Background loop that runs a sync every `config.sync_interval`.
///
/// The first run happens one interval after startup. Ticks missed while a
/// run is in progress are skipped, not replayed. A failed run is logged and
/// the loop waits for the next tick.
pub async fn run<S>(ctx: SyncContext<S>, mut shutdown: watch::Receiver<()>)
where
    S: RosterStore + 'static,
{
    let period = ctx.config.sync_interval;
    tracing::info!(interval_secs = period.as_secs(), "roster sync scheduler started");

    let mut ticker = tokio::time::interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            _ = shutdown.changed() => {
                tracing::info!("roster sync scheduler shutting down");
                break;
            }
            scheduled = ticker.tick() => {
                // Past-due runs behave exactly like on-time ones.
                if is_past_due(scheduled, Instant::now()) {
                    tracing::info!("the timer is past due");
                }
                match sync::run_once(&ctx).await {
                    Ok(summary) => summary.log(),
                    Err(e) => tracing::error!(error = %e, kind = e.kind(), "roster sync failed"),
                }
            }
        }
    }
}
