use futures_util::StreamExt;
use futures_util::stream::FuturesUnordered;

use super::{InstallOutcome, InstallReport, classify};
use crate::graph::GraphClient;
use crate::pool::WorkerPool;
use crate::roster::Roster;

/// Logs progress roughly every tenth of the total, and at the end.
struct Progress {
    total: usize,
    done: usize,
    step: usize,
    next_mark: usize,
}

impl Progress {
    fn new(total: usize) -> Self {
        let step = (total / 10).max(1);
        Self {
            total,
            done: 0,
            step,
            next_mark: step,
        }
    }

    fn tick(&mut self) {
        self.done += 1;
        if self.done >= self.next_mark || self.done == self.total {
            tracing::info!(done = self.done, total = self.total, "installing apps");
            self.next_mark = self.done + self.step;
        }
    }
}

/// Install `app_id` for every member of `roster` on a dedicated worker pool.
///
/// Each attempt is made once. Outcomes are collected here as tasks finish;
/// no task touches the report directly.
#[tracing::instrument(skip(client, roster), fields(members = roster.len()))]
pub async fn install_for_all(
    client: &GraphClient,
    roster: &Roster,
    app_id: &str,
    workers: usize,
) -> InstallReport {
    let pool = WorkerPool::new(workers);
    let app_bind = client.app_catalog_bind(app_id);

    let mut attempts: FuturesUnordered<_> = roster
        .user_ids()
        .map(|user_id| {
            let client = client.clone();
            let app_bind = app_bind.clone();
            let target = user_id.clone();
            pool.submit_keyed(user_id.clone(), async move {
                client.install_app(&target, &app_bind).await
            })
        })
        .collect();

    let mut report = InstallReport::default();
    let mut progress = Progress::new(roster.len());

    while let Some((user_id, result)) = attempts.next().await {
        let outcome = match result {
            Ok(Ok(resp)) => classify(user_id, resp.status, &resp.body),
            Ok(Err(e)) => InstallOutcome::TransportError(user_id, e.to_string()),
            Err(e) => InstallOutcome::TransportError(user_id, e.to_string()),
        };

        let display_name = roster
            .get(outcome.user_id())
            .map_or("", |m| m.display_name.as_str());

        match &outcome {
            InstallOutcome::Installed(id) => tracing::debug!(user_id = %id, "app installed"),
            InstallOutcome::UnexpectedStatus(id, status) => {
                tracing::warn!(user_id = %id, status, "unexpected install status");
            }
            InstallOutcome::Forbidden(id) => {
                tracing::warn!(user_id = %id, display_name, "app installation forbidden");
            }
            InstallOutcome::TransportError(id, message) => {
                tracing::warn!(user_id = %id, error = %message, "app installation failed");
            }
        }

        report.record(outcome, display_name);
        progress.tick();
    }

    let counts = report.counts;
    tracing::info!(
        installed = counts.installed,
        unexpected = counts.unexpected,
        forbidden = counts.forbidden,
        failed = counts.failed,
        "app installation finished"
    );
    report
}
