use std::sync::Arc;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::config::Config;
use crate::error::SyncError;
use crate::graph::{GraphClient, auth};
use crate::install::{self, ForbiddenMember, InstallCounts};
use crate::roster::{self, ChannelScope};
use crate::store::RosterStore;

/// Everything a sync run needs, built once at startup.
#[derive(Clone)]
pub struct SyncContext<S> {
    pub config: Arc<Config>,
    pub http: reqwest::Client,
    pub store: S,
}

/// What one run did.
#[derive(Debug, Clone)]
pub struct SyncSummary {
    pub run_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub members: usize,
    pub with_department: usize,
    pub rows_written: u64,
    pub install: InstallCounts,
    pub forbidden: Vec<ForbiddenMember>,
}

impl SyncSummary {
    pub fn log(&self) {
        tracing::info!(
            run_id = %self.run_id,
            members = self.members,
            with_department = self.with_department,
            rows_written = self.rows_written,
            installed = self.install.installed,
            unexpected = self.install.unexpected,
            forbidden = self.install.forbidden,
            failed = self.install.failed,
            elapsed_ms = (self.finished_at - self.started_at).num_milliseconds(),
            "roster sync finished"
        );
    }
}

/// One full run: token, roster fetch and enrichment, bulk replace, installs.
///
/// Only token, first-page and persistence failures abort the run; anything
/// that goes wrong for a single page or member is absorbed along the way.
#[tracing::instrument(skip_all, fields(run_id = tracing::field::Empty), err)]
pub async fn run_once<S: RosterStore>(ctx: &SyncContext<S>) -> Result<SyncSummary, SyncError> {
    let run_id = Uuid::now_v7();
    tracing::Span::current().record("run_id", tracing::field::display(run_id));
    let started_at = Utc::now();
    let config = &ctx.config;

    let token = auth::acquire_token(&ctx.http, config)
        .await
        .map_err(SyncError::Auth)?;
    let client = GraphClient::new(ctx.http.clone(), config.graph_base_url.clone(), token);

    let scope = ChannelScope {
        team_id: config.team_id.clone(),
        channel_id: config.channel_id.clone(),
    };
    let roster = roster::fetch_all(&client, &scope, config.workers).await?;

    let rows_written = ctx.store.replace_all(&roster.to_records()).await?;

    let report =
        install::install_for_all(&client, &roster, &config.teams_app_id, config.workers).await;

    if !report.forbidden.is_empty() {
        let user_ids: Vec<&str> = report
            .forbidden
            .iter()
            .map(|m| m.user_id.as_str())
            .collect();
        tracing::warn!(
            count = user_ids.len(),
            user_ids = ?user_ids,
            "app installation forbidden for some members; grant install permission manually"
        );
    }

    Ok(SyncSummary {
        run_id,
        started_at,
        finished_at: Utc::now(),
        members: roster.len(),
        with_department: roster.with_department(),
        rows_written,
        install: report.counts,
        forbidden: report.forbidden,
    })
}
