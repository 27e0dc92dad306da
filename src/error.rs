use crate::graph::GraphError;

/// Errors that stop a sync run. Per-member failures never surface here; they
/// are logged or recorded as install outcomes instead.
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    #[error("token acquisition failed: {0}")]
    Auth(#[source] GraphError),

    #[error("first roster page could not be fetched: {0}")]
    FatalFetch(#[source] GraphError),

    #[error("roster persistence failed: {0}")]
    Persistence(#[from] sqlx::Error),
}

impl SyncError {
    /// Short label for structured logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Auth(_) => "auth",
            Self::FatalFetch(_) => "fatal_fetch",
            Self::Persistence(_) => "persistence",
        }
    }
}
