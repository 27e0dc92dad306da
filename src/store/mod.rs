pub mod pool;
pub mod postgres;

use std::future::Future;

pub use postgres::PgRosterStore;

use crate::roster::MemberRecord;

/// Destination of the finished roster.
///
/// `replace_all` must swap the whole stored roster for `members` atomically:
/// either every row lands or the previous roster is left untouched.
/// Uses native async fn in trait (Rust 2024 edition).
pub trait RosterStore: Send + Sync {
    /// Returns the number of rows written.
    fn replace_all(
        &self,
        members: &[MemberRecord],
    ) -> impl Future<Output = Result<u64, sqlx::Error>> + Send;
}

