use sqlx::PgPool;

use super::RosterStore;
use crate::roster::MemberRecord;

/// `user_details` table in Postgres.
#[derive(Debug, Clone)]
pub struct PgRosterStore {
    pool: PgPool,
}

impl PgRosterStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

impl RosterStore for PgRosterStore {
    /// Truncate (resetting the identity column) and bulk insert in one
    /// transaction. Dropping the transaction on error rolls it back.
    #[tracing::instrument(skip_all, fields(rows = members.len()), err)]
    async fn replace_all(&self, members: &[MemberRecord]) -> Result<u64, sqlx::Error> {
        let mut user_ids = Vec::with_capacity(members.len());
        let mut emails = Vec::with_capacity(members.len());
        let mut display_names = Vec::with_capacity(members.len());
        let mut departments = Vec::with_capacity(members.len());
        for member in members {
            user_ids.push(member.user_id.as_str().to_owned());
            emails.push(member.email.clone());
            display_names.push(member.display_name.clone());
            departments.push(member.department.clone());
        }

        let mut tx = self.pool.begin().await?;

        sqlx::query("TRUNCATE TABLE user_details RESTART IDENTITY")
            .execute(&mut *tx)
            .await?;

        let inserted = sqlx::query(
            r"
            INSERT INTO user_details (user_id, email, display_name, department)
            SELECT * FROM UNNEST($1::text[], $2::text[], $3::text[], $4::text[])
            ON CONFLICT (user_id) DO UPDATE
               SET email = EXCLUDED.email,
                   display_name = EXCLUDED.display_name,
                   department = EXCLUDED.department
            ",
        )
        .bind(user_ids)
        .bind(emails)
        .bind(display_names)
        .bind(departments)
        .execute(&mut *tx)
        .await?
        .rows_affected();

        tx.commit().await?;

        tracing::info!(rows = inserted, "roster replaced");
        Ok(inserted)
    }
}
