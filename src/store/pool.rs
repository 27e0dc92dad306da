use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;

/// Connect to the roster database. The schema is owned elsewhere, so no
/// migrations run here.
#[tracing::instrument(skip(url), err)]
pub async fn connect(url: &str) -> anyhow::Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(2)
        .connect(url)
        .await?;

    tracing::info!("connected to postgres");
    Ok(pool)
}
