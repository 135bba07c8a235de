use anyhow::Result;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tracing::info;

/// Creates and returns a PostgreSQL connection pool.
pub async fn create_pool(database_url: &str) -> Result<PgPool> {
    info!("Connecting to PostgreSQL...");

    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(database_url)
        .await?;

    info!("PostgreSQL connection pool established");
    Ok(pool)
}

/// Creates the `leads` table and its listing index if they do not exist.
pub async fn ensure_schema(pool: &PgPool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS leads (
            id                 UUID PRIMARY KEY,
            name               TEXT NOT NULL,
            email              TEXT NOT NULL,
            phone              TEXT,
            company            TEXT,
            website            TEXT,
            message            TEXT NOT NULL,
            source             TEXT NOT NULL,
            score              DOUBLE PRECISION NOT NULL,
            priority           TEXT NOT NULL,
            status             TEXT NOT NULL DEFAULT 'new',
            assigned_to        TEXT,
            industry           TEXT,
            company_size       TEXT,
            urgency_level      TEXT NOT NULL,
            buying_intent      TEXT NOT NULL,
            recommended_action TEXT NOT NULL,
            pain_points        TEXT,
            budget_signals     TEXT,
            created_at         TIMESTAMPTZ NOT NULL DEFAULT now()
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("ALTER TABLE leads ADD COLUMN IF NOT EXISTS assigned_to TEXT")
        .execute(pool)
        .await?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS leads_priority_created_at_idx ON leads (priority, created_at DESC)",
    )
    .execute(pool)
    .await?;

    info!("Leads schema ready");
    Ok(())
}
