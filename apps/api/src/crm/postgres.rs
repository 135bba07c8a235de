//! PostgreSQL backend for `LeadStore`. Rows mirror `LeadRecordFields`, so the
//! list-valued analysis fields stay JSON-encoded TEXT here as well.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use tracing::info;
use uuid::Uuid;

use crate::crm::{
    CrmError, LeadRecordFields, LeadStats, LeadStore, LeadUpdate, ListFilter, StoredLead,
};

#[derive(Debug, Clone, FromRow)]
pub struct LeadRow {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub company: Option<String>,
    pub website: Option<String>,
    pub message: String,
    pub source: String,
    pub score: f64,
    pub priority: String,
    pub status: String,
    pub assigned_to: Option<String>,
    pub industry: Option<String>,
    pub company_size: Option<String>,
    pub urgency_level: String,
    pub buying_intent: String,
    pub recommended_action: String,
    pub pain_points: Option<String>,
    pub budget_signals: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<LeadRow> for StoredLead {
    fn from(row: LeadRow) -> Self {
        StoredLead {
            id: row.id.to_string(),
            created_at: Some(row.created_at),
            fields: LeadRecordFields {
                name: row.name,
                email: row.email,
                phone: row.phone,
                company: row.company,
                website: row.website,
                message: row.message,
                source: row.source,
                score: Some(row.score),
                priority: row.priority,
                status: row.status,
                assigned_to: row.assigned_to,
                industry: row.industry,
                company_size: row.company_size,
                urgency_level: row.urgency_level,
                buying_intent: row.buying_intent,
                recommended_action: row.recommended_action,
                pain_points: row.pain_points,
                budget_signals: row.budget_signals,
            },
        }
    }
}

#[derive(Debug, FromRow)]
struct StatsRow {
    total: i64,
    hot: i64,
    warm: i64,
    cold: i64,
    avg_score: Option<f64>,
}

impl From<StatsRow> for LeadStats {
    fn from(row: StatsRow) -> Self {
        LeadStats {
            total: row.total.max(0) as u64,
            hot: row.hot.max(0) as u64,
            warm: row.warm.max(0) as u64,
            cold: row.cold.max(0) as u64,
            avg_score: row.avg_score.unwrap_or(0.0),
        }
    }
}

#[derive(Clone)]
pub struct PgLeadStore {
    pool: PgPool,
}

impl PgLeadStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl LeadStore for PgLeadStore {
    fn backend_name(&self) -> &'static str {
        "postgres"
    }

    async fn create_record(&self, fields: &LeadRecordFields) -> Result<String, CrmError> {
        let id = Uuid::new_v4();

        sqlx::query(
            r#"
            INSERT INTO leads
                (id, name, email, phone, company, website, message, source,
                 score, priority, status, assigned_to, industry, company_size, urgency_level,
                 buying_intent, recommended_action, pain_points, budget_signals)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18, $19)
            "#,
        )
        .bind(id)
        .bind(&fields.name)
        .bind(&fields.email)
        .bind(&fields.phone)
        .bind(&fields.company)
        .bind(&fields.website)
        .bind(&fields.message)
        .bind(&fields.source)
        .bind(fields.score.unwrap_or(0.0))
        .bind(&fields.priority)
        .bind(&fields.status)
        .bind(&fields.assigned_to)
        .bind(&fields.industry)
        .bind(&fields.company_size)
        .bind(&fields.urgency_level)
        .bind(&fields.buying_intent)
        .bind(&fields.recommended_action)
        .bind(&fields.pain_points)
        .bind(&fields.budget_signals)
        .execute(&self.pool)
        .await?;

        info!("Lead created in PostgreSQL: {} (ID: {id})", fields.name);
        Ok(id.to_string())
    }

    async fn get_record(&self, id: &str) -> Result<Option<StoredLead>, CrmError> {
        let Ok(id) = Uuid::parse_str(id) else {
            return Ok(None);
        };

        let row = sqlx::query_as::<_, LeadRow>("SELECT * FROM leads WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(StoredLead::from))
    }

    async fn update_record(
        &self,
        id: &str,
        update: &LeadUpdate,
    ) -> Result<Option<StoredLead>, CrmError> {
        let Ok(id) = Uuid::parse_str(id) else {
            return Ok(None);
        };

        let row = sqlx::query_as::<_, LeadRow>(
            r#"
            UPDATE leads
            SET status = COALESCE($2, status),
                assigned_to = COALESCE($3, assigned_to)
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&update.status)
        .bind(&update.assigned_to)
        .fetch_optional(&self.pool)
        .await?;

        if row.is_some() {
            info!("Lead updated in PostgreSQL: {id}");
        }
        Ok(row.map(StoredLead::from))
    }

    async fn list_records(&self, filter: &ListFilter) -> Result<Vec<StoredLead>, CrmError> {
        let rows = sqlx::query_as::<_, LeadRow>(
            r#"
            SELECT * FROM leads
            WHERE ($1::TEXT IS NULL OR lower(priority) = $1)
            ORDER BY created_at DESC
            LIMIT $2
            "#,
        )
        .bind(filter.priority.map(|p| p.as_str()))
        .bind(filter.limit as i64)
        .fetch_all(&self.pool)
        .await?;

        info!("Retrieved {} leads from PostgreSQL", rows.len());
        Ok(rows.into_iter().map(StoredLead::from).collect())
    }

    async fn aggregate(&self) -> Result<LeadStats, CrmError> {
        let row = sqlx::query_as::<_, StatsRow>(
            r#"
            SELECT
                COUNT(*) AS total,
                COUNT(*) FILTER (WHERE lower(priority) = 'hot') AS hot,
                COUNT(*) FILTER (WHERE lower(priority) = 'warm') AS warm,
                COUNT(*) FILTER (WHERE lower(priority) = 'cold') AS cold,
                AVG(score) FILTER (WHERE score <> 0) AS avg_score
            FROM leads
            "#,
        )
        .fetch_one(&self.pool)
        .await?;

        Ok(row.into())
    }
}
