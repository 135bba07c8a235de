//! CRM persistence: where qualified leads are stored and read back.
//!
//! The qualification core never touches this module. Handlers flatten a
//! `QualificationResult` into `LeadRecordFields` and hand it to whichever
//! `LeadStore` backend was configured at startup.

pub mod airtable;
pub mod handlers;
pub mod postgres;
#[cfg(test)]
pub mod testing;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::qualification::models::{LeadInput, Priority, QualificationResult};

pub const DEFAULT_LIST_LIMIT: usize = 100;
pub const MAX_LIST_LIMIT: usize = 1000;

#[derive(Debug, Error)]
pub enum CrmError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("CRM API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid CRM configuration: {0}")]
    Config(String),
}

/// Flat storage representation of a qualified lead.
///
/// Serialized names are the CRM column names. List-valued analysis fields are
/// stored as JSON-encoded strings and omitted when empty.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LeadRecordFields {
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Email")]
    pub email: String,
    #[serde(rename = "Phone", skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(rename = "Company", skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
    #[serde(rename = "Website", skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    #[serde(rename = "Message")]
    pub message: String,
    #[serde(rename = "Source")]
    pub source: String,
    #[serde(rename = "Score")]
    pub score: Option<f64>,
    #[serde(rename = "Priority")]
    pub priority: String,
    #[serde(rename = "Status")]
    pub status: String,
    #[serde(rename = "Assigned To", skip_serializing_if = "Option::is_none")]
    pub assigned_to: Option<String>,
    #[serde(rename = "Industry", skip_serializing_if = "Option::is_none")]
    pub industry: Option<String>,
    #[serde(rename = "Company Size", skip_serializing_if = "Option::is_none")]
    pub company_size: Option<String>,
    #[serde(rename = "Urgency Level")]
    pub urgency_level: String,
    #[serde(rename = "Buying Intent")]
    pub buying_intent: String,
    #[serde(rename = "Recommended Action")]
    pub recommended_action: String,
    #[serde(rename = "Pain Points", skip_serializing_if = "Option::is_none")]
    pub pain_points: Option<String>,
    #[serde(rename = "Budget Signals", skip_serializing_if = "Option::is_none")]
    pub budget_signals: Option<String>,
}

impl LeadRecordFields {
    pub fn from_qualified(
        lead: &LeadInput,
        result: &QualificationResult,
    ) -> Result<Self, CrmError> {
        let analysis = &result.analysis;

        Ok(Self {
            name: lead.name.clone(),
            email: lead.email.clone(),
            phone: lead.phone.clone(),
            company: lead.company.clone(),
            website: lead.website.clone(),
            message: lead.message.clone(),
            source: lead.source.as_str().to_string(),
            score: Some(result.score),
            priority: result.priority.as_str().to_string(),
            status: "new".to_string(),
            assigned_to: None,
            industry: analysis.industry.clone(),
            company_size: analysis.company_size.clone(),
            urgency_level: analysis.urgency_level.as_str().to_string(),
            buying_intent: analysis.buying_intent.as_str().to_string(),
            recommended_action: analysis.recommended_action.clone(),
            pain_points: encode_list(&analysis.pain_points)?,
            budget_signals: encode_list(&analysis.budget_signals)?,
        })
    }
}

fn encode_list(items: &[String]) -> Result<Option<String>, serde_json::Error> {
    if items.is_empty() {
        return Ok(None);
    }
    serde_json::to_string(items).map(Some)
}

/// Sales follow-up on a stored lead. Only the fields that are set are written.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct LeadUpdate {
    pub status: Option<String>,
    pub assigned_to: Option<String>,
}

impl LeadUpdate {
    /// Trims both fields and rejects blanks and an update that sets nothing.
    pub fn normalized(self) -> Result<Self, String> {
        let status = non_blank(self.status, "status")?;
        let assigned_to = non_blank(self.assigned_to, "assigned_to")?;
        if status.is_none() && assigned_to.is_none() {
            return Err("update must set status or assigned_to".to_string());
        }
        Ok(Self {
            status,
            assigned_to,
        })
    }
}

fn non_blank(value: Option<String>, field: &str) -> Result<Option<String>, String> {
    match value {
        None => Ok(None),
        Some(v) if v.trim().is_empty() => Err(format!("{field} must not be blank")),
        Some(v) => Ok(Some(v.trim().to_string())),
    }
}

/// A lead as read back from the CRM.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StoredLead {
    pub id: String,
    pub created_at: Option<DateTime<Utc>>,
    pub fields: LeadRecordFields,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LeadStats {
    pub total: u64,
    pub hot: u64,
    pub warm: u64,
    pub cold: u64,
    pub avg_score: f64,
}

impl LeadStats {
    pub fn empty() -> Self {
        Self {
            total: 0,
            hot: 0,
            warm: 0,
            cold: 0,
            avg_score: 0.0,
        }
    }
}

/// Priority counts compare case-insensitively; the average covers only
/// records with a non-zero score.
pub fn compute_stats(records: &[LeadRecordFields]) -> LeadStats {
    let mut stats = LeadStats::empty();
    let mut score_sum = 0.0;
    let mut scored = 0u64;

    for record in records {
        stats.total += 1;
        match record.priority.to_lowercase().as_str() {
            "hot" => stats.hot += 1,
            "warm" => stats.warm += 1,
            "cold" => stats.cold += 1,
            _ => {}
        }
        if let Some(score) = record.score.filter(|s| *s != 0.0) {
            score_sum += score;
            scored += 1;
        }
    }

    if scored > 0 {
        stats.avg_score = score_sum / scored as f64;
    }
    stats
}

#[derive(Debug, Clone, PartialEq)]
pub struct ListFilter {
    pub priority: Option<Priority>,
    pub limit: usize,
}

impl ListFilter {
    pub fn new(priority: Option<Priority>, limit: Option<usize>) -> Self {
        Self {
            priority,
            limit: limit
                .unwrap_or(DEFAULT_LIST_LIMIT)
                .clamp(1, MAX_LIST_LIMIT),
        }
    }
}

/// The persistence capability. Carried in `AppState` as `Arc<dyn LeadStore>`.
#[async_trait]
pub trait LeadStore: Send + Sync {
    /// Short label for health output and logs.
    fn backend_name(&self) -> &'static str;

    async fn create_record(&self, fields: &LeadRecordFields) -> Result<String, CrmError>;

    async fn get_record(&self, id: &str) -> Result<Option<StoredLead>, CrmError>;

    /// `Ok(None)` when no record has this id.
    async fn update_record(
        &self,
        id: &str,
        update: &LeadUpdate,
    ) -> Result<Option<StoredLead>, CrmError>;

    /// Newest first.
    async fn list_records(&self, filter: &ListFilter) -> Result<Vec<StoredLead>, CrmError>;

    async fn aggregate(&self) -> Result<LeadStats, CrmError>;
}
