//! Axum route handlers for lead submission.

use std::time::Instant;

use axum::{extract::State, Json};
use serde::Serialize;
use tracing::error;

use crate::crm::LeadRecordFields;
use crate::errors::AppError;
use crate::qualification::models::{LeadInput, QualifiedLead};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct LeadResponse {
    pub success: bool,
    pub lead_id: Option<String>,
    pub qualified_lead: Option<QualifiedLead>,
    pub error: Option<String>,
    /// Seconds spent handling the request.
    pub processing_time: f64,
}

/// POST /leads
///
/// Validates the lead, qualifies it, and stores it in the CRM.
/// A CRM failure does not fail the request: the lead is returned with `lead_id: null`.
pub async fn handle_create_lead(
    State(state): State<AppState>,
    Json(lead): Json<LeadInput>,
) -> Result<Json<LeadResponse>, AppError> {
    let started = Instant::now();

    lead.validate()?;

    let result = state.pipeline.qualify(&lead).await;

    let lead_id = match LeadRecordFields::from_qualified(&lead, &result) {
        Ok(fields) => match state.store.create_record(&fields).await {
            Ok(id) => Some(id),
            Err(e) => {
                error!(
                    "Failed to create lead in {}: {e}",
                    state.store.backend_name()
                );
                None
            }
        },
        Err(e) => {
            error!("Failed to flatten lead {} for storage: {e}", lead.name);
            None
        }
    };

    Ok(Json(LeadResponse {
        success: true,
        lead_id,
        qualified_lead: Some(QualifiedLead::new(lead, result)),
        error: None,
        processing_time: started.elapsed().as_secs_f64(),
    }))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use async_trait::async_trait;

    use super::*;
    use crate::crm::testing::{MemoryStore, UnavailableStore};
    use crate::crm::LeadStore;
    use crate::llm_client::{LlmError, TextGenerator};
    use crate::qualification::models::{AnalysisSource, LeadSource, Priority};
    use crate::state::testing::test_state;

    struct CannedGenerator(&'static str);

    #[async_trait]
    impl TextGenerator for CannedGenerator {
        async fn generate(&self, _prompt: &str) -> Result<String, LlmError> {
            Ok(self.0.to_string())
        }
    }

    struct DownGenerator;

    #[async_trait]
    impl TextGenerator for DownGenerator {
        async fn generate(&self, _prompt: &str) -> Result<String, LlmError> {
            Err(LlmError::EmptyContent)
        }
    }

    const EVALUATING_RESPONSE: &str = r#"{
        "industry": "Logistics",
        "company_size": "Medium",
        "budget_signals": ["$50k budget", "2 week timeline"],
        "pain_points": ["manual dispatch", "missed deliveries"],
        "urgency_level": "high",
        "buying_intent": "evaluating",
        "recommended_action": "Book a discovery call this week"
    }"#;

    fn sample_lead() -> LeadInput {
        LeadInput {
            name: "John Doe".to_string(),
            email: "john@example.com".to_string(),
            phone: Some("+1234567890".to_string()),
            company: Some("Tech Corp".to_string()),
            website: Some("https://techcorp.com".to_string()),
            message: "We need a CRM solution urgently for our 50-person team. Budget is around $50k."
                .to_string(),
            source: LeadSource::WebForm,
        }
    }

    #[tokio::test]
    async fn test_create_lead_qualifies_and_stores() {
        let store = Arc::new(MemoryStore::default());
        let state = test_state(Arc::new(CannedGenerator(EVALUATING_RESPONSE)), store.clone());

        let Json(response) = handle_create_lead(State(state), Json(sample_lead()))
            .await
            .unwrap();

        assert!(response.success);
        assert_eq!(response.lead_id.as_deref(), Some("rec1"));
        let qualified = response.qualified_lead.unwrap();
        // 30 + 30 + 10 + 8
        assert_eq!(qualified.score, 78.0);
        assert_eq!(qualified.priority, Priority::Warm);
        assert_eq!(qualified.status, "new");
        assert!(qualified.assigned_to.is_none());
        assert!(response.processing_time >= 0.0);

        let stored = store.get_record("rec1").await.unwrap().unwrap();
        assert_eq!(stored.fields.email, "john@example.com");
        assert_eq!(stored.fields.priority, "warm");
        assert_eq!(
            stored.fields.budget_signals.as_deref(),
            Some(r#"["$50k budget","2 week timeline"]"#)
        );
    }

    #[tokio::test]
    async fn test_create_lead_survives_crm_failure() {
        let state = test_state(
            Arc::new(CannedGenerator(EVALUATING_RESPONSE)),
            Arc::new(UnavailableStore),
        );

        let Json(response) = handle_create_lead(State(state), Json(sample_lead()))
            .await
            .unwrap();

        assert!(response.success);
        assert!(response.lead_id.is_none());
        assert!(response.qualified_lead.is_some());
    }

    #[tokio::test]
    async fn test_create_lead_with_backend_down_returns_degraded_lead() {
        let state = test_state(Arc::new(DownGenerator), Arc::new(MemoryStore::default()));

        let Json(response) = handle_create_lead(State(state), Json(sample_lead()))
            .await
            .unwrap();

        let qualified = response.qualified_lead.unwrap();
        assert_eq!(qualified.score, 50.0);
        assert_eq!(qualified.priority, Priority::Warm);
        assert_eq!(qualified.analysis_source, AnalysisSource::BackendUnavailable);
        assert_eq!(
            qualified.analysis.recommended_action,
            "Manual review required - AI analysis failed"
        );
    }

    #[tokio::test]
    async fn test_create_lead_rejects_invalid_email() {
        let store = Arc::new(MemoryStore::default());
        let state = test_state(Arc::new(CannedGenerator(EVALUATING_RESPONSE)), store.clone());
        let lead = LeadInput {
            email: "not-an-email".to_string(),
            ..sample_lead()
        };

        let err = handle_create_lead(State(state), Json(lead)).await.unwrap_err();
        assert!(matches!(err, AppError::UnprocessableEntity(_)));
        assert!(store.records.lock().unwrap().is_empty());
    }
}
