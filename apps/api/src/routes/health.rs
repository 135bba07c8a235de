use axum::{extract::State, Json};
use chrono::Utc;
use serde_json::{json, Value};

use crate::state::AppState;

/// GET /
pub async fn root_handler() -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "timestamp": Utc::now(),
        "services": {
            "ai_agent": "operational"
        }
    }))
}

/// GET /health
/// Reports the configured CRM backend, score thresholds and LLM timeout alongside status.
pub async fn health_handler(State(state): State<AppState>) -> Json<Value> {
    let thresholds = state.pipeline.thresholds();
    Json(json!({
        "status": "healthy",
        "timestamp": Utc::now(),
        "version": env!("CARGO_PKG_VERSION"),
        "services": {
            "api": "running",
            "ai_agent": "operational",
            "crm": state.store.backend_name()
        },
        "thresholds": {
            "high": thresholds.high(),
            "medium": thresholds.medium()
        },
        "llm_timeout_secs": state.config.llm_timeout.as_secs()
    }))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use async_trait::async_trait;

    use super::*;
    use crate::crm::testing::MemoryStore;
    use crate::llm_client::{LlmError, TextGenerator};
    use crate::state::testing::test_state;

    struct IdleGenerator;

    #[async_trait]
    impl TextGenerator for IdleGenerator {
        async fn generate(&self, _prompt: &str) -> Result<String, LlmError> {
            Ok("{}".to_string())
        }
    }

    #[tokio::test]
    async fn test_health_reports_services() {
        let state = test_state(Arc::new(IdleGenerator), Arc::new(MemoryStore::default()));
        let Json(body) = health_handler(State(state)).await;
        assert_eq!(body["status"], "healthy");
        assert_eq!(body["services"]["api"], "running");
        assert_eq!(body["services"]["crm"], "memory");
        assert_eq!(body["thresholds"]["high"], 80.0);
        assert_eq!(body["llm_timeout_secs"], 30);
        assert!(body.get("timestamp").is_some());
    }

    #[tokio::test]
    async fn test_root_is_healthy() {
        let Json(body) = root_handler().await;
        assert_eq!(body["status"], "healthy");
        assert!(body.get("services").is_some());
    }
}
