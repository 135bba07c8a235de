use std::sync::Arc;

use crate::config::Config;
use crate::crm::LeadStore;
use crate::qualification::pipeline::QualificationPipeline;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Stateless; cloning shares the backend handle.
    pub pipeline: QualificationPipeline,
    /// Pluggable CRM backend. Airtable or PostgreSQL, chosen from config at startup.
    pub store: Arc<dyn LeadStore>,
    pub config: Config,
}

#[cfg(test)]
pub mod testing {
    use std::sync::Arc;
    use std::time::Duration;

    use super::AppState;
    use crate::config::{Config, CrmConfig};
    use crate::crm::LeadStore;
    use crate::llm_client::TextGenerator;
    use crate::qualification::models::Thresholds;
    use crate::qualification::pipeline::QualificationPipeline;

    pub fn test_state(generator: Arc<dyn TextGenerator>, store: Arc<dyn LeadStore>) -> AppState {
        let config = Config {
            anthropic_api_key: "test-key".to_string(),
            crm: CrmConfig::Postgres {
                database_url: "postgres://localhost/test".to_string(),
            },
            thresholds: Thresholds::default(),
            llm_timeout: Duration::from_secs(30),
            port: 8000,
            rust_log: "info".to_string(),
        };
        AppState {
            pipeline: QualificationPipeline::new(generator, config.thresholds),
            store,
            config,
        }
    }
}
