mod config;
mod crm;
mod db;
mod errors;
mod llm_client;
mod qualification;
mod routes;
mod state;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::{Config, CrmConfig};
use crate::crm::airtable::AirtableStore;
use crate::crm::postgres::PgLeadStore;
use crate::crm::LeadStore;
use crate::db::{create_pool, ensure_schema};
use crate::llm_client::{LlmClient, TextGenerator, TimeoutGenerator};
use crate::qualification::pipeline::QualificationPipeline;
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_CRATE_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Lead Qualification API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize LLM client behind the caller-side timeout
    let llm = LlmClient::new(config.anthropic_api_key.clone())?;
    info!(
        "LLM client initialized (model: {}, timeout: {:?})",
        llm_client::MODEL,
        config.llm_timeout
    );
    let generator: Arc<dyn TextGenerator> =
        Arc::new(TimeoutGenerator::new(llm, config.llm_timeout));

    let pipeline = QualificationPipeline::new(generator, config.thresholds);
    info!(
        "Score thresholds: hot >= {}, warm >= {}",
        config.thresholds.high(),
        config.thresholds.medium()
    );

    // Initialize CRM backend
    let store = build_lead_store(&config.crm).await?;
    info!("CRM backend initialized: {}", store.backend_name());

    let state = AppState {
        pipeline,
        store,
        config: config.clone(),
    };

    let app = build_router(state).layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(CorsLayer::permissive()),
    );

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Constructs the configured CRM backend. PostgreSQL gets its schema ensured first.
async fn build_lead_store(crm: &CrmConfig) -> Result<Arc<dyn LeadStore>> {
    match crm {
        CrmConfig::Airtable {
            api_key,
            base_id,
            table_name,
        } => {
            let store = AirtableStore::new(api_key.clone(), base_id, table_name)?;
            info!("Using Airtable table '{table_name}'");
            Ok(Arc::new(store))
        }
        CrmConfig::Postgres { database_url } => {
            let pool = create_pool(database_url).await?;
            ensure_schema(&pool).await?;
            Ok(Arc::new(PgLeadStore::new(pool)))
        }
    }
}
