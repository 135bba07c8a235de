pub mod health;

use axum::{routing::get, Router};

use crate::crm::handlers as crm_handlers;
use crate::qualification::handlers as lead_handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(health::root_handler))
        .route("/health", get(health::health_handler))
        // Leads API
        .route(
            "/leads",
            get(crm_handlers::handle_list_leads).post(lead_handlers::handle_create_lead),
        )
        .route("/leads/stats", get(crm_handlers::handle_lead_stats))
        .route(
            "/leads/:id",
            get(crm_handlers::handle_get_lead).patch(crm_handlers::handle_update_lead),
        )
        .with_state(state)
}
