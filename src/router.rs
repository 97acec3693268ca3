//! Router configuration.

use crate::handlers::health::health_check;
use crate::handlers::tickets;
use crate::state::AppState;
use axum::http::HeaderValue;
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::warn;

/// Build the complete Axum router.
///
/// # Routes
///
/// - `GET  /health` - liveness + store connectivity
/// - `POST /ticket/issue` - create a priced purchase order
/// - `POST /ticket/confirmPayment` - accept one confirmation per order
/// - `POST /ticket/redeem` - validate a scan
/// - `POST /ticket/enquiry` - record a priced enquiry
/// - `GET  /ticket/quote/:event_id` - price quote
pub fn build_router(state: AppState, allowed_origins: &[String]) -> Router {
    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| {
            origin
                .parse()
                .inspect_err(|_| warn!(%origin, "ignoring unparseable CORS origin"))
                .ok()
        })
        .collect();

    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health_check))
        .route("/ticket/issue", post(tickets::create_order))
        .route("/ticket/confirmPayment", post(tickets::confirm_payment))
        .route("/ticket/redeem", post(tickets::redeem))
        .route("/ticket/enquiry", post(tickets::create_enquiry))
        .route("/ticket/quote/:event_id", get(tickets::quote))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
