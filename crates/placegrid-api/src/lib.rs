//! placegrid-api — REST API for placegrid.
//!
//! Turns deployment requests into [`AppDescriptor`](placegrid_core::AppDescriptor)s,
//! hands them to the shared placement engine, and maps the outcome to an
//! HTTP status.
//!
//! # API Routes
//!
//! | Method | Path | Description |
//! |---|---|---|
//! | POST | `/deploy` | Place and deploy an app |
//! | POST | `/api/v1/deployments` | Same as `/deploy` |
//! | GET | `/api/v1/nodes` | Apps per node, in placement order |

pub mod handlers;

use axum::Router;
use axum::routing::{get, post};
use placegrid_placement::SharedEngine;

/// Shared state for API handlers.
#[derive(Clone)]
pub struct ApiState {
    pub engine: SharedEngine,
}

/// Build the complete API router.
pub fn build_router(engine: SharedEngine) -> Router {
    let api_state = ApiState { engine };

    let api_routes = Router::new()
        .route("/deployments", post(handlers::deploy))
        .route("/nodes", get(handlers::list_nodes))
        .with_state(api_state.clone());

    Router::new()
        .nest("/api/v1", api_routes)
        .route("/deploy", post(handlers::deploy).with_state(api_state))
}
