//! REST API handlers.
//!
//! Every placement goes through the engine lock, so requests are handled
//! one at a time from validation through deployment.

use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use placegrid_core::{AppDescriptor, DescriptorError, ResourceType};
use placegrid_placement::PlacementError;
use tracing::debug;

use crate::ApiState;

/// Response wrapper for consistent API format.
#[derive(serde::Serialize)]
struct ApiResponse<T: serde::Serialize> {
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl<T: serde::Serialize> ApiResponse<T> {
    fn ok(data: T) -> Json<Self> {
        Json(Self {
            success: true,
            data: Some(data),
            error: None,
        })
    }
}

fn error_response(msg: &str, status: StatusCode) -> impl IntoResponse {
    (
        status,
        Json(ApiResponse::<()> {
            success: false,
            data: None,
            error: Some(msg.to_string()),
        }),
    )
}

/// HTTP status for a failed placement.
pub fn status_for(err: &PlacementError) -> StatusCode {
    if err.is_client_error() {
        StatusCode::BAD_REQUEST
    } else {
        StatusCode::INTERNAL_SERVER_ERROR
    }
}

// ── Deployments ────────────────────────────────────────────────

/// Deployment request body. Fields are optional here so that missing
/// ones surface as descriptor errors rather than parse failures.
#[derive(Debug, serde::Deserialize)]
pub struct DeployRequest {
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub resource_type: Option<String>,
    pub image: Option<String>,
}

impl DeployRequest {
    pub fn into_descriptor(self) -> Result<AppDescriptor, DescriptorError> {
        let name = self.name.ok_or(DescriptorError::MissingField("name"))?;
        let resource_type: ResourceType = self
            .resource_type
            .ok_or(DescriptorError::MissingField("type"))?
            .parse()?;
        let image = self.image.ok_or(DescriptorError::MissingField("image"))?;
        Ok(AppDescriptor::new(name, resource_type, image))
    }
}

#[derive(Debug, serde::Serialize, serde::Deserialize)]
pub struct PlacedApp {
    pub app: String,
    pub node: String,
}

/// POST /deploy, POST /api/v1/deployments
pub async fn deploy(
    State(state): State<ApiState>,
    payload: Result<Json<DeployRequest>, JsonRejection>,
) -> impl IntoResponse {
    let Json(req) = match payload {
        Ok(body) => body,
        Err(rejection) => {
            debug!(error = %rejection.body_text(), "malformed deployment request");
            return error_response(
                &format!("bad request format: {}", rejection.body_text()),
                StatusCode::BAD_REQUEST,
            )
            .into_response();
        }
    };

    let app = match req.into_descriptor() {
        Ok(app) => app,
        Err(e) => {
            return error_response(&format!("invalid app descriptor: {e}"), StatusCode::BAD_REQUEST)
                .into_response();
        }
    };

    let mut engine = state.engine.lock().await;
    match engine.place(app).await {
        Ok(placement) => ApiResponse::ok(PlacedApp {
            app: placement.app,
            node: placement.node_id,
        })
        .into_response(),
        Err(e) => error_response(&e.to_string(), status_for(&e)).into_response(),
    }
}

// ── Nodes ──────────────────────────────────────────────────────

/// GET /api/v1/nodes
pub async fn list_nodes(State(state): State<ApiState>) -> impl IntoResponse {
    let engine = state.engine.lock().await;
    ApiResponse::ok(engine.registry().snapshot()).into_response()
}
