//! Placement error types.

use placegrid_core::{DescriptorError, ResourceType};
use placegrid_state::StateError;
use thiserror::Error;

/// Errors that can occur while recovering state or placing an app.
#[derive(Debug, Error)]
pub enum PlacementError {
    #[error("invalid app descriptor: {0}")]
    InvalidDescriptor(#[from] DescriptorError),

    #[error("app already deployed: {0}")]
    DuplicateApp(String),

    #[error("no node can host app {app}: every node is full or already runs a {resource_type} app")]
    NoCapacity { app: String, resource_type: ResourceType },

    #[error("deployment of {app} to {node} failed")]
    DeploymentExecution { app: String, node: String },

    #[error("unknown node in placement state: {0}")]
    UnknownNode(String),

    /// The external deployment succeeded but its record could not be written.
    #[error("{app} is deployed on {node} but the placement could not be recorded: {source}")]
    Persistence {
        app: String,
        node: String,
        #[source]
        source: StateError,
    },

    #[error("failed to read placement state: {0}")]
    Recovery(#[from] StateError),
}

impl PlacementError {
    /// Whether the caller sent a request that can never succeed as-is.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            PlacementError::InvalidDescriptor(_) | PlacementError::DuplicateApp(_)
        )
    }
}

pub type PlacementResult<T> = Result<T, PlacementError>;
