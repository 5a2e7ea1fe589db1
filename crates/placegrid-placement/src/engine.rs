//! Placement engine — decides where an app runs and records it.
//!
//! `place()` runs five steps as one unit:
//! 1. Validate the descriptor
//! 2. Reject names that are already placed
//! 3. Select a candidate node (see [`crate::selector`])
//! 4. Run the deployment executor against that node
//! 5. Append the record to the store, then commit it to the registry
//!
//! Nothing is mutated unless the executor reports success. The engine takes
//! `&mut self`; callers sharing it use [`SharedEngine`], whose lock is held
//! for the entire call, executor included.

use std::sync::Arc;
use std::time::Duration;

use placegrid_core::{AppDescriptor, NodeId, PlacementRecord};
use placegrid_state::StateStore;
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};

use crate::error::{PlacementError, PlacementResult};
use crate::executor::DeploymentExecutor;
use crate::registry::NodeRegistry;
use crate::selector::{SelectionPass, select_node};

/// Engine behind the lock that serializes placements.
pub type SharedEngine = Arc<Mutex<PlacementEngine>>;

/// Outcome of a successful placement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placement {
    pub app: String,
    pub node_id: NodeId,
    pub pass: SelectionPass,
}

pub struct PlacementEngine {
    registry: NodeRegistry,
    store: Box<dyn StateStore>,
    executor: Arc<dyn DeploymentExecutor>,
    deploy_timeout: Option<Duration>,
}

impl PlacementEngine {
    /// Build an engine over `topology`, replaying everything in `store`.
    ///
    /// Fails if the store cannot be read or references a node outside
    /// the topology.
    pub fn recover<I, S>(
        topology: I,
        store: Box<dyn StateStore>,
        executor: Arc<dyn DeploymentExecutor>,
    ) -> PlacementResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<NodeId>,
    {
        let mut registry = NodeRegistry::new(topology);
        let replayed = registry.load(store.load_all()?)?;
        info!(
            nodes = registry.node_count(),
            replayed,
            "placement state recovered"
        );
        Ok(Self {
            registry,
            store,
            executor,
            deploy_timeout: None,
        })
    }

    /// Treat an executor that has not answered within `timeout` as failed.
    pub fn with_deploy_timeout(mut self, timeout: Duration) -> Self {
        self.deploy_timeout = Some(timeout);
        self
    }

    pub fn into_shared(self) -> SharedEngine {
        Arc::new(Mutex::new(self))
    }

    pub fn registry(&self) -> &NodeRegistry {
        &self.registry
    }

    /// Place `app` on a node, deploy it, and record the outcome.
    pub async fn place(&mut self, app: AppDescriptor) -> PlacementResult<Placement> {
        app.validate()?;

        if self.registry.contains_app(&app.name) {
            warn!(app = %app.name, "rejecting duplicate app");
            return Err(PlacementError::DuplicateApp(app.name));
        }

        let Some(candidate) = select_node(&self.registry, app.resource_type) else {
            warn!(app = %app.name, resource_type = %app.resource_type, "no node has capacity");
            return Err(PlacementError::NoCapacity {
                app: app.name,
                resource_type: app.resource_type,
            });
        };
        debug!(
            app = %app.name,
            node = %candidate.node_id,
            pass = ?candidate.pass,
            "candidate node selected"
        );

        if !self.execute(&candidate.node_id, &app).await {
            warn!(app = %app.name, node = %candidate.node_id, "deployment failed, nothing recorded");
            return Err(PlacementError::DeploymentExecution {
                app: app.name,
                node: candidate.node_id,
            });
        }

        let record = PlacementRecord::new(&candidate.node_id, &app);
        if let Err(source) = self.store.append(&record) {
            error!(
                app = %app.name,
                node = %candidate.node_id,
                error = %source,
                "app deployed but placement NOT recorded, manual reconciliation required"
            );
            return Err(PlacementError::Persistence {
                app: app.name,
                node: candidate.node_id,
                source,
            });
        }

        let name = app.name.clone();
        self.registry.commit(&candidate.node_id, app)?;
        info!(app = %name, node = %candidate.node_id, pass = ?candidate.pass, "app placed");

        Ok(Placement {
            app: name,
            node_id: candidate.node_id,
            pass: candidate.pass,
        })
    }

    async fn execute(&self, node_id: &str, app: &AppDescriptor) -> bool {
        let deploy = self.executor.deploy(node_id, app);
        match self.deploy_timeout {
            Some(limit) => match tokio::time::timeout(limit, deploy).await {
                Ok(succeeded) => succeeded,
                Err(_) => {
                    warn!(app = %app.name, node = %node_id, ?limit, "deployment timed out");
                    false
                }
            },
            None => deploy.await,
        }
    }
}
