//! Node registry — which apps are assigned to which node.
//!
//! The registry is the in-process source of truth for placement decisions.
//! It is rebuilt from the placement log at startup and afterwards only
//! grows through committed placements; there is no removal path.

use std::collections::BTreeMap;

use placegrid_core::{AppDescriptor, NodeId, PlacementRecord};
use placegrid_state::StateResult;
use serde::Serialize;
use tracing::debug;

use crate::error::{PlacementError, PlacementResult};

/// Node id → apps in placement order, over a fixed topology.
///
/// Iteration follows the lexical order of node ids, which is the stable
/// order the selector relies on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeRegistry {
    nodes: BTreeMap<NodeId, Vec<AppDescriptor>>,
}

/// Serializable view of one node, for listings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NodeView {
    pub node: NodeId,
    pub apps: Vec<AppDescriptor>,
}

impl NodeRegistry {
    /// Empty registry over the given topology. Duplicate ids collapse.
    pub fn new<I, S>(topology: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<NodeId>,
    {
        Self {
            nodes: topology
                .into_iter()
                .map(|id| (id.into(), Vec::new()))
                .collect(),
        }
    }

    /// Replay placement records in order. Returns how many were applied.
    ///
    /// A record naming a node outside the topology aborts the replay with
    /// [`PlacementError::UnknownNode`].
    pub fn load<I>(&mut self, records: I) -> PlacementResult<usize>
    where
        I: IntoIterator<Item = StateResult<PlacementRecord>>,
    {
        let mut applied = 0;
        for record in records {
            let (node_id, app) = record?.into_parts();
            let Some(apps) = self.nodes.get_mut(&node_id) else {
                return Err(PlacementError::UnknownNode(node_id));
            };
            apps.push(app);
            applied += 1;
        }
        debug!(applied, "placement records replayed");
        Ok(applied)
    }

    /// Whether any node already hosts an app with exactly this name.
    pub fn contains_app(&self, name: &str) -> bool {
        self.nodes
            .values()
            .flatten()
            .any(|app| app.name == name)
    }

    /// Append `app` to `node_id`. The caller has already checked for duplicates.
    pub fn commit(&mut self, node_id: &str, app: AppDescriptor) -> PlacementResult<()> {
        let apps = self
            .nodes
            .get_mut(node_id)
            .ok_or_else(|| PlacementError::UnknownNode(node_id.to_string()))?;
        apps.push(app);
        Ok(())
    }

    /// Apps on a node in placement order, or `None` for a foreign id.
    pub fn apps_on(&self, node_id: &str) -> Option<&[AppDescriptor]> {
        self.nodes.get(node_id).map(Vec::as_slice)
    }

    /// Nodes and their apps in stable order.
    pub fn nodes(&self) -> impl Iterator<Item = (&str, &[AppDescriptor])> {
        self.nodes
            .iter()
            .map(|(id, apps)| (id.as_str(), apps.as_slice()))
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Total number of placed apps across all nodes.
    pub fn placed_count(&self) -> usize {
        self.nodes.values().map(Vec::len).sum()
    }

    pub fn snapshot(&self) -> Vec<NodeView> {
        self.nodes()
            .map(|(node, apps)| NodeView {
                node: node.to_string(),
                apps: apps.to_vec(),
            })
            .collect()
    }
}
