//! Candidate node selection.
//!
//! Two passes over the registry in stable order:
//! - **Empty node**: the first node with no apps wins.
//! - **Co-location**: otherwise, the first node holding exactly one app of a
//!   *different* resource type. Nodes at [`NODE_CAPACITY`] are skipped.
//!
//! Pass 1 spreads apps over idle nodes; pass 2 only densifies a node when
//! that mixes resource classes on it.

use placegrid_core::ResourceType;

use crate::registry::NodeRegistry;

/// Hard cap on apps per node.
pub const NODE_CAPACITY: usize = 2;

/// Which pass produced a candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionPass {
    EmptyNode,
    CoLocation,
}

/// A node chosen for an incoming app.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub node_id: String,
    pub pass: SelectionPass,
}

/// Pick the node for an app of `resource_type`, or `None` when the cluster
/// has no valid target.
pub fn select_node(registry: &NodeRegistry, resource_type: ResourceType) -> Option<Candidate> {
    if let Some((node_id, _)) = registry.nodes().find(|(_, apps)| apps.is_empty()) {
        return Some(Candidate {
            node_id: node_id.to_string(),
            pass: SelectionPass::EmptyNode,
        });
    }

    registry
        .nodes()
        .filter(|(_, apps)| apps.len() < NODE_CAPACITY)
        .find(|(_, apps)| {
            apps.len() == 1 && apps[0].resource_type != resource_type
        })
        .map(|(node_id, _)| Candidate {
            node_id: node_id.to_string(),
            pass: SelectionPass::CoLocation,
        })
}
