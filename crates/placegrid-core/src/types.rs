//! Shared types used across placegrid crates.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::DescriptorError;

/// Identifier of a node in the static cluster topology.
pub type NodeId = String;

/// Field separator of the durable placement log.
///
/// Descriptor fields may not contain it, see [`AppDescriptor::validate`].
pub const RECORD_DELIMITER: char = ';';

// ── Resource type ──────────────────────────────────────────────────

/// Coarse classification of an app's dominant resource profile.
///
/// Only used as a co-location diversity heuristic, never as a quota.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ResourceType {
    #[serde(rename = "CPU")]
    Cpu,
    #[serde(rename = "Memory")]
    Memory,
}

impl ResourceType {
    /// Canonical spelling, as accepted on the wire and written to the log.
    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceType::Cpu => "CPU",
            ResourceType::Memory => "Memory",
        }
    }
}

impl fmt::Display for ResourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for ResourceType {
    type Err = DescriptorError;

    /// Exact, case-sensitive match: `"cpu"` is rejected.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "CPU" => Ok(ResourceType::Cpu),
            "Memory" => Ok(ResourceType::Memory),
            other => Err(DescriptorError::UnknownResourceType(other.to_string())),
        }
    }
}

// ── App descriptor ─────────────────────────────────────────────────

/// A deployable unit as requested by a client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppDescriptor {
    /// Unique key among placed apps. Case-sensitive.
    pub name: String,
    #[serde(rename = "type")]
    pub resource_type: ResourceType,
    /// Image reference of the deployable artifact.
    pub image: String,
}

impl AppDescriptor {
    pub fn new(name: impl Into<String>, resource_type: ResourceType, image: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            resource_type,
            image: image.into(),
        }
    }

    /// Check that the descriptor can be placed and recorded.
    ///
    /// The name also names the manifest file, so it may not contain a path
    /// separator. Image references keep their `/`.
    pub fn validate(&self) -> Result<(), DescriptorError> {
        check_field("name", &self.name)?;
        if self.name.contains(['/', '\\']) {
            return Err(DescriptorError::ForbiddenCharacter { field: "name" });
        }
        check_field("image", &self.image)?;
        Ok(())
    }

    /// Lower-cased name used when forming external identifiers.
    pub fn external_name(&self) -> String {
        self.name.to_lowercase()
    }
}

fn check_field(field: &'static str, value: &str) -> Result<(), DescriptorError> {
    if value.trim().is_empty() {
        return Err(DescriptorError::MissingField(field));
    }
    if value.contains([RECORD_DELIMITER, '\n', '\r']) {
        return Err(DescriptorError::ForbiddenCharacter { field });
    }
    Ok(())
}

// ── Placement record ───────────────────────────────────────────────

/// Durable record of one successful placement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlacementRecord {
    pub node_id: NodeId,
    pub app_name: String,
    pub resource_type: ResourceType,
    pub image: String,
}

impl PlacementRecord {
    pub fn new(node_id: &str, app: &AppDescriptor) -> Self {
        Self {
            node_id: node_id.to_string(),
            app_name: app.name.clone(),
            resource_type: app.resource_type,
            image: app.image.clone(),
        }
    }

    /// Split into the node id and the descriptor it places.
    pub fn into_parts(self) -> (NodeId, AppDescriptor) {
        let app = AppDescriptor {
            name: self.app_name,
            resource_type: self.resource_type,
            image: self.image,
        };
        (self.node_id, app)
    }
}
