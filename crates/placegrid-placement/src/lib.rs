//! placegrid placement — decides which node hosts an app.
//!
//! The engine owns an in-memory [`NodeRegistry`] rebuilt from a
//! [`StateStore`](placegrid_state::StateStore) at startup, picks a node with
//! a two-pass policy, hands the app to a [`DeploymentExecutor`], and records
//! the placement only once the executor reports success.
//!
//! # Components
//!
//! - **`registry`** — node → apps mapping over a static topology
//! - **`selector`** — empty-node preference, then mixed-type co-location
//! - **`engine`** — validation, deduplication, deploy, commit
//! - **`executor`** — the deployment capability the engine calls into

pub mod engine;
pub mod error;
pub mod executor;
pub mod registry;
pub mod selector;

pub use engine::{Placement, PlacementEngine, SharedEngine};
pub use error::{PlacementError, PlacementResult};
pub use executor::{DeployFuture, DeploymentExecutor};
pub use registry::{NodeRegistry, NodeView};
pub use selector::{Candidate, NODE_CAPACITY, SelectionPass, select_node};
