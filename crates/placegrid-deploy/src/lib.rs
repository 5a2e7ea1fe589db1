//! placegrid-deploy — turns a placement decision into a running workload.
//!
//! Renders a Kubernetes `Deployment` pinned to the chosen node through a
//! `nodeSelector`, writes it next to the daemon, and applies it with the
//! configured command (`kubectl apply -f` by default). Only the exit status
//! is reported back to the placement engine.

pub mod kubectl;
pub mod manifest;

pub use kubectl::KubectlExecutor;
pub use manifest::{manifest_file_name, render_manifest};
