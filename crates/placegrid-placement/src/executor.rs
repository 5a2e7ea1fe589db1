//! Deployment executor capability.
//!
//! The engine only learns whether a deployment succeeded. How it is
//! performed (manifest rendering, `kubectl`, an API call) stays behind
//! this trait.

use std::future::Future;
use std::pin::Pin;

use placegrid_core::AppDescriptor;

/// Boxed future alias for deployment results.
pub type DeployFuture<'a> = Pin<Box<dyn Future<Output = bool> + Send + 'a>>;

/// Performs the actual deployment of an app onto a node.
pub trait DeploymentExecutor: Send + Sync {
    /// Deploy `app` onto `node_id`. Resolves to `true` on success.
    fn deploy<'a>(&'a self, node_id: &'a str, app: &'a AppDescriptor) -> DeployFuture<'a>;
}
