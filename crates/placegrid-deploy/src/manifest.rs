//! Kubernetes manifest rendering.

use placegrid_core::AppDescriptor;

/// Render an `apps/v1` Deployment that pins `app` to `node_id`.
///
/// Resource names use the lower-cased app name; nodes are matched through
/// their `group` label.
pub fn render_manifest(node_id: &str, app: &AppDescriptor) -> String {
    let name = app.external_name();
    let image = &app.image;
    format!(
        "apiVersion: apps/v1
kind: Deployment
metadata:
  name: {name}-deployment
spec:
  selector:
    matchLabels:
      app: {name}-app
  template:
    metadata:
      labels:
        app: {name}-app
    spec:
      nodeSelector:
        group: {node_id}
      containers:
      - name: {name}-container
        image: {image}
"
    )
}

/// File name the manifest for `app` is written to.
pub fn manifest_file_name(app: &AppDescriptor) -> String {
    format!("deployment_{}.yaml", app.name)
}
