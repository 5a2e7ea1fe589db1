//! Deployment through an external command, `kubectl apply -f` by default.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use placegrid_core::AppDescriptor;
use placegrid_core::config::DeployConfig;
use placegrid_placement::{DeployFuture, DeploymentExecutor};
use tokio::process::Command;
use tracing::{debug, info, warn};

use crate::manifest::{manifest_file_name, render_manifest};

/// Writes a manifest per app and runs `command <manifest>`.
#[derive(Debug, Clone)]
pub struct KubectlExecutor {
    command: Vec<String>,
    manifest_dir: PathBuf,
}

impl KubectlExecutor {
    /// `command` is the program followed by its leading arguments.
    pub fn new(command: Vec<String>, manifest_dir: impl Into<PathBuf>) -> Self {
        Self {
            command,
            manifest_dir: manifest_dir.into(),
        }
    }

    pub fn from_config(config: &DeployConfig) -> Self {
        Self::new(config.command.clone(), config.manifest_dir.clone())
    }

    pub fn manifest_dir(&self) -> &Path {
        &self.manifest_dir
    }

    async fn apply(&self, node_id: &str, app: &AppDescriptor) -> Result<()> {
        let (program, args) = self
            .command
            .split_first()
            .context("deploy command is empty")?;

        let file_name = manifest_file_name(app);
        if file_name.contains(['/', '\\']) {
            bail!("app name {:?} cannot be used as a manifest file name", app.name);
        }
        let path = self.manifest_dir.join(file_name);

        tokio::fs::create_dir_all(&self.manifest_dir)
            .await
            .with_context(|| format!("failed to create {}", self.manifest_dir.display()))?;
        tokio::fs::write(&path, render_manifest(node_id, app))
            .await
            .with_context(|| format!("failed to write manifest {}", path.display()))?;
        debug!(path = %path.display(), "manifest written");

        let output = Command::new(program)
            .args(args)
            .arg(&path)
            .output()
            .await
            .with_context(|| format!("failed to execute '{program}'"))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let stdout = String::from_utf8_lossy(&output.stdout);
            let exit_code = output.status.code().unwrap_or(-1);
            bail!(
                "'{program}' failed (exit code {exit_code}).\n\n\
                 --- stderr ---\n{stderr}\n\
                 --- stdout ---\n{stdout}"
            );
        }

        debug!(stdout = %String::from_utf8_lossy(&output.stdout).trim(), "deploy command output");
        Ok(())
    }
}

impl DeploymentExecutor for KubectlExecutor {
    fn deploy<'a>(&'a self, node_id: &'a str, app: &'a AppDescriptor) -> DeployFuture<'a> {
        Box::pin(async move {
            match self.apply(node_id, app).await {
                Ok(()) => {
                    info!(app = %app.name, node = %node_id, "deployment applied");
                    true
                }
                Err(e) => {
                    warn!(app = %app.name, node = %node_id, error = %format!("{e:#}"), "deployment failed");
                    false
                }
            }
        })
    }
}
