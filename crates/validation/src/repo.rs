use std::path::Path;
use std::process::Command;

use anyhow::{Context, bail};
use tracing::info;

/// Upstream repository holding the validation scenes and the report script.
pub const REFERENCE_REPO_URL: &str =
    "https://github.com/DassaultSystemes-Technology/EnterprisePBRShadingModel.git";

/// Directory the reference suite is checked out into.
pub const DEFAULT_CHECKOUT_DIR: &str = "EnterprisePBRShadingModel";

/// Scenario root inside the checkout.
pub const SCENES_SUBDIR: &str = "validation/scenes";

pub fn check_git() -> anyhow::Result<()> {
    let output = Command::new("git").arg("--version").output();
    match output {
        Ok(o) if o.status.success() => Ok(()),
        _ => bail!("git is not installed or not on PATH"),
    }
}

/// Clone the reference repository, or pull if a checkout already exists.
pub fn sync(dir: &Path, url: &str) -> anyhow::Result<()> {
    if dir.is_dir() {
        info!("updating reference checkout in {}", dir.display());
        let status = Command::new("git")
            .arg("pull")
            .current_dir(dir)
            .status()
            .with_context(|| format!("failed to run git pull in {}", dir.display()))?;
        if !status.success() {
            bail!("git pull failed with {status}");
        }
    } else {
        info!("cloning {url}");
        let status = Command::new("git")
            .args(["clone", url])
            .arg(dir)
            .status()
            .context("failed to run git clone")?;
        if !status.success() {
            bail!("git clone failed with {status}");
        }
    }

    Ok(())
}
