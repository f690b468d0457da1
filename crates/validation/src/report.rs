use std::env;
use std::path::{Path, PathBuf};
use std::process::Command;

use anyhow::{Context, bail};
use tracing::info;

/// Comparison mode understood by the suite's validate.py.
pub const COMPARE_MODE: &str = "only_gamma";

/// Per-image error threshold.
pub const ERROR_THRESHOLD: &str = "0.5";

pub fn check_python() -> anyhow::Result<()> {
    match Command::new("python").arg("--version").output() {
        Ok(o) if o.status.success() => Ok(()),
        _ => bail!("python is not installed or not on PATH"),
    }
}

/// Invoke the suite's comparison script over the collected renderings.
///
/// The script resolves its own reference images relative to its location, so
/// it runs from the checkout's validation directory; everything we pass is
/// made absolute first.
pub fn generate(checkout_dir: &Path, renderings: &Path, report_dir: &Path) -> anyhow::Result<()> {
    let script_dir = checkout_dir.join("validation");
    if !script_dir.join("validate.py").is_file() {
        bail!("validate.py not found in {}", script_dir.display());
    }

    let renderings = absolute(renderings)?;
    let report_dir = absolute(report_dir)?;

    info!("generating report in {}", report_dir.display());
    let status = Command::new("python")
        .arg("validate.py")
        .arg("-i")
        .arg(&renderings)
        .args(["-m", COMPARE_MODE])
        .args(["-t", ERROR_THRESHOLD])
        .arg("-o")
        .arg(&report_dir)
        .current_dir(&script_dir)
        .status()
        .context("failed to run validate.py")?;
    if !status.success() {
        bail!("validate.py exited with {status}");
    }

    Ok(())
}

fn absolute(path: &Path) -> anyhow::Result<PathBuf> {
    if path.is_relative() {
        let cwd = env::current_dir().context("failed to get current directory")?;
        Ok(cwd.join(path))
    } else {
        Ok(path.to_path_buf())
    }
}
