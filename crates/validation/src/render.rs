use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use anyhow::{Context, bail};
use tracing::info;

/// The headless renderer always writes its result here, relative to its
/// working directory.
pub const RENDERER_OUTPUT_FILE: &str = "output.png";

#[derive(Debug, Clone, Copy)]
pub struct RenderSettings {
    pub width: u32,
    pub height: u32,
    pub samples_per_pixel: u32,
    pub max_bounces: u32,
    /// Environment rotation in degrees, only passed to the renderer when set.
    pub ibl_rotation: Option<u32>,
}

/// Quality profile for a validation run. The reference images are compared
/// with a loose threshold, so the standard profile keeps sample counts low.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Profile {
    #[default]
    Standard,
    HighQuality,
}

impl Profile {
    pub fn settings(self) -> RenderSettings {
        match self {
            Profile::Standard => RenderSettings {
                width: 400,
                height: 400,
                samples_per_pixel: 128,
                max_bounces: 32,
                ibl_rotation: None,
            },
            Profile::HighQuality => RenderSettings {
                width: 400,
                height: 400,
                samples_per_pixel: 512,
                max_bounces: 32,
                ibl_rotation: Some(180),
            },
        }
    }
}

/// One render invocation, fully determined by directory contents and the
/// selected profile.
#[derive(Debug, Clone)]
pub struct RenderJob {
    pub scenario: String,
    pub scene_path: PathBuf,
    pub scene_name: String,
    /// Environment light shared by every scene of the scenario, if one exists.
    pub ibl_path: Option<PathBuf>,
    pub settings: RenderSettings,
}

pub fn check_renderer(renderer: &Path) -> anyhow::Result<()> {
    match Command::new(renderer).arg("--help").output() {
        Ok(_) => Ok(()),
        Err(_) => bail!(
            "renderer {} could not be launched; pass --renderer or fix PATH",
            renderer.display()
        ),
    }
}

/// Build the renderer invocation for one job with explicit arguments.
pub fn render_command(renderer: &Path, job: &RenderJob) -> Command {
    let settings = &job.settings;

    let mut cmd = Command::new(renderer);
    cmd.arg(&job.scene_path)
        .arg("--res")
        .arg(settings.width.to_string())
        .arg(settings.height.to_string())
        .arg("--samples")
        .arg(settings.samples_per_pixel.to_string())
        .arg("-b")
        .arg(settings.max_bounces.to_string());

    if let Some(ibl) = &job.ibl_path {
        cmd.arg("--ibl").arg(ibl);
    }
    if let Some(rotation) = settings.ibl_rotation {
        cmd.arg("--ibl-rotation").arg(rotation.to_string());
    }

    cmd
}

/// Run one render and move its fixed-name output image to `dest`.
pub fn execute(
    renderer: &Path,
    job: &RenderJob,
    output_file: &Path,
    dest: &Path,
) -> anyhow::Result<()> {
    let status = render_command(renderer, job)
        .status()
        .with_context(|| format!("failed to launch renderer for {}", job.scene_path.display()))?;
    if !status.success() {
        bail!(
            "renderer exited with {status} for {}",
            job.scene_path.display()
        );
    }

    info!("copying output to {}", dest.display());
    fs::copy(output_file, dest).with_context(|| {
        format!(
            "failed to copy {} to {}",
            output_file.display(),
            dest.display()
        )
    })?;

    Ok(())
}
