use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, bail};
use tracing::{error, info, warn};

use crate::render::{self, Profile, RenderJob};
use crate::repo;
use crate::report;

/// Validation scenarios, each a subdirectory of the reference suite's scene
/// root.
pub const SCENARIOS: [&str; 3] = ["ball", "sphere", "sphere-ibl"];

pub const DEFAULT_OUTPUT_DIR: &str = "validation/renderings";
pub const DEFAULT_REPORT_DIR: &str = "validation/report";

#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// Narrow the run to a single scenario.
    pub scenario: Option<String>,
    /// Render only the scene whose stem matches exactly.
    pub testcase: Option<String>,
    /// Render only scenes whose path contains this substring.
    pub filter: Option<String>,
    pub profile: Profile,
}

#[derive(Debug, Clone)]
pub struct RunnerConfig {
    /// Headless renderer binary.
    pub renderer: PathBuf,
    /// Local checkout of the reference suite.
    pub checkout_dir: PathBuf,
    pub repo_url: String,
    pub output_dir: PathBuf,
    pub report_dir: PathBuf,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        RunnerConfig {
            renderer: PathBuf::from("pt-render"),
            checkout_dir: PathBuf::from(repo::DEFAULT_CHECKOUT_DIR),
            repo_url: repo::REFERENCE_REPO_URL.to_string(),
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            report_dir: PathBuf::from(DEFAULT_REPORT_DIR),
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct RunSummary {
    pub rendered: usize,
    pub failed: usize,
}

impl RunSummary {
    pub fn all_ok(&self) -> bool {
        self.failed == 0
    }
}

pub fn selected_scenarios(scenario: Option<&str>) -> anyhow::Result<Vec<&'static str>> {
    match scenario {
        None => Ok(SCENARIOS.to_vec()),
        Some(name) => match SCENARIOS.iter().find(|s| **s == name) {
            Some(s) => Ok(vec![s]),
            None => bail!(
                "unknown scenario {name:?}, valid scenarios: {}",
                SCENARIOS.join(", ")
            ),
        },
    }
}

/// List one scenario directory and build the selected render jobs.
pub fn scenario_jobs(
    scenario: &str,
    scenario_dir: &Path,
    options: &RunOptions,
) -> anyhow::Result<Vec<RenderJob>> {
    if !scenario_dir.is_dir() {
        warn!(
            "scenario directory {} does not exist, skipping",
            scenario_dir.display()
        );
        return Ok(Vec::new());
    }

    let mut scenes = Vec::new();
    let mut environments = Vec::new();

    for entry in fs::read_dir(scenario_dir)
        .with_context(|| format!("failed to read {}", scenario_dir.display()))?
    {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        let path = entry.path();
        match path.extension().and_then(|e| e.to_str()) {
            Some("gltf") => scenes.push(path),
            Some("hdr") => environments.push(path),
            _ => {}
        }
    }

    scenes.sort();
    environments.sort();

    if let Some(filter) = &options.filter {
        scenes.retain(|path| path.to_string_lossy().contains(filter.as_str()));
        info!("rendering filtered list of {} scene(s)", scenes.len());
    }

    // every job of a scenario shares the scenario's environment light
    let ibl_path = environments.first().cloned();
    let settings = options.profile.settings();

    let mut jobs = Vec::new();
    for scene_path in scenes {
        let Some(stem) = scene_path.file_stem().and_then(|s| s.to_str()) else {
            warn!("skipping non-utf8 scene name: {}", scene_path.display());
            continue;
        };
        if let Some(testcase) = &options.testcase {
            if testcase != stem {
                continue;
            }
        }
        jobs.push(RenderJob {
            scenario: scenario.to_string(),
            scene_path: scene_path.clone(),
            scene_name: stem.to_string(),
            ibl_path: ibl_path.clone(),
            settings,
        });
    }

    Ok(jobs)
}

/// Run the full validation pipeline: reset output directories, sync the
/// reference suite, render every selected scene, then generate the report.
///
/// A failed render is counted and the loop moves on; the caller decides the
/// final exit status from the returned summary.
pub fn run(config: &RunnerConfig, options: &RunOptions) -> anyhow::Result<RunSummary> {
    repo::check_git()?;
    render::check_renderer(&config.renderer)?;
    report::check_python()?;

    let scenarios = selected_scenarios(options.scenario.as_deref())?;

    for dir in [&config.output_dir, &config.report_dir] {
        if dir.is_dir() {
            fs::remove_dir_all(dir)
                .with_context(|| format!("failed to clean {}", dir.display()))?;
        }
    }

    repo::sync(&config.checkout_dir, &config.repo_url)?;

    let scene_root = config.checkout_dir.join(repo::SCENES_SUBDIR);

    let mut summary = RunSummary::default();
    for scenario in scenarios {
        let dest_dir = config.output_dir.join(scenario);
        fs::create_dir_all(&dest_dir)
            .with_context(|| format!("failed to create {}", dest_dir.display()))?;

        let jobs = scenario_jobs(scenario, &scene_root.join(scenario), options)?;
        if jobs.is_empty() {
            info!("no scenes selected for scenario {scenario}");
            continue;
        }

        for job in jobs {
            info!(
                "rendering {} ({} spp)",
                job.scene_path.display(),
                job.settings.samples_per_pixel
            );
            let dest = dest_dir.join(format!("{}.png", job.scene_name));
            match render::execute(
                &config.renderer,
                &job,
                Path::new(render::RENDERER_OUTPUT_FILE),
                &dest,
            ) {
                Ok(()) => summary.rendered += 1,
                Err(e) => {
                    // best effort: keep rendering, surface the count at the end
                    error!("render failed: {e:#}");
                    summary.failed += 1;
                }
            }
        }
    }

    report::generate(&config.checkout_dir, &config.output_dir, &config.report_dir)?;

    Ok(summary)
}
