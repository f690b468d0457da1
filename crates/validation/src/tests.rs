use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use tempfile::tempdir;

use crate::index;
use crate::render::{self, Profile, RenderJob};
use crate::runner::{self, RunOptions};

fn touch(path: &Path) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, b"").unwrap();
}

fn job(scene: &str, ibl: Option<&str>, profile: Profile) -> RenderJob {
    RenderJob {
        scenario: "ball".to_string(),
        scene_path: scene.into(),
        scene_name: Path::new(scene)
            .file_stem()
            .unwrap()
            .to_string_lossy()
            .into_owned(),
        ibl_path: ibl.map(Into::into),
        settings: profile.settings(),
    }
}

fn command_line(renderer: &str, job: &RenderJob) -> String {
    render::render_command(Path::new(renderer), job)
        .get_args()
        .map(|a| a.to_string_lossy().into_owned())
        .collect::<Vec<_>>()
        .join(" ")
}

#[test]
fn index_collects_scene_files() {
    let dir = tempdir().unwrap();
    let root = dir.path();
    touch(&root.join("a.gltf"));
    touch(&root.join("nested/b.glb"));
    touch(&root.join("nested/readme.txt"));
    touch(&root.join("environment.hdr"));

    let index = index::scan(root).unwrap();
    assert_eq!(index.len(), 2);
    assert!(index["a"].ends_with("/a.gltf"));
    assert!(index["b"].ends_with("/nested/b.glb"));
    assert!(!index["b"].contains('\\'));
}

#[test]
fn index_duplicate_stems_keep_last_path() {
    let dir = tempdir().unwrap();
    let root = dir.path();
    // "sub/x.gltf" sorts before "x.glb", so the glb wins
    touch(&root.join("sub/x.gltf"));
    touch(&root.join("x.glb"));

    let index = index::scan(root).unwrap();
    assert_eq!(index.len(), 1);
    assert!(index["x"].ends_with("/x.glb"));
}

#[test]
fn index_of_empty_directory_is_empty() {
    let dir = tempdir().unwrap();
    let index = index::scan(dir.path()).unwrap();
    assert!(index.is_empty());

    let source = index::module_source(&index).unwrap();
    assert!(source.starts_with("var scene_index = {}"));
}

#[test]
fn index_missing_root_is_an_error() {
    assert!(index::scan(Path::new("no/such/dir")).is_err());
}

#[test]
fn index_module_round_trips_as_json() {
    let dir = tempdir().unwrap();
    let root = dir.path();
    touch(&root.join("metal-roughness-0.05.gltf"));
    touch(&root.join("refraction.glb"));

    let index = index::scan(root).unwrap();
    let out = root.join(index::INDEX_FILENAME);
    index::write_module(&index, &out).unwrap();

    let source = fs::read_to_string(&out).unwrap();
    let json = source
        .strip_prefix("var scene_index = ")
        .unwrap()
        .strip_suffix(";\n\nexport default scene_index;\n")
        .unwrap();
    let parsed: BTreeMap<String, String> = serde_json::from_str(json).unwrap();
    assert_eq!(parsed, index);
}

#[test]
fn empty_scenario_directory_yields_no_jobs() {
    let dir = tempdir().unwrap();
    let jobs = runner::scenario_jobs("ball", dir.path(), &RunOptions::default()).unwrap();
    assert!(jobs.is_empty());
}

#[test]
fn filter_with_no_match_yields_no_jobs() {
    let dir = tempdir().unwrap();
    touch(&dir.path().join("base.gltf"));

    let options = RunOptions {
        filter: Some("does-not-match".to_string()),
        ..Default::default()
    };
    let jobs = runner::scenario_jobs("ball", dir.path(), &options).unwrap();
    assert!(jobs.is_empty());
}

#[test]
fn testcase_selects_exactly_one_scene() {
    let dir = tempdir().unwrap();
    touch(&dir.path().join("a.gltf"));
    touch(&dir.path().join("b.gltf"));

    let options = RunOptions {
        testcase: Some("b".to_string()),
        ..Default::default()
    };
    let jobs = runner::scenario_jobs("ball", dir.path(), &options).unwrap();
    assert_eq!(jobs.len(), 1);
    assert_eq!(jobs[0].scene_name, "b");
}

#[test]
fn environment_file_is_attached_to_every_job() {
    let dir = tempdir().unwrap();
    touch(&dir.path().join("a.gltf"));
    touch(&dir.path().join("b.gltf"));
    touch(&dir.path().join("environment.hdr"));

    let jobs = runner::scenario_jobs("sphere-ibl", dir.path(), &RunOptions::default()).unwrap();
    assert_eq!(jobs.len(), 2);
    for job in &jobs {
        let ibl = job.ibl_path.as_ref().unwrap();
        assert!(ibl.ends_with("environment.hdr"));
    }
}

#[test]
fn no_environment_means_no_ibl_jobs() {
    let dir = tempdir().unwrap();
    touch(&dir.path().join("a.gltf"));

    let jobs = runner::scenario_jobs("sphere", dir.path(), &RunOptions::default()).unwrap();
    assert_eq!(jobs.len(), 1);
    assert!(jobs[0].ibl_path.is_none());
}

#[test]
fn render_command_uses_fixed_flags() {
    let args = command_line("pt-render", &job("scenes/ball/base.gltf", None, Profile::Standard));
    assert!(args.starts_with("scenes/ball/base.gltf"));
    assert!(args.contains("--res 400 400"));
    assert!(args.contains("--samples 128"));
    assert!(args.contains("-b 32"));
    assert!(!args.contains("--ibl"));
}

#[test]
fn render_command_passes_environment_light() {
    let args = command_line(
        "pt-render",
        &job("base.gltf", Some("environment.hdr"), Profile::Standard),
    );
    assert!(args.contains("--ibl environment.hdr"));
    assert!(!args.contains("--ibl-rotation"));
}

#[test]
fn high_quality_profile_raises_samples_and_rotates_ibl() {
    let args = command_line(
        "pt-render",
        &job("base.gltf", Some("environment.hdr"), Profile::HighQuality),
    );
    assert!(args.contains("--samples 512"));
    assert!(args.contains("--ibl-rotation 180"));
}

#[test]
fn all_scenarios_selected_by_default() {
    let scenarios = runner::selected_scenarios(None).unwrap();
    assert_eq!(scenarios, runner::SCENARIOS.to_vec());
}

#[test]
fn single_scenario_can_be_selected() {
    let scenarios = runner::selected_scenarios(Some("sphere")).unwrap();
    assert_eq!(scenarios, vec!["sphere"]);
}

#[test]
fn unknown_scenario_is_an_error() {
    assert!(runner::selected_scenarios(Some("teapot")).is_err());
}

#[cfg(unix)]
#[test]
fn execute_copies_renderer_output() {
    let dir = tempdir().unwrap();
    let output = dir.path().join("output.png");
    fs::write(&output, b"fake png").unwrap();
    let dest = dir.path().join("base.png");

    // "true" ignores the render arguments and exits cleanly
    render::execute(
        Path::new("true"),
        &job("base.gltf", None, Profile::Standard),
        &output,
        &dest,
    )
    .unwrap();
    assert_eq!(fs::read(&dest).unwrap(), b"fake png");
}

#[cfg(unix)]
#[test]
fn execute_surfaces_renderer_failure() {
    let dir = tempdir().unwrap();
    let result = render::execute(
        Path::new("false"),
        &job("base.gltf", None, Profile::Standard),
        &dir.path().join("output.png"),
        &dir.path().join("base.png"),
    );
    assert!(result.is_err());
}
