use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use anyhow::{Context, bail};
use tracing::warn;
use walkdir::WalkDir;

/// Name of the generated module, written inside the scanned directory.
pub const INDEX_FILENAME: &str = "scene_index.js";

/// Scene name -> forward-slash path.
pub type SceneIndex = BTreeMap<String, String>;

/// Recursively collect all GLTF/GLB files under `root`.
///
/// Paths are sorted before key extraction, so a stem appearing more than once
/// resolves to the lexicographically-last path no matter the on-disk order.
pub fn scan(root: &Path) -> anyhow::Result<SceneIndex> {
    if !root.is_dir() {
        bail!("{} is not a directory", root.display());
    }

    let mut paths: Vec<_> = WalkDir::new(root)
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(e) => {
                warn!("skipping unreadable entry: {e}");
                None
            }
        })
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| entry.into_path())
        .filter(|path| {
            matches!(
                path.extension().and_then(|e| e.to_str()),
                Some("gltf") | Some("glb")
            )
        })
        .collect();

    paths.sort();

    let mut index = SceneIndex::new();
    for path in paths {
        let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
            warn!("skipping non-utf8 scene name: {}", path.display());
            continue;
        };
        index.insert(stem.to_string(), slash_path(&path));
    }

    Ok(index)
}

// the generated module is consumed by the web viewer, which expects '/'
// separators on every platform
fn slash_path(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}

/// Render the index as a JS module: a JSON object assignment followed by a
/// default export.
pub fn module_source(index: &SceneIndex) -> anyhow::Result<String> {
    let data = serde_json::to_string_pretty(index).context("failed to serialize scene index")?;
    Ok(format!(
        "var scene_index = {data};\n\nexport default scene_index;\n"
    ))
}

pub fn write_module(index: &SceneIndex, out_path: &Path) -> anyhow::Result<()> {
    let source = module_source(index)?;
    fs::write(out_path, source)
        .with_context(|| format!("failed to write {}", out_path.display()))?;
    Ok(())
}
