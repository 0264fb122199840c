use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};

use crate::config::app_cache_dir;
use crate::trainer::TrainedModels;

const BUNDLE_VERSION: u32 = 1;

#[derive(Debug, Serialize, Deserialize)]
struct ModelBundle {
    version: u32,
    trained_at: String,
    models: TrainedModels,
}

pub fn default_bundle_path() -> Option<PathBuf> {
    app_cache_dir().map(|dir| dir.join("models.json"))
}

/// Writes through a temp file so a crash never leaves a half-written bundle.
pub fn save_bundle(path: &Path, models: &TrainedModels) -> Result<()> {
    if let Some(parent) = path.parent() {
        let _ = fs::create_dir_all(parent);
    }
    let bundle = ModelBundle {
        version: BUNDLE_VERSION,
        trained_at: chrono::Utc::now().to_rfc3339(),
        models: models.clone(),
    };
    let tmp = path.with_extension("json.tmp");
    let json = serde_json::to_string(&bundle).context("serialize model bundle")?;
    fs::write(&tmp, json).context("write model bundle")?;
    fs::rename(&tmp, path).context("swap model bundle")?;
    Ok(())
}

pub fn load_bundle(path: &Path) -> Result<TrainedModels> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("read model bundle {}", path.display()))?;
    let bundle: ModelBundle = serde_json::from_str(&raw).context("parse model bundle")?;
    if bundle.version != BUNDLE_VERSION {
        bail!(
            "model bundle version {} is not supported (expected {BUNDLE_VERSION})",
            bundle.version
        );
    }
    Ok(bundle.models)
}
