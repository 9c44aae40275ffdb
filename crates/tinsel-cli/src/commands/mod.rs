//! CLI command implementations

pub mod config;
pub mod generate;
pub mod simulate;

use anyhow::{Context, Result};
use std::path::Path;
use tinsel_particles::SceneConfig;

/// Load a scene file, or the default scene when no path is given
pub fn load_scene(path: Option<&str>) -> Result<SceneConfig> {
    match path {
        Some(path) => SceneConfig::load(Path::new(path))
            .with_context(|| format!("failed to load scene '{path}'")),
        None => Ok(SceneConfig::default()),
    }
}
