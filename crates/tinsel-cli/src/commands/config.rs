//! Scene config command: print defaults or validate a file

use anyhow::{Context, Result};

use super::load_scene;

pub fn run(scene: Option<&str>) -> Result<()> {
    let mut config = load_scene(scene)?;

    if scene.is_some() {
        let (tree, issues) = config.tree.sanitize();
        if issues.is_empty() {
            println!("# Config OK");
        } else {
            println!("# {} setting(s) out of range, clamped:", issues.len());
            for issue in &issues {
                println!("#   {issue}");
            }
        }
        let missing = config
            .photos
            .iter()
            .filter(|p| p.trim().is_empty())
            .count();
        if missing > 0 {
            println!("# {missing} photo slot(s) without an image will render as placeholders");
        }
        config.tree = tree;
    }

    let toml = config
        .to_toml_string()
        .context("failed to serialize scene config")?;
    print!("{toml}");
    Ok(())
}
