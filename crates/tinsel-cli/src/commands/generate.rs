//! Generate command: build the particle set and summarize it

use anyhow::{Context, Result};
use std::time::Instant;
use tinsel_core::Vec3;
use tinsel_particles::{generate, LightTheme, ParticleKind};

use super::load_scene;

pub struct GenerateArgs {
    pub scene: Option<String>,
    pub count: Option<i64>,
    pub seed: Option<u32>,
    pub theme: Option<String>,
    pub json: Option<String>,
}

pub fn run(args: GenerateArgs) -> Result<()> {
    let scene = load_scene(args.scene.as_deref())?;
    let mut tree = scene.tree;
    if let Some(count) = args.count {
        tree.particle_count = count;
    }
    if let Some(seed) = args.seed {
        tree.seed = seed;
    }
    if let Some(theme) = args.theme.as_deref() {
        tree.light_theme = LightTheme::parse(theme)?;
    }

    let (tree, issues) = tree.sanitize();
    for issue in &issues {
        println!("Warning: {issue}");
    }

    let start = Instant::now();
    let set = generate(&tree);
    let elapsed = start.elapsed();

    println!(
        "Generated {} particles in {:.2}ms (seed {:#010x})",
        set.len(),
        elapsed.as_secs_f64() * 1000.0,
        tree.seed
    );
    for kind in ParticleKind::ALL {
        let n = set.counts.get(kind);
        let share = if set.is_empty() {
            0.0
        } else {
            n as f64 / set.len() as f64 * 100.0
        };
        println!("  {:<10} {:>6}  ({share:.1}%)", kind.name(), n);
    }

    if let Some((min, max)) = bounds(set.iter().map(|r| r.tree_position)) {
        println!("Tree bounds:    {} .. {}", fmt_vec(min), fmt_vec(max));
    }
    if let Some((min, max)) = bounds(set.iter().map(|r| r.scatter_position)) {
        println!("Scatter bounds: {} .. {}", fmt_vec(min), fmt_vec(max));
    }
    let center = set.silhouette.center();
    let nearest_scatter = set
        .iter()
        .map(|r| r.scatter_position.distance(&center))
        .fold(f32::INFINITY, f32::min);
    if nearest_scatter.is_finite() {
        println!(
            "Nearest scatter point: {nearest_scatter:.2} from center (tree bound {:.2})",
            set.silhouette.bounding_radius()
        );
    }

    if let Some(path) = args.json {
        let json = set.to_json_pretty().context("failed to serialize particles")?;
        std::fs::write(&path, json).with_context(|| format!("failed to write '{path}'"))?;
        println!("Wrote {} records to {path}", set.len());
    }

    Ok(())
}

fn bounds(points: impl Iterator<Item = Vec3>) -> Option<(Vec3, Vec3)> {
    points.fold(None, |acc, p| {
        Some(match acc {
            None => (p, p),
            Some((min, max)) => (
                Vec3::new(min.x.min(p.x), min.y.min(p.y), min.z.min(p.z)),
                Vec3::new(max.x.max(p.x), max.y.max(p.y), max.z.max(p.z)),
            ),
        })
    })
}

fn fmt_vec(v: Vec3) -> String {
    format!("({:.2}, {:.2}, {:.2})", v.x, v.y, v.z)
}
