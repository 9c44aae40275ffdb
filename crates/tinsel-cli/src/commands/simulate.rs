//! Simulate command: drive the tree headless at a fixed timestep

use anyhow::{bail, Result};
use tinsel_particles::{ParticleInstance, TreeSystem};
use tinsel_runtime::{ControlSignal, FrameClock, RuntimeSystem};

use super::load_scene;

/// Remaining distance at which a transition counts as settled
const SETTLE_EPSILON: f32 = 1e-2;

pub struct SimulateArgs {
    pub scene: Option<String>,
    pub frames: u64,
    pub fps: u32,
    pub explode_at: Option<u64>,
    pub assemble_at: Option<u64>,
    pub rotation: f32,
    pub highlight: Option<i64>,
    pub report_every: u64,
}

pub fn run(args: SimulateArgs) -> Result<()> {
    if args.fps == 0 {
        bail!("--fps must be greater than zero");
    }
    let scene = load_scene(args.scene.as_deref())?;

    let mut system = TreeSystem::from_scene(&scene);
    system.initialize()?;

    system.push_signal(ControlSignal::Rotate(args.rotation));
    if let Some(index) = args.highlight {
        system.push_signal(ControlSignal::SelectPhoto(index));
    }

    let dt = 1.0 / args.fps as f64;
    let mut clock = FrameClock::new();
    let mut settled_at: Option<u64> = None;
    let mut transition_start = 0;
    let mut skipped_total = 0;

    println!(
        "Simulating {} frames at {} fps ({} particles, {} photo(s))",
        args.frames,
        args.fps,
        system.particles().len(),
        system.gallery().len()
    );

    for frame in 0..args.frames {
        if args.explode_at == Some(frame) {
            system.push_signal(ControlSignal::Explode);
            transition_start = frame;
            settled_at = None;
        }
        if args.assemble_at == Some(frame) {
            system.push_signal(ControlSignal::Assemble);
            transition_start = frame;
            settled_at = None;
        }

        clock.advance(dt);
        let stats = system.frame(clock.delta_time as f32);
        skipped_total += stats.skipped;

        if settled_at.is_none() && stats.settled(SETTLE_EPSILON) {
            settled_at = Some(frame);
            println!(
                "  frame {frame:>5}: {} settled after {} frame(s)",
                if system.controls().exploded { "scatter" } else { "tree" },
                frame - transition_start + 1
            );
        }
        if args.report_every > 0 && (frame + 1) % args.report_every == 0 {
            println!(
                "  frame {:>5}  t={:>6.2}s  remaining={:.4}  exploded={}",
                frame + 1,
                clock.total_time,
                stats.max_remaining,
                system.controls().exploded
            );
        }
    }

    for degradation in system.take_degradations() {
        println!("Warning: {degradation}");
    }

    let emitting = system
        .rendered()
        .iter()
        .filter(|p| p.emissive.is_some())
        .count();
    let highlighted = system
        .rendered_cards()
        .iter()
        .position(|c| c.highlighted);
    let instances = system.pack_instances().len();

    println!("Done: {} frame(s), {:.2}s simulated", clock.frame_count, clock.total_time);
    println!("  emitting lights: {emitting}");
    println!("  skipped updates: {skipped_total}");
    match highlighted {
        Some(index) => println!("  highlighted photo: {index}"),
        None => println!("  highlighted photo: none"),
    }
    println!(
        "  packed instances: {instances} ({} bytes)",
        instances * std::mem::size_of::<ParticleInstance>()
    );

    system.shutdown()?;
    Ok(())
}
