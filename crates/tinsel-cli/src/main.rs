//! Tinsel CLI - Headless front end for the tree engine

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use commands::{config, generate, simulate};

#[derive(Parser)]
#[command(name = "tinsel")]
#[command(about = "Generate, inspect and simulate procedural particle trees", long_about = None)]
#[command(version)]
struct Cli {
    /// Increase log verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Only log errors
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the default scene config, or validate one and print it clamped
    Config {
        /// Path to scene file
        scene: Option<String>,
    },

    /// Generate the particle set and summarize it
    Generate {
        /// Path to scene file (defaults are used when omitted)
        scene: Option<String>,

        /// Override the particle count
        #[arg(long)]
        count: Option<i64>,

        /// Override the layout seed
        #[arg(long)]
        seed: Option<u32>,

        /// Override the light theme (classic, warm, cool, rainbow, custom)
        #[arg(long)]
        theme: Option<String>,

        /// Write the generated records to this JSON file
        #[arg(long)]
        json: Option<String>,
    },

    /// Run the frame loop headless with a scripted control schedule
    Simulate {
        /// Path to scene file (defaults are used when omitted)
        scene: Option<String>,

        /// Number of frames to run
        #[arg(long, default_value = "600")]
        frames: u64,

        /// Fixed frame rate
        #[arg(long, default_value = "60")]
        fps: u32,

        /// Frame at which to explode the tree
        #[arg(long)]
        explode_at: Option<u64>,

        /// Frame at which to reassemble the tree
        #[arg(long)]
        assemble_at: Option<u64>,

        /// Rotation speed in radians per second
        #[arg(long, default_value = "0")]
        rotation: f32,

        /// Photo index to highlight
        #[arg(long)]
        highlight: Option<i64>,

        /// Print a progress line every N frames (0 = only the summary)
        #[arg(long, default_value = "60")]
        report_every: u64,
    },
}

/// Level forced by `-v`/`-q`; `None` leaves `RUST_LOG` (or `warn`) in charge
fn log_level(verbose: u8, quiet: bool) -> Option<log::LevelFilter> {
    match (verbose, quiet) {
        (0, false) => None,
        (0, true) => Some(log::LevelFilter::Error),
        (1, _) => Some(log::LevelFilter::Info),
        (2, _) => Some(log::LevelFilter::Debug),
        _ => Some(log::LevelFilter::Trace),
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut logger =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"));
    if let Some(level) = log_level(cli.verbose, cli.quiet) {
        logger.filter_level(level);
    }
    logger.init();

    match cli.command {
        Commands::Config { scene } => config::run(scene.as_deref()),
        Commands::Generate {
            scene,
            count,
            seed,
            theme,
            json,
        } => generate::run(generate::GenerateArgs {
            scene,
            count,
            seed,
            theme,
            json,
        }),
        Commands::Simulate {
            scene,
            frames,
            fps,
            explode_at,
            assemble_at,
            rotation,
            highlight,
            report_every,
        } => simulate::run(simulate::SimulateArgs {
            scene,
            frames,
            fps,
            explode_at,
            assemble_at,
            rotation,
            highlight,
            report_every,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use log::LevelFilter;

    #[test]
    fn verbosity_flags_override_default_filter() {
        assert_eq!(log_level(0, false), None);
        assert_eq!(log_level(0, true), Some(LevelFilter::Error));
        assert_eq!(log_level(1, false), Some(LevelFilter::Info));
        assert_eq!(log_level(2, false), Some(LevelFilter::Debug));
        assert_eq!(log_level(3, false), Some(LevelFilter::Trace));
        assert_eq!(log_level(7, true), Some(LevelFilter::Trace));
    }

    #[test]
    fn verbose_flag_parses_after_subcommand() {
        let cli = Cli::try_parse_from(["tinsel", "simulate", "-vv", "--frames", "1"]).unwrap();
        assert_eq!(cli.verbose, 2);
        assert_eq!(log_level(cli.verbose, cli.quiet), Some(LevelFilter::Debug));
    }
}
