//! Rebound CLI
//!
//! Run, validate, and scaffold spring animations from the command line.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use rebound_animation::{
    select, AnimationController, AnimationListener, FrameLoop, FrameScheduler, ManualScheduler,
    SpringConfig, SpringPreset, SpringSpec,
};
use std::fs;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::time::Duration;
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod config;

use config::{ReboundConfig, CONFIG_FILE};

#[derive(Parser)]
#[command(name = "rebound")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Spring animation runner", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run one animation and print its samples
    Run(RunArgs),

    /// Validate a configuration and report the strategy it selects
    Check {
        /// Config file (defaults to ./rebound.toml when present)
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// List spring presets
    Presets,

    /// Write a starter rebound.toml in the current directory
    Init,
}

#[derive(Args)]
struct RunArgs {
    /// Config file (defaults to ./rebound.toml when present)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Spring preset (gentle, wobbly, stiff, snappy, molasses)
    #[arg(short, long)]
    preset: Option<SpringPreset>,

    /// Start value
    #[arg(long, allow_negative_numbers = true)]
    from: Option<f32>,

    /// Target value
    #[arg(long, allow_negative_numbers = true)]
    to: Option<f32>,

    #[arg(long)]
    stiffness: Option<f32>,

    #[arg(long)]
    damping_ratio: Option<f32>,

    /// Initial velocity in units per second
    #[arg(long, allow_negative_numbers = true)]
    velocity: Option<f32>,

    /// Fixed duration; selects duration mode
    #[arg(long)]
    duration_ms: Option<f64>,

    #[arg(long)]
    delay_ms: Option<f64>,

    /// Frame rate
    #[arg(long)]
    fps: Option<u32>,

    /// Drive frames from the wall clock
    #[arg(long)]
    realtime: bool,
}

impl RunArgs {
    fn overrides(&self) -> SpringSpec {
        SpringSpec {
            preset: self.preset,
            from: self.from,
            to: self.to,
            stiffness: self.stiffness,
            damping_ratio: self.damping_ratio,
            initial_velocity: self.velocity,
            duration_ms: self.duration_ms,
            start_delay_ms: self.delay_ms,
            max_run_time_ms: None,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    match cli.command {
        Commands::Run(args) => cmd_run(&args),
        Commands::Check { config } => cmd_check(config.as_deref()),
        Commands::Presets => cmd_presets(),
        Commands::Init => cmd_init(),
    }
}

/// Prints lifecycle events and samples relative to the run's start
struct Printer {
    clock: Rc<dyn FrameScheduler>,
    origin: Duration,
}

impl Printer {
    fn stamp(&self) -> f64 {
        self.clock.now().saturating_sub(self.origin).as_secs_f64() * 1000.0
    }
}

impl AnimationListener for Printer {
    fn on_start(&self) {
        println!("{:>10.3} start", self.stamp());
    }

    fn on_update(&self, value: f32) {
        println!("{:>10.3} {}", self.stamp(), value);
    }

    fn on_cancel(&self) {
        println!("{:>10.3} cancel", self.stamp());
    }

    fn on_end(&self) {
        println!("{:>10.3} end", self.stamp());
    }
}

fn cmd_run(args: &RunArgs) -> Result<()> {
    let file = ReboundConfig::load_or_default(args.config.as_deref())?;
    let spec = file.animation.merge(args.overrides());
    let spring = spec.into_config().context("Invalid animation parameters")?;

    let fps = args.fps.unwrap_or(file.playback.fps);
    if fps == 0 {
        anyhow::bail!("--fps must be at least 1");
    }
    let realtime = args.realtime || file.playback.realtime;

    info!(
        "Animating {} -> {} with {} strategy at {} fps",
        spring.from(),
        spring.to(),
        select(&spring).kind(),
        fps
    );

    if realtime {
        let frames = Rc::new(FrameLoop::with_fps(fps));
        let controller = start_printing(spring, frames.clone());
        let count = frames.run_until_idle();
        info!("Finished after {} frames", count);
        return finish(&controller);
    }

    let frames = Rc::new(ManualScheduler::with_fps(fps));
    let controller = start_printing(spring, frames.clone());
    let budget = frame_budget(&spring, frames.frame_interval());
    let count = frames.run_until_idle(budget);
    if !frames.is_idle() {
        warn!("Stopped after {} frames with work still pending", count);
        controller.end();
    } else {
        info!("Finished after {} frames", count);
    }
    finish(&controller)
}

fn start_printing(spring: SpringConfig, clock: Rc<dyn FrameScheduler>) -> AnimationController {
    let controller = AnimationController::new(spring, clock.clone());
    let origin = clock.now();
    controller.add_listener(Printer { clock, origin });
    controller.start();
    controller
}

fn finish(controller: &AnimationController) -> Result<()> {
    info!(
        "Final value {} ({})",
        controller.current_value(),
        controller.state()
    );
    Ok(())
}

/// Upper bound on frames needed for one run, with slack for rounding
fn frame_budget(spring: &SpringConfig, interval: Duration) -> usize {
    let span = spring.start_delay() + spring.duration().unwrap_or(spring.max_run_time());
    let frames = span.as_nanos() / interval.as_nanos().max(1);
    usize::try_from(frames).unwrap_or(usize::MAX).saturating_add(8)
}

fn cmd_check(path: Option<&Path>) -> Result<()> {
    let file = ReboundConfig::load_or_default(path)?;
    let spring = file
        .animation
        .into_config()
        .context("Invalid animation parameters")?;

    println!("from:          {}", spring.from());
    println!("to:            {}", spring.to());
    println!("stiffness:     {}", spring.stiffness());
    println!("damping ratio: {}", spring.damping_ratio());
    match spring.duration() {
        Some(duration) => println!("duration:      {} ms", duration.as_secs_f64() * 1000.0),
        None => println!(
            "run-time cap:  {} ms",
            spring.max_run_time().as_secs_f64() * 1000.0
        ),
    }
    println!(
        "start delay:   {} ms",
        spring.start_delay().as_secs_f64() * 1000.0
    );
    println!("fps:           {}", file.playback.fps);
    println!("strategy:      {}", select(&spring).kind());

    info!("Configuration is valid");
    Ok(())
}

fn cmd_presets() -> Result<()> {
    println!("{:<10} {:>10} {:>14}", "preset", "stiffness", "damping ratio");
    for preset in SpringPreset::ALL {
        let (stiffness, ratio) = preset.params();
        println!("{:<10} {:>10} {:>14}", preset.name(), stiffness, ratio);
    }
    Ok(())
}

fn cmd_init() -> Result<()> {
    let path = Path::new(CONFIG_FILE);
    if path.exists() {
        anyhow::bail!("{} already exists", CONFIG_FILE);
    }

    let content = ReboundConfig::starter().to_toml()?;
    fs::write(path, content).with_context(|| format!("Failed to write {}", path.display()))?;

    info!("Created {}", CONFIG_FILE);
    info!("Run `rebound run` to play it");
    Ok(())
}
