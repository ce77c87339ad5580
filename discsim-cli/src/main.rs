mod viewer;

use clap::{Args, Parser, Subcommand};
use discsim_core::{
    max_position_divergence, place_particles, seeded_rng, step_simulation, BroadPhaseKind,
    ConfigError, OutOfRangePolicy, SimConfig, Simulation, Viewport,
};
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "discsim")]
#[command(about = "discsim - elastic disc collisions on a uniform grid", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Simulation parameters shared by every command
#[derive(Args, Clone, Debug)]
pub struct SimArgs {
    /// JSON config file; the flags below override its fields
    #[arg(long)]
    config: Option<PathBuf>,
    /// Number of particles
    #[arg(short = 'n', long)]
    particles: Option<usize>,
    #[arg(long)]
    radius: Option<f32>,
    /// Initial speed in pixels per second
    #[arg(long)]
    speed: Option<f32>,
    #[arg(long)]
    width: Option<u32>,
    #[arg(long)]
    height: Option<u32>,
    /// Placement seed
    #[arg(long)]
    seed: Option<u64>,
    /// Use the all-pairs baseline instead of the grid
    #[arg(long)]
    naive: bool,
    /// Clamp escaped particles into the grid instead of stopping
    #[arg(long)]
    clamp: bool,
}

impl SimArgs {
    pub fn config_path(&self) -> Option<&PathBuf> {
        self.config.as_ref()
    }

    /// Config file (or defaults) with command-line overrides applied
    pub fn resolve(&self) -> Result<SimConfig, ConfigError> {
        let mut config = match &self.config {
            Some(path) => SimConfig::load(path)?,
            None => SimConfig::default(),
        };
        if let Some(n) = self.particles {
            config.particle_count = n;
        }
        if let Some(radius) = self.radius {
            config.radius = radius;
        }
        if let Some(speed) = self.speed {
            config.speed = speed;
        }
        if let Some(width) = self.width {
            config.width = width;
        }
        if let Some(height) = self.height {
            config.height = height;
        }
        if self.seed.is_some() {
            config.seed = self.seed;
        }
        if self.naive {
            config.broad_phase = BroadPhaseKind::Naive;
        }
        if self.clamp {
            config.out_of_range = OutOfRangePolicy::Clamp;
        }
        config.validate()?;
        Ok(config)
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Run headless and print the energy diagnostic
    Run {
        #[command(flatten)]
        sim: SimArgs,
        /// Number of frames to simulate
        #[arg(long, default_value_t = 600)]
        frames: u64,
        /// Seconds per frame
        #[arg(long, default_value_t = 1.0 / 60.0)]
        dt: f32,
        /// Print a line every N frames
        #[arg(long, default_value_t = 60)]
        every: u64,
    },
    /// Run the grid and naive broad phases side by side from one layout
    Compare {
        #[command(flatten)]
        sim: SimArgs,
        #[arg(long, default_value_t = 120)]
        frames: u64,
        #[arg(long, default_value_t = 1.0 / 60.0)]
        dt: f32,
    },
    /// Open the interactive viewer
    View {
        #[command(flatten)]
        sim: SimArgs,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Run {
            sim,
            frames,
            dt,
            every,
        } => run(&sim, frames, dt, every),
        Commands::Compare { sim, frames, dt } => compare(&sim, frames, dt),
        Commands::View { sim } => viewer::run_viewer(sim),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(args: &SimArgs, frames: u64, dt: f32, every: u64) -> Result<(), Box<dyn std::error::Error>> {
    let config = args.resolve()?;
    let mut sim = Simulation::new(config)?;
    let every = every.max(1);

    println!("frame energy collisions");
    for _ in 0..frames {
        let report = step_simulation(&mut sim, dt)?;
        if report.frame % every == 0 {
            println!("{} {:.3} {}", report.frame, report.energy, report.collisions);
        }
    }

    println!(
        "energy drift after {} frames: {:+.6}%",
        sim.current_frame,
        sim.energy.drift() * 100.0
    );
    Ok(())
}

fn compare(args: &SimArgs, frames: u64, dt: f32) -> Result<(), Box<dyn std::error::Error>> {
    let config = args.resolve()?;
    let particles = place_particles(
        &mut seeded_rng(config.seed),
        Viewport::new(config.width, config.height),
        config.particle_count,
        config.radius,
        config.speed,
        config.max_placement_attempts,
    )?;

    let mut grid = Simulation::from_particles(
        particles.clone(),
        SimConfig {
            broad_phase: BroadPhaseKind::Grid,
            ..config.clone()
        },
    )?;
    let mut naive = Simulation::from_particles(
        particles,
        SimConfig {
            broad_phase: BroadPhaseKind::Naive,
            ..config
        },
    )?;

    let mut grid_time = Duration::ZERO;
    let mut naive_time = Duration::ZERO;
    let mut worst = 0.0f32;
    for _ in 0..frames {
        let start = Instant::now();
        step_simulation(&mut grid, dt)?;
        grid_time += start.elapsed();

        let start = Instant::now();
        step_simulation(&mut naive, dt)?;
        naive_time += start.elapsed();

        worst = worst.max(max_position_divergence(grid.particles(), naive.particles()));
    }

    println!("frames: {}", frames);
    println!(
        "grid:  {:>10.3} ms/frame  energy {:.3}",
        ms_per_frame(grid_time, frames),
        grid.energy.last()
    );
    println!(
        "naive: {:>10.3} ms/frame  energy {:.3}",
        ms_per_frame(naive_time, frames),
        naive.energy.last()
    );
    println!("max position divergence: {}", worst);
    Ok(())
}

fn ms_per_frame(total: Duration, frames: u64) -> f64 {
    if frames == 0 {
        0.0
    } else {
        total.as_secs_f64() * 1000.0 / frames as f64
    }
}
