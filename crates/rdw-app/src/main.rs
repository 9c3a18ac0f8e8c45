//! Walk simulator exercising the redirected-walking steering core.
//!
//! Drives a scripted walker through a circular tracking space, feeds its head
//! motion into the steering core tick by tick, and reports how much rotation
//! was injected and how the distractor episodes played out.
//!
//! # Usage
//!
//! ```bash
//! # Ten simulated minutes at 60 Hz with default gains
//! rdwsim
//!
//! # Deterministic run with a custom config file
//! rdwsim --seed 7 --config gains.json --ticks 18000
//! ```

use std::fs;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use clap::Parser;
use tracing::{debug, info, Level};
use tracing_subscriber::FmtSubscriber;

use rdw_core::config::RedirectionConfig;
use rdw_core::manager::RedirectionManager;
use rdw_core::math::rotate_about_up;
use rdw_core::types::{AppliedGain, HeadPose, MotionSample, TickInput, Vec3};

/// Walk simulator for the redirected-walking steering core
#[derive(Parser, Debug)]
#[command(name = "rdwsim")]
#[command(author, version, about = "Redirected-walking steering simulator", long_about = None)]
struct Cli {
    /// Number of simulated ticks to run
    #[arg(short, long, default_value = "36000")]
    ticks: u64,

    /// Tick rate in Hz
    #[arg(long, default_value = "60")]
    hz: u32,

    /// Seed for distractor selection (omit for entropy)
    #[arg(short, long)]
    seed: Option<u64>,

    /// JSON configuration file overriding the default gains
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Radius of the circular tracking space in meters
    #[arg(long, default_value = "4.0")]
    radius: f32,

    /// Logging verbosity level
    #[arg(short, long, default_value = "info")]
    log_level: String,
}

/// Scripted walker state, tracked in physical coordinates.
struct Walker {
    position: Vec3,
    /// Physical heading as a unit vector on the horizontal plane.
    heading: Vec3,
    /// Walking speed in m/s; zero while watching a distractor.
    speed: f32,
}

/// Counters collected over the run.
#[derive(Default)]
struct RunStats {
    episodes_triggered: u64,
    episodes_ended: u64,
    declined_triggers: u64,
    ticks_rotation_against: u64,
    ticks_rotation_with: u64,
    ticks_curvature: u64,
    total_injected_deg: f64,
    max_tick_injection_deg: f32,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let log_level = match cli.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(true)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    info!("rdwsim v{}", env!("CARGO_PKG_VERSION"));

    let mut config = match &cli.config {
        Some(path) => {
            let text = fs::read_to_string(path)?;
            serde_json::from_str::<RedirectionConfig>(&text)?
        }
        None => RedirectionConfig::default(),
    };
    if cli.seed.is_some() {
        config.distractor_seed = cli.seed;
    }

    let stats = run_simulation(config, cli.ticks, cli.hz, cli.radius)?;

    let summary = serde_json::json!({
        "ticks": cli.ticks,
        "episodes_triggered": stats.episodes_triggered,
        "episodes_ended": stats.episodes_ended,
        "declined_triggers": stats.declined_triggers,
        "ticks_rotation_against": stats.ticks_rotation_against,
        "ticks_rotation_with": stats.ticks_rotation_with,
        "ticks_curvature": stats.ticks_curvature,
        "total_injected_deg": stats.total_injected_deg,
        "max_tick_injection_deg": stats.max_tick_injection_deg,
    });
    println!("{}", serde_json::to_string_pretty(&summary)?);

    Ok(())
}

/// Run the scripted walk and return the collected counters.
fn run_simulation(
    config: RedirectionConfig,
    ticks: u64,
    hz: u32,
    radius: f32,
) -> anyhow::Result<RunStats> {
    anyhow::ensure!(hz > 0, "tick rate must be non-zero");
    anyhow::ensure!(radius > 0.0, "tracking radius must be positive");

    let dt = 1.0 / hz as f32;
    let mut manager = RedirectionManager::new(config)?;

    let aligned_count = Arc::new(AtomicUsize::new(0));
    let aligned = Arc::clone(&aligned_count);
    manager.subscribe_aligned(Box::new(move || {
        aligned.fetch_add(1, Ordering::SeqCst);
    }));

    let mut walker = Walker {
        position: Vec3::zero(),
        heading: Vec3::new(0.0, 0.0, 1.0),
        speed: 1.0,
    };
    let mut stats = RunStats::default();
    let mut episode_alignments = aligned_count.load(Ordering::SeqCst);
    let mut episode_deadline: u64 = 0;

    for tick in 0..ticks {
        // Scripted behavior: walk forward with a gentle weave; stop and
        // watch the distractor in bursts, holding still in between so the
        // deferred algorithm swap gets a quiet tick to commit on.
        let turn_deg = if manager.is_distractor_active() {
            walker.speed = 0.0;
            if (tick / u64::from(hz)) % 2 == 0 {
                25.0 * dt
            } else {
                0.0
            }
        } else {
            walker.speed = 1.0;
            8.0 * dt * (tick as f32 * dt * 0.25).sin()
        };

        walker.heading = rotate_about_up(walker.heading, turn_deg);
        let delta_pos = walker.heading * (walker.speed * dt);
        walker.position = walker.position + delta_pos;

        let input = TickInput {
            motion: MotionSample::new(delta_pos, turn_deg, dt),
            head: HeadPose::new(
                Vec3::new(walker.position.x, 1.7, walker.position.z),
                walker.heading,
            ),
            center: Vec3::zero(),
            in_reset: false,
        };
        let correction = manager.tick(&input);

        // The user unconsciously counters the injected rotation, which is
        // what steers the physical path.
        walker.heading = rotate_about_up(walker.heading, -correction.value());

        let injected = correction.value().abs();
        stats.total_injected_deg += f64::from(injected);
        stats.max_tick_injection_deg = stats.max_tick_injection_deg.max(injected);
        match manager.applied_gain() {
            AppliedGain::RotationAgainst => stats.ticks_rotation_against += 1,
            AppliedGain::RotationWith => stats.ticks_rotation_with += 1,
            AppliedGain::Curvature => stats.ticks_curvature += 1,
            AppliedGain::None => {}
        }

        // Boundary sensor: approaching the edge of the tracking space
        // fires a distractor.
        let from_center = walker.position.flattened().magnitude();
        if !manager.is_distractor_active() && from_center > 0.75 * radius {
            match manager.on_distractor_trigger() {
                Some(index) => {
                    debug!(tick, distractor = index, "episode triggered");
                    stats.episodes_triggered += 1;
                    episode_alignments = aligned_count.load(Ordering::SeqCst);
                    episode_deadline = tick + u64::from(hz) * 15;
                }
                None => stats.declined_triggers += 1,
            }
        }

        // The episode ends once alignment completed, or after the
        // distractor's maximum showtime.
        if manager.is_distractor_active() {
            let aligned_now = aligned_count.load(Ordering::SeqCst) > episode_alignments;
            if aligned_now || tick >= episode_deadline {
                manager.on_distractor_end();
                stats.episodes_ended += 1;
                debug!(tick, aligned = aligned_now, "episode ended");
            }
        }
    }

    info!(
        episodes = stats.episodes_triggered,
        alignments = aligned_count.load(Ordering::SeqCst),
        total_injected_deg = stats.total_injected_deg,
        "simulation finished"
    );
    Ok(stats)
}
