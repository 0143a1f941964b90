//! disha-fusion daemon entry point.
//!
//! Loads the TOML configuration, wires the sensor event channel into
//! the fusion engine and drives the fixed-rate fusion loop until a
//! shutdown signal arrives. Transport adapters feeding the event
//! channel live outside this crate; the daemon publishes through a
//! logging sink by default.

use std::fs;
use std::io::Write;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use disha_fusion::{
    create_event_channel, now_us, EventReceiver, FusionConfig, FusionEngine, GridSnapshot,
    OutputSink, RangeScan, Transform,
};

// ============================================================================
// CLI Arguments
// ============================================================================

struct Args {
    config_path: Option<String>,
}

fn parse_args() -> Args {
    let args: Vec<String> = std::env::args().collect();
    let mut result = Args { config_path: None };

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--config" | "-c" => {
                if i + 1 < args.len() {
                    result.config_path = Some(args[i + 1].clone());
                    i += 1;
                }
            }
            "--help" | "-h" => {
                print_help();
                std::process::exit(0);
            }
            _ => {
                eprintln!("Unknown argument: {}", args[i]);
                print_help();
                std::process::exit(1);
            }
        }
        i += 1;
    }

    result
}

fn print_help() {
    println!("disha-fusion - localization and mapping fusion daemon");
    println!();
    println!("USAGE:");
    println!("    disha_fusion_node [OPTIONS]");
    println!();
    println!("OPTIONS:");
    println!("    -c, --config <FILE>     Configuration file (default: disha-fusion.toml)");
    println!("    -h, --help              Print help information");
    println!();
    println!("CONFIGURATION:");
    println!("    All settings are configured via the TOML config file:");
    println!("    - [grid] min_x..max_y, precision, ttl_secs, resizable");
    println!("    - simulation: integrate commanded velocity instead of odometry");
    println!("    - rate_hz: fusion loop rate");
    println!("    - initial_pose: starting pose override");
}

fn load_config(args: &Args) -> FusionConfig {
    match &args.config_path {
        Some(path) => match fs::read_to_string(path) {
            Ok(contents) => match basic_toml::from_str(&contents) {
                Ok(cfg) => {
                    log::info!("Loaded config from {}", path);
                    cfg
                }
                Err(e) => {
                    log::warn!("Failed to parse config {}: {}", path, e);
                    FusionConfig::default()
                }
            },
            Err(e) => {
                log::warn!("Failed to read config {}: {}", path, e);
                FusionConfig::default()
            }
        },
        None => {
            // Try default paths
            for path in &["disha-fusion.toml", "/etc/disha-fusion.toml"] {
                if let Ok(contents) = fs::read_to_string(path) {
                    if let Ok(cfg) = basic_toml::from_str(&contents) {
                        log::info!("Loaded config from {}", path);
                        return cfg;
                    }
                }
            }
            FusionConfig::default()
        }
    }
}

// ============================================================================
// Default output sink
// ============================================================================

/// Sink logging a summary of everything published. Replaced by a
/// transport-backed sink when the daemon is embedded in a robot stack.
struct LoggingSink;

impl OutputSink for LoggingSink {
    fn publish_scan(&mut self, frame: &str, scan: &RangeScan) {
        log::debug!("scan [{}]: {} rays", frame, scan.len());
    }

    fn publish_grid(&mut self, name: &str, snapshot: GridSnapshot) {
        log::debug!(
            "grid [{}]: {}x{} cells at {:.3} m",
            name,
            snapshot.width,
            snapshot.height,
            snapshot.scale
        );
    }

    fn publish_transform(&mut self, transform: Transform) {
        log::trace!(
            "tf [{}]: ({:.3}, {:.3}, {:.3})",
            transform.frame,
            transform.x,
            transform.y,
            transform.theta
        );
    }
}

// ============================================================================
// Fusion loop
// ============================================================================

fn run_fusion_loop(
    config: &FusionConfig,
    events: EventReceiver,
    running: Arc<AtomicBool>,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut engine = FusionEngine::new(config, events)?;
    let mut sink = LoggingSink;
    let period = Duration::from_secs_f32(1.0 / config.rate_hz);

    log::info!("Fusion loop running at {} Hz", config.rate_hz);
    while running.load(Ordering::Relaxed) {
        let started = Instant::now();
        engine.tick(now_us(), &mut sink);

        let elapsed = started.elapsed();
        if elapsed < period {
            std::thread::sleep(period - elapsed);
        } else {
            log::warn!("Fusion tick overran its period: {:?}", elapsed);
        }
    }

    if engine.rejected_insertions() > 0 {
        log::info!(
            "{} insertions fell outside the grid during this run",
            engine.rejected_insertions()
        );
    }
    Ok(())
}

fn main() {
    // Initialize logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format(|buf, record| {
            writeln!(
                buf,
                "[{}] {} - {}",
                record.level(),
                record.target(),
                record.args()
            )
        })
        .init();

    let args = parse_args();
    let config = load_config(&args);

    log::info!("disha-fusion starting");
    log::info!(
        "  Mode: {}",
        if config.simulation { "simulated" } else { "live" }
    );
    log::info!(
        "  Grid: x [{:.1}, {:.1}], y [{:.1}, {:.1}] at {:.3} m, ttl {:.0} s",
        config.grid.min_x,
        config.grid.max_x,
        config.grid.min_y,
        config.grid.max_y,
        config.grid.precision,
        config.grid.ttl_secs
    );

    // Setup signal handler
    let running = Arc::new(AtomicBool::new(true));
    let r = running.clone();

    if let Err(e) = ctrlc::set_handler(move || {
        log::info!("Received shutdown signal");
        r.store(false, Ordering::Relaxed);
    }) {
        log::error!("Error setting Ctrl-C handler: {}", e);
        std::process::exit(1);
    }

    // The sender half belongs to transport adapters; the daemon keeps
    // it alive for the lifetime of the loop.
    let (_event_tx, event_rx) = create_event_channel();

    if let Err(e) = run_fusion_loop(&config, event_rx, running) {
        log::error!("Daemon error: {}", e);
        std::process::exit(1);
    }

    log::info!("disha-fusion shutdown complete");
}
