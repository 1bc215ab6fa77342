use anyhow::Result;
use clap::Parser;
use flocking_common::SimulationConfig;
use flocking_engine::output::{self, SnapshotFormat};
use flocking_engine::World;
use log::{debug, info, trace, warn};
use std::path::PathBuf;
use std::time::Instant;

/// Headless flocking run driven by a config file and its command script.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the TOML configuration
    #[arg(short, long, default_value = "config.toml")]
    config: PathBuf,

    /// Override the number of ticks to simulate
    #[arg(long)]
    ticks: Option<u32>,

    /// Override the RNG seed
    #[arg(long)]
    seed: Option<u64>,

    /// Override the snapshot format (json, bincode, messagepack)
    #[arg(long)]
    format: Option<String>,
}

fn load_config(args: &Args) -> Result<SimulationConfig> {
    let mut config = if args.config.exists() {
        SimulationConfig::load(&args.config)?
    } else {
        warn!("Config file '{}' not found. Using built-in defaults.", args.config.display());
        SimulationConfig::default()
    };
    if let Some(ticks) = args.ticks {
        config.timing.total_ticks = ticks;
    }
    if let Some(seed) = args.seed {
        config.simulation.seed = seed;
    }
    if let Some(format) = &args.format {
        config.output.format = Some(format.clone());
    }
    config.validate()?;
    Ok(config)
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    info!("Starting Flocking Engine...");

    // --- Load Configuration ---
    let config = load_config(&args)?;
    let mut script = config.script.clone();
    script.sort_by_key(|entry| entry.tick);

    // --- Initialize World ---
    let mut world = World::new(config)?;
    debug!("Simulation Parameters: {:#?}", world.params());

    let total_ticks = world.config().timing.total_ticks;
    let record_interval = world.config().timing.record_interval_ticks;
    info!("Recording snapshot every {} ticks.", record_interval);

    info!("Starting simulation loop for {} ticks...", total_ticks);
    let start_time = Instant::now();
    let mut previous_print_time = start_time;
    let mut pending = script.iter().peekable();

    world.record_snapshot();

    for tick in 0..total_ticks {
        // --- Apply host commands scheduled for this tick ---
        while let Some(entry) = pending.next_if(|entry| entry.tick <= tick) {
            match world.apply_command_text(&entry.command) {
                Ok(command) => info!("Tick {}: applied {:?}", tick, command),
                Err(e) => warn!("Tick {}: ignoring command '{}': {}", tick, entry.command, e),
            }
        }

        let tick_start_time = Instant::now();
        let eaten = world.tick();
        let tick_duration = tick_start_time.elapsed();

        let current_time = Instant::now();
        let should_print_status =
            current_time.duration_since(previous_print_time).as_secs_f64() >= 5.0;
        let is_record_step = (tick + 1) % record_interval == 0;
        let is_last_step = tick + 1 == total_ticks;

        if should_print_status || is_record_step || is_last_step {
            info!(
                "Tick [{}/{}] | Prey: {} | Predators: {} | Eaten: {} | Tick Time: {:6.3} ms | Elapsed: {:.2} s",
                tick + 1,
                total_ticks,
                world.prey().len(),
                world.predators().len(),
                world.total_eaten(),
                tick_duration.as_secs_f64() * 1000.0,
                start_time.elapsed().as_secs_f64()
            );
            previous_print_time = current_time;

            if is_record_step || is_last_step {
                world.record_snapshot();
            }
        } else {
            trace!(
                "Tick [{}/{}] completed in {:.3} ms, {} eaten",
                tick + 1,
                total_ticks,
                tick_duration.as_secs_f64() * 1000.0,
                eaten.len()
            );
        }
    }

    let remaining = pending.count();
    if remaining > 0 {
        warn!("{} scripted command(s) were scheduled past the last tick and never ran.", remaining);
    }

    info!(
        "Simulation finished in {:.3} seconds.",
        start_time.elapsed().as_secs_f64()
    );

    // --- Save Recorded Data ---
    let output_config = world.config().output.clone();
    if output_config.save_stats {
        let format = SnapshotFormat::from_name(output_config.format.as_deref());
        output::save_snapshots(&output_config.base_filename, format, world.recorded_snapshots())?;
    } else {
        info!("Skipping saving snapshots as per config (save_stats is false).");
    }

    if output_config.save_positions {
        let path = PathBuf::from(format!("{}_final_positions.csv", output_config.base_filename));
        output::save_positions(&path, &world.get_results())?;
    } else {
        info!("Skipping saving final positions as per config.");
    }

    info!("Simulation Complete.");
    Ok(())
}
