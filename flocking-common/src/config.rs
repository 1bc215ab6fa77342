use serde::{Deserialize, Serialize};
use anyhow::Result;
use crate::sim_params::SimParams;
use std::path::Path;

// Arena bounds. Agents spawn inside the arena inset by `edge_margin`,
// and edge avoidance kicks in within the same margin.
#[derive(Deserialize, Serialize, Debug, Clone)]
#[serde(default)]
pub struct ArenaConfig {
    pub width: f32,
    pub height: f32,
    pub edge_margin: f32,
}

impl Default for ArenaConfig {
    fn default() -> Self {
        Self { width: 1280.0, height: 720.0, edge_margin: 50.0 }
    }
}

// Prey flock properties
#[derive(Deserialize, Serialize, Debug, Clone)]
#[serde(default)]
pub struct PreyConfig {
    pub initial_count: u32,
    pub min_speed: f32,
    pub max_speed: f32,
    pub visual_range: f32,
    pub separation_distance: f32,
}

impl Default for PreyConfig {
    fn default() -> Self {
        Self {
            initial_count: 75,
            min_speed: 2.0,
            max_speed: 4.0,
            visual_range: 75.0,
            separation_distance: 25.0,
        }
    }
}

// Predator properties and the initial state of the host toggles
#[derive(Deserialize, Serialize, Debug, Clone)]
#[serde(default)]
pub struct PredatorConfig {
    pub speed: f32,
    pub detection_range: f32,
    pub eat_distance: f32,
    pub enabled: bool,
    pub can_eat: bool,
}

impl Default for PredatorConfig {
    fn default() -> Self {
        Self {
            speed: 4.5,
            detection_range: 150.0,
            eat_distance: 7.0,
            enabled: false,
            can_eat: false,
        }
    }
}

// Multipliers applied to each steering rule before summation
#[derive(Deserialize, Serialize, Debug, Clone)]
#[serde(default)]
pub struct WeightsConfig {
    pub separation: f32,
    pub alignment: f32,
    pub cohesion: f32,
    pub edge: f32,
    pub obstacle: f32,
    pub predator_avoidance: f32,
    pub hunting: f32,
    pub predator_obstacle_multiplier: f32,
    pub predator_edge_multiplier: f32,
}

impl Default for WeightsConfig {
    fn default() -> Self {
        Self {
            separation: 0.05,
            alignment: 0.05,
            cohesion: 0.0005,
            edge: 0.2,
            obstacle: 0.5,
            predator_avoidance: 0.25,
            hunting: 0.05,
            predator_obstacle_multiplier: 1.5,
            predator_edge_multiplier: 2.0,
        }
    }
}

// An obstacle placed at startup. Radius falls back to `ObstaclesConfig::default_radius`.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct ObstacleSeed {
    pub x: f32,
    pub y: f32,
    #[serde(default)]
    pub radius: Option<f32>,
}

#[derive(Deserialize, Serialize, Debug, Clone)]
#[serde(default)]
pub struct ObstaclesConfig {
    pub default_radius: f32,
    pub detection_buffer: f32,
    pub initial: Vec<ObstacleSeed>,
}

impl Default for ObstaclesConfig {
    fn default() -> Self {
        Self { default_radius: 20.0, detection_buffer: 40.0, initial: Vec::new() }
    }
}

/// How agents within one tick observe each other.
#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum UpdateOrder {
    /// Agents are updated one after another; later agents see the already
    /// moved state of earlier ones within the same tick.
    #[default]
    Sequential,
    /// All accelerations are computed from the pre-tick state before anyone moves.
    Snapshot,
}

#[derive(Deserialize, Serialize, Debug, Clone)]
#[serde(default)]
pub struct SimulationSettings {
    pub seed: u64,
    pub update_order: UpdateOrder,
}

impl Default for SimulationSettings {
    fn default() -> Self {
        Self { seed: 42, update_order: UpdateOrder::Sequential }
    }
}

// Run length for the headless driver
#[derive(Deserialize, Serialize, Debug, Clone)]
#[serde(default)]
pub struct TimingConfig {
    pub total_ticks: u32,
    pub record_interval_ticks: u32,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self { total_ticks: 600, record_interval_ticks: 10 }
    }
}

// Configuration for output settings
#[derive(Deserialize, Serialize, Debug, Clone)]
#[serde(default)]
pub struct OutputConfig {
    pub base_filename: String,
    pub save_positions: bool,
    pub save_stats: bool,
    pub save_positions_in_snapshot: bool,
    pub format: Option<String>, // Output format: "json", "bincode", "messagepack"
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            base_filename: "flock".to_string(),
            save_positions: true,
            save_stats: true,
            save_positions_in_snapshot: false,
            format: None,
        }
    }
}

/// A host command scheduled to run right before tick `tick` is simulated.
/// The command text uses the same grammar a host text box would accept.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct ScriptEntry {
    pub tick: u32,
    pub command: String,
}

// Main simulation configuration structure, loaded from config.toml.
#[derive(Deserialize, Serialize, Debug, Clone, Default)]
#[serde(default)]
pub struct SimulationConfig {
    pub arena: ArenaConfig,
    pub prey: PreyConfig,
    pub predator: PredatorConfig,
    pub weights: WeightsConfig,
    pub obstacles: ObstaclesConfig,
    pub simulation: SimulationSettings,
    pub timing: TimingConfig,
    pub output: OutputConfig,
    pub script: Vec<ScriptEntry>,
}

impl SimulationConfig {
    /// Loads the simulation configuration from a TOML file and validates it.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path_ref = path.as_ref();

        let config_str = std::fs::read_to_string(path_ref)
            .map_err(|e| {
                anyhow::anyhow!("Failed to read config file '{}': {}", path_ref.display(), e)
            })?;
        let config = Self::from_toml_str(&config_str)
            .map_err(|e| anyhow::anyhow!("Invalid config '{}': {}", path_ref.display(), e))?;
        Ok(config)
    }

    /// Parses and validates a configuration from TOML text.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: SimulationConfig = toml::from_str(text)
            .map_err(|e| anyhow::anyhow!("Failed to parse TOML: {}", e))?;
        config.validate()?;
        Ok(config)
    }

    /// Rejects parameter combinations the engine cannot run with.
    pub fn validate(&self) -> Result<()> {
        let arena = &self.arena;
        if arena.width <= 0.0 || arena.height <= 0.0 {
            anyhow::bail!("arena width and height must be positive.");
        }
        if arena.edge_margin < 0.0 {
            anyhow::bail!("arena.edge_margin must not be negative.");
        }
        if 2.0 * arena.edge_margin >= arena.width || 2.0 * arena.edge_margin >= arena.height {
            anyhow::bail!(
                "arena.edge_margin ({}) leaves no room to spawn agents in a {}x{} arena.",
                arena.edge_margin, arena.width, arena.height
            );
        }

        let prey = &self.prey;
        if prey.max_speed <= 0.0 {
            anyhow::bail!("prey.max_speed must be positive.");
        }
        if prey.min_speed < 0.0 || prey.min_speed > prey.max_speed {
            anyhow::bail!(
                "prey.min_speed ({}) must lie in [0, max_speed ({})].",
                prey.min_speed, prey.max_speed
            );
        }
        if prey.visual_range <= 0.0 || prey.separation_distance <= 0.0 {
            anyhow::bail!("prey.visual_range and prey.separation_distance must be positive.");
        }

        let predator = &self.predator;
        if predator.speed <= 0.0 {
            anyhow::bail!("predator.speed must be positive.");
        }
        if predator.detection_range <= 0.0 || predator.eat_distance <= 0.0 {
            anyhow::bail!("predator.detection_range and predator.eat_distance must be positive.");
        }

        let obstacles = &self.obstacles;
        if obstacles.default_radius <= 0.0 {
            anyhow::bail!("obstacles.default_radius must be positive.");
        }
        if obstacles.detection_buffer < 0.0 {
            anyhow::bail!("obstacles.detection_buffer must not be negative.");
        }
        if let Some(seed) = obstacles.initial.iter().find(|o| o.radius.is_some_and(|r| r <= 0.0)) {
            anyhow::bail!("obstacle at ({}, {}) has a non-positive radius.", seed.x, seed.y);
        }

        if self.timing.record_interval_ticks == 0 {
            anyhow::bail!("timing.record_interval_ticks must be at least 1.");
        }
        Ok(())
    }

    /// Converts the configuration into the flat parameter block used at runtime.
    pub fn get_sim_params(&self) -> SimParams {
        let weights = &self.weights;
        SimParams {
            // Arena
            world_width: self.arena.width,
            world_height: self.arena.height,
            edge_margin: self.arena.edge_margin,
            // Prey
            min_speed: self.prey.min_speed,
            max_speed: self.prey.max_speed,
            visual_range: self.prey.visual_range,
            separation_distance: self.prey.separation_distance,
            // Predator
            predator_speed: self.predator.speed,
            predator_detection_range: self.predator.detection_range,
            predator_eat_distance: self.predator.eat_distance,
            // Obstacles
            obstacle_radius: self.obstacles.default_radius,
            obstacle_detection_buffer: self.obstacles.detection_buffer,
            // Weights
            w_separation: weights.separation,
            w_alignment: weights.alignment,
            w_cohesion: weights.cohesion,
            w_edge: weights.edge,
            w_obstacle: weights.obstacle,
            w_predator_avoidance: weights.predator_avoidance,
            w_hunting: weights.hunting,
            w_predator_obstacle: weights.obstacle * weights.predator_obstacle_multiplier,
            w_predator_edge: weights.edge * weights.predator_edge_multiplier,
        }
    }
}
