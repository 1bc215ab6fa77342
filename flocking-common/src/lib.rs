pub mod config;
pub mod sim_params;
pub mod snapshot;
pub mod vecmath;

// Re-export key types for easier use by dependent crates
pub use config::{
    ArenaConfig, ObstacleSeed, ObstaclesConfig, OutputConfig, PredatorConfig, PreyConfig,
    ScriptEntry, SimulationConfig, SimulationSettings, TimingConfig, UpdateOrder, WeightsConfig,
};
pub use sim_params::SimParams;
pub use snapshot::{AgentView, ObstacleView, Snapshot, WorldView};
pub use vecmath::{Vec2, angle_to_vec, vec_to_angle};
