use serde::{Deserialize, Serialize};

/// Simulation parameters derived from the configuration, used on every tick.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SimParams {
    // Arena
    pub world_width: f32,
    pub world_height: f32,
    pub edge_margin: f32,

    // Prey
    pub min_speed: f32,
    pub max_speed: f32,
    pub visual_range: f32,
    pub separation_distance: f32,

    // Predator
    pub predator_speed: f32,
    pub predator_detection_range: f32,
    pub predator_eat_distance: f32,

    // Obstacles
    pub obstacle_radius: f32, // Radius given to obstacles added by the host
    pub obstacle_detection_buffer: f32, // Extra range beyond the radius where avoidance ramps up

    // Rule weights
    pub w_separation: f32,
    pub w_alignment: f32,
    pub w_cohesion: f32,
    pub w_edge: f32,
    pub w_obstacle: f32,
    pub w_predator_avoidance: f32,
    pub w_hunting: f32,
    pub w_predator_obstacle: f32, // Obstacle weight with the predator multiplier folded in
    pub w_predator_edge: f32,     // Edge weight with the predator multiplier folded in
}
