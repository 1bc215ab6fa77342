use serde::{Serialize, Deserialize};
use crate::vecmath::Vec2;

/// Read-only rendering view of a single agent.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AgentView {
    pub id: u64,
    pub position: Vec2,
    pub velocity: Vec2,
    /// Heading in radians measured from the +x axis.
    pub heading: f32,
    /// Always false for prey.
    pub can_eat: bool,
}

impl AgentView {
    /// Vertices of the triangle a renderer draws for this agent: the nose sits
    /// `2 * size` ahead of the position along the heading, the two tail corners
    /// `size` behind and to either side.
    pub fn outline(&self, size: f32) -> [Vec2; 3] {
        let heading = Vec2::X.angle_to(self.velocity);
        [
            Vec2::new(size * 2.0, 0.0),
            Vec2::new(-size, size),
            Vec2::new(-size, -size),
        ]
        .map(|corner| self.position + corner.rotate(heading))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ObstacleView {
    pub center: Vec2,
    pub radius: f32,
}

/// Everything a renderer needs to draw one frame.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WorldView {
    pub tick: u64,
    pub prey: Vec<AgentView>,
    pub predators: Vec<AgentView>,
    pub obstacles: Vec<ObstacleView>,
}

/// A snapshot of the simulation metrics at a specific tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    /// The tick at which the snapshot was taken.
    pub tick: u64,
    pub prey_count: u32,
    pub predator_count: u32,
    pub obstacle_count: u32,
    /// Prey eaten since the previous snapshot.
    pub eaten_since_last: u32,
    pub total_eaten: u64,
    /// Mean speed of the prey, 0 when there are none.
    pub mean_prey_speed: f32,
    /// Length of the mean unit heading of the prey: 1 when every prey flies
    /// the same way, near 0 for a disordered swarm.
    pub polarization: f32,
    /// Full agent and obstacle state.
    /// Included only if `config.output.save_positions_in_snapshot` is true.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub view: Option<WorldView>,
}
