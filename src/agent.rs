use anyhow::Result;
use flocking_common::{AgentView, SimParams, Vec2, angle_to_vec, vec_to_angle};
use rand::distr::Uniform;
use rand::prelude::*;

pub type AgentId = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AgentKind {
    Prey,
    Predator,
}

/// Inclusive speed range an agent's velocity is clamped into after steering.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpeedBand {
    pub min: f32,
    pub max: f32,
}

impl SpeedBand {
    pub fn for_kind(kind: AgentKind, params: &SimParams) -> Self {
        match kind {
            AgentKind::Prey => Self { min: params.min_speed, max: params.max_speed },
            AgentKind::Predator => Self { min: 0.0, max: params.predator_speed },
        }
    }

    pub fn contains(&self, speed: f32, tolerance: f32) -> bool {
        speed >= self.min - tolerance && speed <= self.max + tolerance
    }
}

/// A flocking entity. Prey and predators share this state and differ only in
/// how their steering is composed and in their speed band.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Agent {
    pub id: AgentId,
    pub kind: AgentKind,
    pub position: Vec2,
    pub velocity: Vec2,
    /// Steering applied on the most recent tick.
    pub acceleration: Vec2,
    pub can_eat: bool,
}

impl Agent {
    pub fn new(id: AgentId, kind: AgentKind, position: Vec2, velocity: Vec2) -> Self {
        Self { id, kind, position, velocity, acceleration: Vec2::ZERO, can_eat: false }
    }

    pub fn speed(&self) -> f32 {
        self.velocity.length()
    }

    /// Applies one tick of steering: accelerate, clamp speed into `band`, move.
    pub fn integrate(&mut self, steering: Vec2, band: SpeedBand) {
        let previous = self.velocity;
        self.acceleration = steering;
        self.velocity += steering;

        let speed = self.velocity.length();
        if speed > band.max {
            self.velocity = self.velocity.scale_to_length(band.max);
        } else if speed < band.min {
            // A fully cancelled velocity has no direction left to rescale,
            // so fall back to the heading the agent had coming in.
            let direction = if self.velocity.is_zero() { previous } else { self.velocity };
            self.velocity = direction.scale_to_length(band.min);
        }

        self.position += self.velocity;
    }

    pub fn view(&self) -> AgentView {
        AgentView {
            id: self.id,
            position: self.position,
            velocity: self.velocity,
            heading: vec_to_angle(self.velocity),
            can_eat: self.can_eat,
        }
    }
}

/// Random placement for new agents: uniform over the arena inset by the edge
/// margin, uniform heading, and a per-kind initial speed.
#[derive(Debug, Clone)]
pub struct Spawner {
    x_dist: Uniform<f32>,
    y_dist: Uniform<f32>,
    angle_dist: Uniform<f32>,
    prey_speed_dist: Uniform<f32>,
    predator_speed: f32,
}

impl Spawner {
    pub fn new(params: &SimParams) -> Result<Self> {
        let margin = params.edge_margin;
        Ok(Self {
            x_dist: Uniform::new_inclusive(margin, params.world_width - margin)?,
            y_dist: Uniform::new_inclusive(margin, params.world_height - margin)?,
            angle_dist: Uniform::new(0.0f32, 2.0 * std::f32::consts::PI)?,
            prey_speed_dist: Uniform::new_inclusive(params.min_speed, params.max_speed)?,
            predator_speed: params.predator_speed,
        })
    }

    pub fn spawn<R: Rng>(&self, id: AgentId, kind: AgentKind, rng: &mut R) -> Agent {
        let position = Vec2::new(rng.sample(&self.x_dist), rng.sample(&self.y_dist));
        let heading = angle_to_vec(rng.sample(&self.angle_dist));
        let speed = match kind {
            AgentKind::Prey => rng.sample(&self.prey_speed_dist),
            AgentKind::Predator => self.predator_speed,
        };
        Agent::new(id, kind, position, heading * speed)
    }
}
