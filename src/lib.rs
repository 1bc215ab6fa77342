//! Flocking simulation core: prey that separate, align and cohere, avoid the
//! arena edges, circular obstacles and predators, and predators that hunt the
//! nearest prey and may eat it.

pub mod agent;
pub mod command;
pub mod obstacles;
pub mod output;
pub mod population;
pub mod steering;
pub mod world;

pub use agent::{Agent, AgentId, AgentKind, SpeedBand};
pub use command::{Command, CommandError, parse_population_delta};
pub use obstacles::{Obstacle, ObstacleRegistry};
pub use population::{Population, PopulationChange};
pub use world::World;

pub use flocking_common as common;
