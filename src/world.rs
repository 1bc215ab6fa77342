use crate::agent::{Agent, AgentId, AgentKind, SpeedBand, Spawner};
use crate::command::{Command, CommandError};
use crate::obstacles::{Obstacle, ObstacleRegistry};
use crate::population::{Population, PopulationChange};
use crate::steering;
use anyhow::Result;
use flocking_common::{SimParams, SimulationConfig, Snapshot, UpdateOrder, Vec2, WorldView};
use log::{debug, info, trace};
use rand::prelude::*;
use rayon::prelude::*;

/// The flocking world: prey, predators, obstacles and the host toggles that
/// shape how they interact. Host commands mutate it between ticks; `tick`
/// advances it by one frame.
#[derive(Debug)]
pub struct World {
    /// The configuration the world was built from.
    config: SimulationConfig,
    /// Flattened parameters read on every tick.
    params: SimParams,
    /// Drives every random placement, so a seed reproduces a run.
    rng: StdRng,
    spawner: Spawner,
    prey: Population,
    predators: Population,
    obstacles: ObstacleRegistry,
    update_order: UpdateOrder,
    predator_enabled: bool,
    eating_enabled: bool,
    current_tick: u64,
    total_eaten: u64,
    eaten_since_snapshot: u32,
    /// Stores collected metric snapshots.
    recorded_snapshots: Vec<Snapshot>,
}

impl World {
    /// Creates a world from a validated configuration and spawns the initial flock.
    pub fn new(config: SimulationConfig) -> Result<Self> {
        config.validate()?;
        let params = config.get_sim_params();
        let spawner = Spawner::new(&params)?;
        let rng = StdRng::seed_from_u64(config.simulation.seed);

        let mut obstacles = ObstacleRegistry::new(params.obstacle_radius);
        for seed in &config.obstacles.initial {
            obstacles.add_with_radius(
                Vec2::new(seed.x, seed.y),
                seed.radius.unwrap_or(params.obstacle_radius),
            );
        }

        let mut world = Self {
            update_order: config.simulation.update_order,
            predator_enabled: config.predator.enabled,
            eating_enabled: config.predator.can_eat,
            config,
            params,
            rng,
            spawner,
            prey: Population::new(AgentKind::Prey),
            predators: Population::new(AgentKind::Predator),
            obstacles,
            current_tick: 0,
            total_eaten: 0,
            eaten_since_snapshot: 0,
            recorded_snapshots: Vec::new(),
        };

        world.apply_prey_delta(i64::from(world.config.prey.initial_count))?;
        world.sync_predators();
        world.propagate_eating_flag();

        info!(
            "World initialized: {} prey, {} obstacles, {:?} update order.",
            world.prey.len(),
            world.obstacles.len(),
            world.update_order
        );
        Ok(world)
    }

    /// Advances the simulation by one frame and returns the prey eaten during it.
    pub fn tick(&mut self) -> Vec<Agent> {
        // --- 1. Predator lifecycle follows the host toggle ---
        self.sync_predators();

        // --- 2. Propagate the eating flag ---
        self.propagate_eating_flag();

        // --- 3 & 4. Steer, integrate and mark eaten prey ---
        let marks = match self.update_order {
            UpdateOrder::Sequential => self.update_sequential(),
            UpdateOrder::Snapshot => self.update_from_snapshot(),
        };

        // --- 5. Remove each marked prey exactly once ---
        let removed = self.prey.retain_unmarked(&marks);
        if !removed.is_empty() {
            debug!(
                "Tick {}: {} prey eaten, {} remaining.",
                self.current_tick,
                removed.len(),
                self.prey.len()
            );
            self.total_eaten += removed.len() as u64;
            self.eaten_since_snapshot += removed.len() as u32;
        }

        trace!(
            "Tick {} done: {} prey, {} predators.",
            self.current_tick,
            self.prey.len(),
            self.predators.len()
        );
        self.current_tick += 1;
        removed
    }

    /// Updates agents one at a time, prey first. Each agent sees the state
    /// left behind by the agents updated before it in this tick.
    fn update_sequential(&mut self) -> Vec<bool> {
        let params = self.params;
        let prey_band = SpeedBand::for_kind(AgentKind::Prey, &params);
        let predator_band = SpeedBand::for_kind(AgentKind::Predator, &params);

        for idx in 0..self.prey.len() {
            let agent = self.prey.as_slice()[idx];
            let steering = steering::prey_acceleration(
                &agent,
                self.prey.as_slice(),
                self.predators.as_slice(),
                self.obstacles.as_slice(),
                &params,
            );
            self.prey.as_mut_slice()[idx].integrate(steering, prey_band);
        }

        let mut marks = vec![false; self.prey.len()];
        for idx in 0..self.predators.len() {
            let hunter = self.predators.as_slice()[idx];
            let steering = steering::predator_acceleration(
                &hunter,
                self.prey.as_slice(),
                self.obstacles.as_slice(),
                &params,
            );
            let hunter = &mut self.predators.as_mut_slice()[idx];
            hunter.integrate(steering, predator_band);
            if hunter.can_eat {
                let reach = params.predator_eat_distance;
                mark_prey_in_reach(hunter, self.prey.as_slice(), reach, &mut marks);
            }
        }
        marks
    }

    /// Computes every acceleration from the pre-tick state in parallel, then
    /// integrates all agents. Results do not depend on agent order.
    fn update_from_snapshot(&mut self) -> Vec<bool> {
        let params = self.params;
        let prey_band = SpeedBand::for_kind(AgentKind::Prey, &params);
        let predator_band = SpeedBand::for_kind(AgentKind::Predator, &params);

        let prey = self.prey.as_slice();
        let predators = self.predators.as_slice();
        let obstacles = self.obstacles.as_slice();
        let prey_steering: Vec<Vec2> = prey
            .par_iter()
            .map(|agent| steering::prey_acceleration(agent, prey, predators, obstacles, &params))
            .collect();
        let predator_steering: Vec<Vec2> = predators
            .par_iter()
            .map(|hunter| steering::predator_acceleration(hunter, prey, obstacles, &params))
            .collect();

        for (agent, steering) in self.prey.as_mut_slice().iter_mut().zip(prey_steering) {
            agent.integrate(steering, prey_band);
        }
        for (hunter, steering) in self.predators.as_mut_slice().iter_mut().zip(predator_steering) {
            hunter.integrate(steering, predator_band);
        }

        let mut marks = vec![false; self.prey.len()];
        let reach = params.predator_eat_distance;
        for hunter in self.predators.iter().filter(|h| h.can_eat) {
            mark_prey_in_reach(hunter, self.prey.as_slice(), reach, &mut marks);
        }
        marks
    }

    /// Spawns a predator when predators are enabled but absent; clears them,
    /// along with the eating flag, when predators are disabled.
    fn sync_predators(&mut self) {
        if self.predator_enabled && self.predators.is_empty() {
            let id = self
                .predators
                .add_one(|id| self.spawner.spawn(id, AgentKind::Predator, &mut self.rng));
            debug!("Predator {} spawned.", id);
        } else if !self.predator_enabled && !self.predators.is_empty() {
            debug!("Removing {} predator(s); eating disabled.", self.predators.len());
            self.predators.clear();
            self.eating_enabled = false;
        }
    }

    fn propagate_eating_flag(&mut self) {
        let can_eat = self.eating_enabled;
        for hunter in self.predators.as_mut_slice() {
            hunter.can_eat = can_eat;
        }
    }

    // --- Host commands ---

    pub fn add_prey(&mut self) -> AgentId {
        self.prey.add_one(|id| self.spawner.spawn(id, AgentKind::Prey, &mut self.rng))
    }

    /// Evicts the oldest prey, if any.
    pub fn remove_prey(&mut self) -> Option<Agent> {
        self.prey.remove_one()
    }

    /// Grows or shrinks the flock. An oversized delta is rejected and the
    /// flock is left as it was.
    pub fn apply_prey_delta(&mut self, delta: i64) -> Result<PopulationChange, CommandError> {
        self.prey
            .apply_delta(delta, |id| self.spawner.spawn(id, AgentKind::Prey, &mut self.rng))
    }

    /// Places a prey at an explicit position.
    pub fn insert_prey_at(&mut self, position: Vec2, velocity: Vec2) -> AgentId {
        self.prey.insert(Agent::new(0, AgentKind::Prey, position, velocity))
    }

    /// Places a predator at an explicit position. Having a predator implies
    /// predators are enabled, so the toggle is switched on as well.
    pub fn insert_predator_at(&mut self, position: Vec2, velocity: Vec2) -> AgentId {
        self.predator_enabled = true;
        let mut hunter = Agent::new(0, AgentKind::Predator, position, velocity);
        hunter.can_eat = self.eating_enabled;
        self.predators.insert(hunter)
    }

    pub fn set_predator_enabled(&mut self, enabled: bool) {
        self.predator_enabled = enabled;
        self.sync_predators();
        self.propagate_eating_flag();
    }

    pub fn set_eating_enabled(&mut self, enabled: bool) {
        self.eating_enabled = enabled;
        self.propagate_eating_flag();
    }

    pub fn add_obstacle(&mut self, point: Vec2) {
        self.obstacles.add(point);
    }

    pub fn remove_obstacle_near(&mut self, point: Vec2) -> Option<Obstacle> {
        self.obstacles.remove_nearest(point)
    }

    pub fn apply_command(&mut self, command: Command) -> Result<(), CommandError> {
        debug!("Applying {:?} at tick {}.", command, self.current_tick);
        match command {
            Command::AddPrey => {
                self.add_prey();
            }
            Command::RemovePrey => {
                self.remove_prey();
            }
            Command::ApplyPreyDelta(delta) => {
                self.apply_prey_delta(delta)?;
            }
            Command::SetPredatorEnabled(enabled) => self.set_predator_enabled(enabled),
            Command::SetEatingEnabled(enabled) => self.set_eating_enabled(enabled),
            Command::AddObstacle(point) => self.add_obstacle(point),
            Command::RemoveObstacleNear(point) => {
                self.remove_obstacle_near(point);
            }
            Command::ClearObstacles => self.obstacles.clear(),
        }
        Ok(())
    }

    /// Parses and applies a textual command. Malformed text, or a command the
    /// world cannot carry out, leaves the world untouched.
    pub fn apply_command_text(&mut self, text: &str) -> Result<Command, CommandError> {
        let command: Command = text.parse()?;
        self.apply_command(command)?;
        Ok(command)
    }

    // --- Read-only views ---

    /// Owned copy of everything a renderer draws.
    pub fn snapshot(&self) -> WorldView {
        WorldView {
            tick: self.current_tick,
            prey: self.prey.iter().map(Agent::view).collect(),
            predators: self.predators.iter().map(Agent::view).collect(),
            obstacles: self.obstacles.iter().map(Obstacle::view).collect(),
        }
    }

    /// Collects flock metrics and stores them as a Snapshot.
    pub fn record_snapshot(&mut self) {
        let prey_count = self.prey.len();
        let (speed_sum, heading_sum) = self.prey.iter().fold(
            (0.0f32, Vec2::ZERO),
            |(speed, heading), agent| {
                (speed + agent.speed(), heading + agent.velocity.normalize_or_zero())
            },
        );
        let (mean_prey_speed, polarization) = if prey_count > 0 {
            (speed_sum / prey_count as f32, heading_sum.length() / prey_count as f32)
        } else {
            (0.0, 0.0)
        };

        let view = if self.config.output.save_positions_in_snapshot {
            Some(self.snapshot())
        } else {
            None
        };

        debug!(
            "Recording snapshot at tick {}: {} prey, polarization {:.3}.",
            self.current_tick, prey_count, polarization
        );

        self.recorded_snapshots.push(Snapshot {
            tick: self.current_tick,
            prey_count: prey_count as u32,
            predator_count: self.predators.len() as u32,
            obstacle_count: self.obstacles.len() as u32,
            eaten_since_last: self.eaten_since_snapshot,
            total_eaten: self.total_eaten,
            mean_prey_speed,
            polarization,
            view,
        });
        self.eaten_since_snapshot = 0;
    }

    /// Provides access to the recorded snapshots.
    pub fn recorded_snapshots(&self) -> &[Snapshot] {
        &self.recorded_snapshots
    }

    /// Current prey positions as (x, y) tuples.
    pub fn get_results(&self) -> Vec<(f32, f32)> {
        self.prey.iter().map(|a| (a.position.x, a.position.y)).collect()
    }

    pub fn prey(&self) -> &[Agent] {
        self.prey.as_slice()
    }

    pub fn predators(&self) -> &[Agent] {
        self.predators.as_slice()
    }

    pub fn obstacles(&self) -> &ObstacleRegistry {
        &self.obstacles
    }

    pub fn params(&self) -> &SimParams {
        &self.params
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn current_tick(&self) -> u64 {
        self.current_tick
    }

    pub fn total_eaten(&self) -> u64 {
        self.total_eaten
    }

    pub fn predator_enabled(&self) -> bool {
        self.predator_enabled
    }

    pub fn eating_enabled(&self) -> bool {
        self.eating_enabled
    }

    pub fn update_order(&self) -> UpdateOrder {
        self.update_order
    }
}

/// Marks every prey strictly closer than `reach` to `hunter`.
fn mark_prey_in_reach(hunter: &Agent, prey: &[Agent], reach: f32, marks: &mut [bool]) {
    for (mark, target) in marks.iter_mut().zip(prey) {
        if hunter.position.distance(target.position) < reach {
            *mark = true;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn empty_world() -> World {
        let mut config = SimulationConfig::default();
        config.prey.initial_count = 0;
        World::new(config).expect("default config is valid")
    }

    #[test]
    fn initial_flock_matches_config() {
        let world = World::new(SimulationConfig::default()).expect("valid");
        assert_eq!(world.prey().len(), 75);
        assert!(world.predators().is_empty());
        assert!(world.obstacles().is_empty());
    }

    #[test]
    fn malformed_text_command_changes_nothing() {
        let mut world = empty_world();
        world.apply_prey_delta(3).expect("within limit");
        let before = world.snapshot();
        assert!(world.apply_command_text("prey lots").is_err());
        assert!(world.apply_command_text("").is_err());
        assert_eq!(world.snapshot(), before);
        assert_eq!(world.apply_command_text("prey -1"), Ok(Command::ApplyPreyDelta(-1)));
        assert_eq!(world.prey().len(), 2);
    }

    #[test]
    fn eating_flag_follows_host_toggle() {
        let mut world = empty_world();
        world.set_predator_enabled(true);
        assert_eq!(world.predators().len(), 1);
        assert!(!world.predators()[0].can_eat);
        world.set_eating_enabled(true);
        assert!(world.predators()[0].can_eat);
    }

    #[test]
    fn record_snapshot_reports_polarization() {
        let mut world = empty_world();
        world.insert_prey_at(Vec2::new(200.0, 200.0), Vec2::new(3.0, 0.0));
        world.insert_prey_at(Vec2::new(600.0, 400.0), Vec2::new(2.0, 0.0));
        world.record_snapshot();
        let snapshot = &world.recorded_snapshots()[0];
        assert_eq!(snapshot.prey_count, 2);
        assert!((snapshot.polarization - 1.0).abs() < 1e-5);
        assert!((snapshot.mean_prey_speed - 2.5).abs() < 1e-5);
        assert!(snapshot.view.is_none());
    }

    #[test]
    fn snapshot_of_empty_world_is_valid() {
        let mut world = empty_world();
        let removed = world.tick();
        assert!(removed.is_empty());
        world.record_snapshot();
        assert_eq!(world.recorded_snapshots()[0].polarization, 0.0);
        assert_eq!(world.current_tick(), 1);
    }
}
