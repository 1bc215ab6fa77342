//! Steering rules.
//!
//! Every rule is a pure function of one query agent and read-only neighbor
//! slices. Neighbors at distance zero are ignored, which also excludes the
//! query agent itself when it appears in the slice.

use crate::agent::Agent;
use crate::obstacles::Obstacle;
use flocking_common::{SimParams, Vec2};

/// Mean unit vector pointing away from prey closer than `separation_distance`.
pub fn separation(agent: &Agent, prey: &[Agent], params: &SimParams) -> Vec2 {
    let mut steering = Vec2::ZERO;
    let mut count = 0;
    for other in prey {
        let distance = agent.position.distance(other.position);
        if distance > 0.0 && distance < params.separation_distance {
            steering += (agent.position - other.position) / distance;
            count += 1;
        }
    }
    if count > 0 {
        steering = steering / count as f32;
    }
    steering
}

/// Correction that turns the agent toward the mean heading of visible prey.
pub fn alignment(agent: &Agent, prey: &[Agent], params: &SimParams) -> Vec2 {
    let mut sum = Vec2::ZERO;
    let mut count = 0;
    for other in prey {
        let distance = agent.position.distance(other.position);
        if distance > 0.0 && distance < params.visual_range {
            sum += other.velocity;
            count += 1;
        }
    }
    if count == 0 {
        return Vec2::ZERO;
    }
    let desired = (sum / count as f32).scale_to_length(params.max_speed);
    desired - agent.velocity
}

/// Correction that turns the agent toward the centroid of visible prey.
pub fn cohesion(agent: &Agent, prey: &[Agent], params: &SimParams) -> Vec2 {
    let mut sum = Vec2::ZERO;
    let mut count = 0;
    for other in prey {
        let distance = agent.position.distance(other.position);
        if distance > 0.0 && distance < params.visual_range {
            sum += other.position;
            count += 1;
        }
    }
    if count == 0 {
        return Vec2::ZERO;
    }
    let desired = (sum / count as f32 - agent.position).scale_to_length(params.max_speed);
    desired - agent.velocity
}

/// Unit push back toward the interior on each axis where the agent is within
/// the edge margin.
pub fn avoid_edges(agent: &Agent, params: &SimParams) -> Vec2 {
    let margin = params.edge_margin;
    let axis = |value: f32, bound: f32| {
        if value < margin {
            1.0
        } else if value > bound - margin {
            -1.0
        } else {
            0.0
        }
    };
    Vec2::new(
        axis(agent.position.x, params.world_width),
        axis(agent.position.y, params.world_height),
    )
}

/// Outward push from every obstacle whose detection zone contains the agent.
/// The push grows linearly from 0 at the edge of the zone to `max_speed` at
/// the obstacle's center.
pub fn avoid_obstacles(agent: &Agent, obstacles: &[Obstacle], params: &SimParams) -> Vec2 {
    let mut steering = Vec2::ZERO;
    for obstacle in obstacles {
        let detection_radius = obstacle.radius + params.obstacle_detection_buffer;
        let distance = agent.position.distance(obstacle.center);
        // At the exact center there is no outward direction to push along.
        if distance > 0.0 && distance < detection_radius {
            let strength = (detection_radius - distance) / detection_radius;
            let away = agent.position - obstacle.center;
            steering += away.scale_to_length(strength * params.max_speed);
        }
    }
    steering
}

/// Sum of unit vectors away from every predator in detection range. Not
/// averaged, so several predators add up to a stronger flight response.
pub fn avoid_predators(agent: &Agent, predators: &[Agent], params: &SimParams) -> Vec2 {
    let mut steering = Vec2::ZERO;
    for predator in predators {
        let distance = agent.position.distance(predator.position);
        if distance > 0.0 && distance < params.predator_detection_range {
            steering += (agent.position - predator.position) / distance;
        }
    }
    steering
}

/// Nearest prey to `position`; the first one scanned wins ties.
pub fn nearest<'a>(position: Vec2, prey: &'a [Agent]) -> Option<&'a Agent> {
    let mut closest = None;
    let mut min_dist = f32::INFINITY;
    for candidate in prey {
        let distance = position.distance(candidate.position);
        if distance < min_dist {
            min_dist = distance;
            closest = Some(candidate);
        }
    }
    closest
}

/// Correction steering a predator at full speed toward the nearest prey.
pub fn pursue(predator: &Agent, prey: &[Agent], params: &SimParams) -> Vec2 {
    let Some(target) = nearest(predator.position, prey) else {
        return Vec2::ZERO;
    };
    let desired = target.position - predator.position;
    if desired.is_zero() {
        return Vec2::ZERO;
    }
    desired.scale_to_length(params.predator_speed) - predator.velocity
}

/// Weighted acceleration for one prey. Obstacle avoidance carries the largest
/// default weight so it wins over flock cohesion.
pub fn prey_acceleration(
    agent: &Agent,
    prey: &[Agent],
    predators: &[Agent],
    obstacles: &[Obstacle],
    params: &SimParams,
) -> Vec2 {
    avoid_obstacles(agent, obstacles, params) * params.w_obstacle
        + separation(agent, prey, params) * params.w_separation
        + alignment(agent, prey, params) * params.w_alignment
        + cohesion(agent, prey, params) * params.w_cohesion
        + avoid_edges(agent, params) * params.w_edge
        + avoid_predators(agent, predators, params) * params.w_predator_avoidance
}

/// Weighted acceleration for one predator.
pub fn predator_acceleration(
    predator: &Agent,
    prey: &[Agent],
    obstacles: &[Obstacle],
    params: &SimParams,
) -> Vec2 {
    avoid_obstacles(predator, obstacles, params) * params.w_predator_obstacle
        + avoid_edges(predator, params) * params.w_predator_edge
        + pursue(predator, prey, params) * params.w_hunting
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::AgentKind;
    use flocking_common::SimulationConfig;

    const EPS: f32 = 1e-5;

    fn params() -> SimParams {
        SimulationConfig::default().get_sim_params()
    }

    fn prey_at(id: u64, x: f32, y: f32, vx: f32, vy: f32) -> Agent {
        Agent::new(id, AgentKind::Prey, Vec2::new(x, y), Vec2::new(vx, vy))
    }

    fn predator_at(id: u64, x: f32, y: f32) -> Agent {
        Agent::new(id, AgentKind::Predator, Vec2::new(x, y), Vec2::ZERO)
    }

    #[test]
    fn separation_is_zero_for_a_lone_agent() {
        let p = params();
        let solo = prey_at(0, 500.0, 300.0, 2.0, 0.0);
        assert_eq!(separation(&solo, &[solo], &p), Vec2::ZERO);
        assert_eq!(separation(&solo, &[], &p), Vec2::ZERO);
    }

    #[test]
    fn separation_ignores_prey_out_of_range() {
        let p = params();
        let a = prey_at(0, 500.0, 300.0, 2.0, 0.0);
        let far = prey_at(1, 500.0 + p.separation_distance, 300.0, 2.0, 0.0);
        assert_eq!(separation(&a, &[a, far], &p), Vec2::ZERO);
    }

    #[test]
    fn separation_averages_unit_vectors() {
        let p = params();
        let a = prey_at(0, 500.0, 300.0, 2.0, 0.0);
        let right = prey_at(1, 510.0, 300.0, 2.0, 0.0);
        let below = prey_at(2, 500.0, 290.0, 2.0, 0.0);
        let force = separation(&a, &[a, right, below], &p);
        assert!((force - Vec2::new(-0.5, 0.5)).length() < EPS);
    }

    #[test]
    fn alignment_and_cohesion_need_visible_neighbors() {
        let p = params();
        let a = prey_at(0, 500.0, 300.0, 2.0, 0.0);
        let far = prey_at(1, 500.0, 300.0 + p.visual_range + 1.0, 0.0, 3.0);
        assert_eq!(alignment(&a, &[a, far], &p), Vec2::ZERO);
        assert_eq!(cohesion(&a, &[a, far], &p), Vec2::ZERO);
    }

    #[test]
    fn alignment_targets_max_speed_along_mean_heading() {
        let p = params();
        let a = prey_at(0, 500.0, 300.0, 2.0, 0.0);
        let b = prey_at(1, 530.0, 300.0, 0.0, 3.0);
        let force = alignment(&a, &[a, b], &p);
        assert!((force - Vec2::new(-2.0, p.max_speed)).length() < EPS);
    }

    #[test]
    fn cohesion_steers_toward_centroid() {
        let p = params();
        let a = prey_at(0, 500.0, 300.0, 0.0, 2.0);
        let b = prey_at(1, 540.0, 300.0, 0.0, 2.0);
        let force = cohesion(&a, &[a, b], &p);
        assert!((force - Vec2::new(p.max_speed, -2.0)).length() < EPS);
    }

    #[test]
    fn edge_avoidance_is_per_axis() {
        let p = params();
        let corner = prey_at(0, 10.0, p.world_height - 10.0, 2.0, 0.0);
        assert_eq!(avoid_edges(&corner, &p), Vec2::new(1.0, -1.0));
        let middle = prey_at(1, p.world_width / 2.0, p.world_height / 2.0, 2.0, 0.0);
        assert_eq!(avoid_edges(&middle, &p), Vec2::ZERO);
    }

    #[test]
    fn obstacle_push_ramps_up_toward_the_rim() {
        let p = params();
        let obstacle = Obstacle { center: Vec2::new(600.0, 300.0), radius: 20.0 };
        let detection = obstacle.radius + p.obstacle_detection_buffer;
        let push_at = |d: f32| {
            let agent = prey_at(0, 600.0 + d, 300.0, 2.0, 0.0);
            avoid_obstacles(&agent, &[obstacle], &p)
        };

        assert_eq!(push_at(detection).length(), 0.0);

        let mut previous = 0.0;
        for step in 1..=40 {
            let d = detection - step as f32;
            let force = push_at(d);
            assert!(force.x > 0.0 && force.y.abs() < EPS, "push must point outward");
            assert!(force.length() > previous, "push must grow as the agent closes in");
            previous = force.length();
        }
        let at_rim = push_at(obstacle.radius + 1e-3).length();
        let expected = p.max_speed * p.obstacle_detection_buffer / detection;
        assert!((at_rim - expected).abs() < 1e-3);
        assert!(at_rim < p.max_speed);
    }

    #[test]
    fn obstacle_at_exact_center_contributes_nothing() {
        let p = params();
        let obstacle = Obstacle { center: Vec2::new(600.0, 300.0), radius: 20.0 };
        let agent = prey_at(0, 600.0, 300.0, 2.0, 0.0);
        assert_eq!(avoid_obstacles(&agent, &[obstacle], &p), Vec2::ZERO);
    }

    #[test]
    fn predator_avoidance_adds_up_instead_of_averaging() {
        let p = params();
        let a = prey_at(0, 500.0, 300.0, 2.0, 0.0);
        let one = [predator_at(10, 450.0, 300.0)];
        let two = [predator_at(10, 450.0, 300.0), predator_at(11, 400.0, 300.0)];
        assert!((avoid_predators(&a, &one, &p) - Vec2::new(1.0, 0.0)).length() < EPS);
        assert!((avoid_predators(&a, &two, &p) - Vec2::new(2.0, 0.0)).length() < EPS);
        let distant = [predator_at(12, 500.0 + p.predator_detection_range, 300.0)];
        assert_eq!(avoid_predators(&a, &distant, &p), Vec2::ZERO);
    }

    #[test]
    fn pursuit_picks_first_of_equally_near_prey() {
        let p = params();
        let hunter = predator_at(10, 500.0, 300.0);
        let left = prey_at(0, 450.0, 300.0, 2.0, 0.0);
        let right = prey_at(1, 550.0, 300.0, 2.0, 0.0);
        let prey = [left, right];
        let target = nearest(hunter.position, &prey).expect("prey exists");
        assert_eq!(target.id, 0);
        let force = pursue(&hunter, &[left, right], &p);
        assert!((force - Vec2::new(-p.predator_speed, 0.0)).length() < EPS);
    }

    #[test]
    fn pursuit_without_prey_is_zero() {
        let p = params();
        let hunter = predator_at(10, 500.0, 300.0);
        assert_eq!(pursue(&hunter, &[], &p), Vec2::ZERO);
        assert_eq!(predator_acceleration(&hunter, &[], &[], &p), Vec2::ZERO);
    }

    #[test]
    fn prey_composition_applies_weights() {
        let p = params();
        let a = prey_at(0, 10.0, 300.0, 2.0, 0.0);
        let hunter = predator_at(10, 60.0, 300.0);
        let force = prey_acceleration(&a, &[a], &[hunter], &[], &p);
        let expected =
            Vec2::new(1.0, 0.0) * p.w_edge + Vec2::new(-1.0, 0.0) * p.w_predator_avoidance;
        assert!((force - expected).length() < EPS);
    }

    #[test]
    fn predator_composition_uses_predator_weights() {
        let p = params();
        let hunter = predator_at(10, 10.0, 300.0);
        let obstacle = Obstacle { center: Vec2::new(40.0, 300.0), radius: 20.0 };
        let target = prey_at(0, 10.0, 400.0, 2.0, 0.0);

        // Obstacle push: (60 - 30) / 60 of max speed, pointing left.
        let push = Vec2::new(-0.5 * p.max_speed, 0.0);
        let expected = push * p.w_obstacle * 1.5
            + Vec2::new(1.0, 0.0) * p.w_edge * 2.0
            + Vec2::new(0.0, p.predator_speed) * p.w_hunting;
        let force = predator_acceleration(&hunter, &[target], &[obstacle], &p);

        assert!((force - expected).length() < EPS, "{:?} vs {:?}", force, expected);
        assert!((force - Vec2::new(-1.1, 0.225)).length() < EPS);
    }
}
