use flocking_common::{ObstacleView, Vec2};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Obstacle {
    pub center: Vec2,
    pub radius: f32,
}

impl Obstacle {
    pub fn contains(&self, point: Vec2) -> bool {
        point.distance(self.center) < self.radius
    }

    pub fn view(&self) -> ObstacleView {
        ObstacleView { center: self.center, radius: self.radius }
    }
}

/// Circular obstacles in insertion order.
#[derive(Debug, Clone)]
pub struct ObstacleRegistry {
    obstacles: Vec<Obstacle>,
    default_radius: f32,
}

impl ObstacleRegistry {
    pub fn new(default_radius: f32) -> Self {
        Self { obstacles: Vec::new(), default_radius }
    }

    /// Places an obstacle of the default radius centered at `point`.
    pub fn add(&mut self, point: Vec2) {
        self.add_with_radius(point, self.default_radius);
    }

    pub fn add_with_radius(&mut self, point: Vec2, radius: f32) {
        self.obstacles.push(Obstacle { center: point, radius });
    }

    /// Removes the earliest-added obstacle that covers `point`, if any.
    pub fn remove_nearest(&mut self, point: Vec2) -> Option<Obstacle> {
        let idx = self.obstacles.iter().position(|o| o.contains(point))?;
        Some(self.obstacles.remove(idx))
    }

    pub fn clear(&mut self) {
        self.obstacles.clear();
    }

    pub fn as_slice(&self) -> &[Obstacle] {
        &self.obstacles
    }

    pub fn iter(&self) -> impl Iterator<Item = &Obstacle> {
        self.obstacles.iter()
    }

    pub fn len(&self) -> usize {
        self.obstacles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.obstacles.is_empty()
    }
}
