use serde::{Deserialize, Serialize};
use std::ops::{Add, AddAssign, Div, Mul, Sub, SubAssign};

/// Basic 2D vector type shared by the engine and any renderer.
#[derive(Copy, Clone, Default, Debug, PartialEq, Serialize, Deserialize)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub const ZERO: Vec2 = Vec2 { x: 0.0, y: 0.0 };
    pub const X: Vec2 = Vec2 { x: 1.0, y: 0.0 };

    /// Creates a new Vec2.
    #[inline]
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Creates a zero vector.
    #[inline]
    pub fn zero() -> Self {
        Self::ZERO
    }

    /// Calculates the squared length (magnitude) of the vector.
    #[inline]
    pub fn length_squared(self) -> f32 {
        self.x * self.x + self.y * self.y
    }

    /// Calculates the length (magnitude) of the vector.
    #[inline]
    pub fn length(self) -> f32 {
        self.length_squared().sqrt()
    }

    /// Calculates the distance to another vector (point).
    #[inline]
    pub fn distance(self, other: Self) -> f32 {
        (self - other).length()
    }

    /// Calculates the dot product with another vector.
    #[inline]
    pub fn dot(self, other: Self) -> f32 {
        self.x * other.x + self.y * other.y
    }

    #[inline]
    pub fn is_zero(self) -> bool {
        self.x == 0.0 && self.y == 0.0
    }

    /// Rescales the vector to `target` length, keeping its direction.
    /// A zero-length vector has no direction and is returned unchanged.
    pub fn scale_to_length(self, target: f32) -> Self {
        let len = self.length();
        if len > 0.0 {
            self * (target / len)
        } else {
            self
        }
    }

    /// Returns a normalized version of the vector (unit vector).
    /// Returns a zero vector if the length is zero or very small.
    pub fn normalize_or_zero(self) -> Vec2 {
        let len_sq = self.length_squared();
        if len_sq > 1e-12 {
            self * (1.0 / len_sq.sqrt())
        } else {
            Vec2::zero()
        }
    }

    /// Rotates counter-clockwise by `angle` radians.
    pub fn rotate(self, angle: f32) -> Self {
        let (sin, cos) = angle.sin_cos();
        Self::new(self.x * cos - self.y * sin, self.x * sin + self.y * cos)
    }

    /// Signed angle in radians that rotates `self` onto `other`, in (-PI, PI].
    pub fn angle_to(self, other: Self) -> f32 {
        let cross = self.x * other.y - self.y * other.x;
        cross.atan2(self.dot(other))
    }
}

// Implement standard operators for convenience
impl Add for Vec2 {
    type Output = Vec2;

    fn add(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl AddAssign for Vec2 {
    fn add_assign(&mut self, rhs: Vec2) {
        *self = *self + rhs;
    }
}

impl Sub for Vec2 {
    type Output = Vec2;

    fn sub(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl SubAssign for Vec2 {
    fn sub_assign(&mut self, rhs: Vec2) {
        *self = *self - rhs;
    }
}

impl Mul<f32> for Vec2 {
    type Output = Vec2;

    fn mul(self, scalar: f32) -> Vec2 {
        Vec2::new(self.x * scalar, self.y * scalar)
    }
}

// Callers guard against a zero divisor.
impl Div<f32> for Vec2 {
    type Output = Vec2;

    fn div(self, scalar: f32) -> Vec2 {
        debug_assert!(scalar != 0.0, "Vec2 divided by zero");
        Vec2::new(self.x / scalar, self.y / scalar)
    }
}

/// Unit vector pointing along `theta` radians.
pub fn angle_to_vec(theta: f32) -> Vec2 {
    Vec2::new(theta.cos(), theta.sin())
}

/// Heading of `v` in radians, measured from the +x axis.
pub fn vec_to_angle(v: Vec2) -> f32 {
    v.y.atan2(v.x)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_PI_2;

    const EPS: f32 = 1e-5;

    #[test]
    fn scale_to_length_keeps_direction() {
        let v = Vec2::new(3.0, 4.0).scale_to_length(10.0);
        assert!((v.x - 6.0).abs() < EPS);
        assert!((v.y - 8.0).abs() < EPS);
    }

    #[test]
    fn scale_to_length_on_zero_is_noop() {
        assert_eq!(Vec2::ZERO.scale_to_length(4.0), Vec2::ZERO);
    }

    #[test]
    fn rotate_quarter_turn() {
        let v = Vec2::X.rotate(FRAC_PI_2);
        assert!(v.x.abs() < EPS);
        assert!((v.y - 1.0).abs() < EPS);
    }

    #[test]
    fn angle_to_is_signed() {
        let up = Vec2::new(0.0, 1.0);
        assert!((Vec2::X.angle_to(up) - FRAC_PI_2).abs() < EPS);
        assert!((up.angle_to(Vec2::X) + FRAC_PI_2).abs() < EPS);
        // Rotating by the measured angle lands on the other direction.
        let a = Vec2::new(2.0, -1.0);
        let b = Vec2::new(-0.5, 3.0);
        let turned = a.normalize_or_zero().rotate(a.angle_to(b));
        let target = b.normalize_or_zero();
        assert!((turned - target).length() < 1e-4);
    }

    #[test]
    fn distance_and_heading_helpers() {
        assert!((Vec2::new(1.0, 1.0).distance(Vec2::new(4.0, 5.0)) - 5.0).abs() < EPS);
        let theta = 1.2;
        assert!((vec_to_angle(angle_to_vec(theta)) - theta).abs() < EPS);
        assert_eq!(Vec2::new(1e-8, 0.0).normalize_or_zero(), Vec2::ZERO);
    }
}
