use serde::Serialize;
use std::ops::{Add, Mul, Sub};

/// 2D value in logical pixels (or pixels per second for velocities)
///
/// Screen coordinates: x grows to the right, y grows downwards.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Vector2 {
    pub x: f64,
    pub y: f64,
}

impl Vector2 {
    pub const ZERO: Vector2 = Vector2 { x: 0.0, y: 0.0 };

    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn length(&self) -> f64 {
        self.x.hypot(self.y)
    }

    /// Unit vector in the same direction, or None for a zero vector
    pub fn normalized(&self) -> Option<Vector2> {
        let length = self.length();
        if length <= f64::EPSILON || !length.is_finite() {
            return None;
        }
        Some(Vector2::new(self.x / length, self.y / length))
    }

    /// Counter-clockwise perpendicular
    pub fn perpendicular(&self) -> Vector2 {
        Vector2::new(-self.y, self.x)
    }
}

impl From<(f64, f64)> for Vector2 {
    fn from((x, y): (f64, f64)) -> Self {
        Vector2::new(x, y)
    }
}

impl Add for Vector2 {
    type Output = Vector2;

    fn add(self, rhs: Vector2) -> Vector2 {
        Vector2::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Vector2 {
    type Output = Vector2;

    fn sub(self, rhs: Vector2) -> Vector2 {
        Vector2::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Mul<f64> for Vector2 {
    type Output = Vector2;

    fn mul(self, rhs: f64) -> Vector2 {
        Vector2::new(self.x * rhs, self.y * rhs)
    }
}

/// Linear interpolation from `input` to `output`, clamped at both ends
pub fn interpolate(value: f64, input: (f64, f64), output: (f64, f64)) -> f64 {
    let (in_start, in_end) = input;
    let (out_start, out_end) = output;
    if (in_end - in_start).abs() <= f64::EPSILON {
        return out_start;
    }
    let progress = ((value - in_start) / (in_end - in_start)).clamp(0.0, 1.0);
    out_start + (out_end - out_start) * progress
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interpolate_clamps() {
        assert_eq!(interpolate(50.0, (0.0, 100.0), (0.0, 35.0)), 17.5);
        assert_eq!(interpolate(500.0, (0.0, 100.0), (0.0, 35.0)), 35.0);
        assert_eq!(interpolate(-20.0, (0.0, 100.0), (0.0, 35.0)), 0.0);
        assert!((interpolate(0.5, (0.0, 1.0), (0.92, 1.0)) - 0.96).abs() < 1e-9);
        assert_eq!(interpolate(3.0, (1.0, 1.0), (2.0, 9.0)), 2.0);
    }

    #[test]
    fn test_normalized_and_perpendicular() {
        let v = Vector2::new(3.0, 4.0);
        let unit = v.normalized().unwrap();
        assert!((unit.length() - 1.0).abs() < 1e-12);
        assert_eq!(Vector2::new(1.0, 0.0).perpendicular(), Vector2::new(0.0, 1.0));
        assert!(Vector2::ZERO.normalized().is_none());
    }
}
