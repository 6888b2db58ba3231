use crate::geometry::Vector2;
use movie_swipe_models::{SwipeDirection, SwipeRequirement};

/// Map a release vector to a swipe direction
///
/// Horizontal wins only when `|x| > |y|`; a tie goes to the vertical axis.
/// The dominant component must exceed `threshold` in magnitude, otherwise the
/// result is [`SwipeDirection::None`]. Positive y is down (screen coordinates).
pub fn resolve(vector: Vector2, threshold: f64) -> SwipeDirection {
    if vector.x.abs() > vector.y.abs() {
        if vector.x > threshold {
            SwipeDirection::Right
        } else if vector.x < -threshold {
            SwipeDirection::Left
        } else {
            SwipeDirection::None
        }
    } else if vector.y > threshold {
        SwipeDirection::Down
    } else if vector.y < -threshold {
        SwipeDirection::Up
    } else {
        SwipeDirection::None
    }
}

/// Chooses which release signal feeds [`resolve`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SwipeDirectionResolver {
    pub requirement: SwipeRequirement,
    pub threshold: f64,
}

impl SwipeDirectionResolver {
    pub fn new(requirement: SwipeRequirement, threshold: f64) -> Self {
        Self { requirement, threshold }
    }

    /// The vector that decides the swipe under the configured requirement
    pub fn deciding_vector(&self, displacement: Vector2, velocity: Vector2) -> Vector2 {
        match self.requirement {
            SwipeRequirement::Velocity => velocity,
            SwipeRequirement::Distance => displacement,
        }
    }

    pub fn resolve_release(&self, displacement: Vector2, velocity: Vector2) -> SwipeDirection {
        resolve(self.deciding_vector(displacement, velocity), self.threshold)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const THRESHOLD: f64 = 800.0;

    #[test]
    fn test_horizontal_dominant() {
        assert_eq!(resolve(Vector2::new(1000.0, 200.0), THRESHOLD), SwipeDirection::Right);
        assert_eq!(resolve(Vector2::new(-1000.0, -999.0), THRESHOLD), SwipeDirection::Left);
        assert_eq!(resolve(Vector2::new(700.0, 10.0), THRESHOLD), SwipeDirection::None);
    }

    #[test]
    fn test_vertical_dominant() {
        assert_eq!(resolve(Vector2::new(10.0, 900.0), THRESHOLD), SwipeDirection::Down);
        assert_eq!(resolve(Vector2::new(-10.0, -900.0), THRESHOLD), SwipeDirection::Up);
        assert_eq!(resolve(Vector2::new(0.0, -800.0), THRESHOLD), SwipeDirection::None);
    }

    #[test]
    fn test_tie_goes_vertical() {
        let t = THRESHOLD + 1.0;
        assert_eq!(resolve(Vector2::new(t, t), THRESHOLD), SwipeDirection::Down);
        assert_eq!(resolve(Vector2::new(t, -t), THRESHOLD), SwipeDirection::Up);
        assert_eq!(resolve(Vector2::new(-t, -t), THRESHOLD), SwipeDirection::Up);
    }

    #[test]
    fn test_below_threshold_in_both_axes_is_none() {
        for (x, y) in [(0.0, 0.0), (800.0, 0.0), (-800.0, 799.0), (300.0, -800.0)] {
            assert_eq!(resolve(Vector2::new(x, y), THRESHOLD), SwipeDirection::None, "({}, {})", x, y);
        }
    }

    #[test]
    fn test_resolver_picks_vector_by_requirement() {
        let displacement = Vector2::new(150.0, 0.0);
        let velocity = Vector2::new(-50.0, 0.0);

        let by_velocity = SwipeDirectionResolver::new(SwipeRequirement::Velocity, 100.0);
        assert_eq!(by_velocity.resolve_release(displacement, velocity), SwipeDirection::None);

        let by_distance = SwipeDirectionResolver::new(SwipeRequirement::Distance, 100.0);
        assert_eq!(by_distance.resolve_release(displacement, velocity), SwipeDirection::Right);
    }
}
