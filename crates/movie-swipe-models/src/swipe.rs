use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use crate::rating::LikedState;

/// Outcome of resolving a released gesture
///
/// `None` means no direction met the threshold and the card returns to origin.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum SwipeDirection {
    None,
    Left,
    Right,
    Up,
    Down,
}

impl SwipeDirection {
    /// Rating recorded when a card leaves in this direction
    pub fn liked_state(&self) -> Option<LikedState> {
        match self {
            SwipeDirection::None => None,
            SwipeDirection::Right => Some(LikedState::Liked),
            SwipeDirection::Left => Some(LikedState::Disliked),
            SwipeDirection::Up | SwipeDirection::Down => Some(LikedState::Neither),
        }
    }

    /// Unit vector in screen coordinates (y grows downwards)
    pub fn unit_vector(&self) -> (f64, f64) {
        match self {
            SwipeDirection::None => (0.0, 0.0),
            SwipeDirection::Left => (-1.0, 0.0),
            SwipeDirection::Right => (1.0, 0.0),
            SwipeDirection::Up => (0.0, -1.0),
            SwipeDirection::Down => (0.0, 1.0),
        }
    }

    pub fn is_horizontal(&self) -> bool {
        matches!(self, SwipeDirection::Left | SwipeDirection::Right)
    }
}

impl fmt::Display for SwipeDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SwipeDirection::None => "none",
            SwipeDirection::Left => "left",
            SwipeDirection::Right => "right",
            SwipeDirection::Up => "up",
            SwipeDirection::Down => "down",
        };
        write!(f, "{}", name)
    }
}

impl FromStr for SwipeDirection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "none" => Ok(SwipeDirection::None),
            "left" => Ok(SwipeDirection::Left),
            "right" => Ok(SwipeDirection::Right),
            "up" => Ok(SwipeDirection::Up),
            "down" => Ok(SwipeDirection::Down),
            _ => Err(format!("Invalid swipe direction: {}", s)),
        }
    }
}

/// Which release signal decides a swipe
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum SwipeRequirement {
    /// Release velocity must exceed the threshold
    #[default]
    Velocity,
    /// Displacement from origin must exceed the threshold
    Distance,
}
