pub mod controller;
pub mod cursor_storage;
pub mod error;
pub mod geometry;
pub mod gesture;
pub mod rating_book;
pub mod replenish;
pub mod resolver;
pub mod spring;

pub use controller::{CardStackController, CommittedSwipe, ControllerEvent, ControllerState, NextCardStyle, ReleaseOutcome};
pub use cursor_storage::CursorStorage;
pub use error::SwipeError;
pub use geometry::{interpolate, Vector2};
pub use gesture::{GestureEvent, GestureTracker};
pub use rating_book::RatingBook;
pub use replenish::{QueueReplenisher, ReplenishOutcome, ReplenishRequest, StopReason};
pub use resolver::{resolve, SwipeDirectionResolver};
pub use spring::{AnimationHandle, AnimationMode, AnimationOutcome, CardFrame, SpringAnimator};

#[cfg(test)]
mod test_support;
