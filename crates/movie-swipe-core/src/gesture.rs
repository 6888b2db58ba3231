//! Pointer input to gesture lifecycle.
//!
//! The tracker receives cumulative displacement from the touch-down point and
//! decides whether the touch is a drag or a tap. Movement within the dead zone
//! in both axes never starts a drag; releasing such a touch reports a tap.
//! Listeners are invoked synchronously, in order, on every emitted event.

use crate::geometry::Vector2;
use tracing::trace;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GestureEvent {
    /// Movement left the dead zone; carries the displacement at that moment
    Started { displacement: Vector2 },
    Updated { displacement: Vector2 },
    Ended { displacement: Vector2, velocity: Vector2 },
    /// Released without leaving the dead zone
    Tapped,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TrackingPhase {
    Idle,
    Pressed,
    Dragging,
}

type GestureListener = Box<dyn FnMut(&GestureEvent) + Send>;

pub struct GestureTracker {
    dead_zone: f64,
    phase: TrackingPhase,
    displacement: Vector2,
    listeners: Vec<GestureListener>,
}

impl GestureTracker {
    pub fn new(dead_zone: f64) -> Self {
        Self {
            dead_zone: dead_zone.max(0.0),
            phase: TrackingPhase::Idle,
            displacement: Vector2::ZERO,
            listeners: Vec::new(),
        }
    }

    /// Register a callback for every emitted event
    pub fn subscribe<F>(&mut self, listener: F)
    where
        F: FnMut(&GestureEvent) + Send + 'static,
    {
        self.listeners.push(Box::new(listener));
    }

    /// Touch down. Resets any previous gesture.
    pub fn on_gesture_start(&mut self) {
        self.phase = TrackingPhase::Pressed;
        self.displacement = Vector2::ZERO;
    }

    /// Pointer moved; `dx`/`dy` are measured from the touch-down point
    pub fn on_gesture_update(&mut self, dx: f64, dy: f64) -> Option<GestureEvent> {
        let displacement = Vector2::new(dx, dy);
        let event = match self.phase {
            TrackingPhase::Idle => return None,
            TrackingPhase::Pressed => {
                if dx.abs() <= self.dead_zone && dy.abs() <= self.dead_zone {
                    return None;
                }
                trace!(dx, dy, "Drag confirmed");
                self.phase = TrackingPhase::Dragging;
                GestureEvent::Started { displacement }
            }
            TrackingPhase::Dragging => GestureEvent::Updated { displacement },
        };
        self.displacement = displacement;
        self.emit(&event);
        Some(event)
    }

    /// Touch up with the platform-reported release velocity
    pub fn on_gesture_end(&mut self, vx: f64, vy: f64) -> Option<GestureEvent> {
        let event = match self.phase {
            TrackingPhase::Idle => return None,
            TrackingPhase::Pressed => GestureEvent::Tapped,
            TrackingPhase::Dragging => GestureEvent::Ended {
                displacement: self.displacement,
                velocity: Vector2::new(vx, vy),
            },
        };
        self.phase = TrackingPhase::Idle;
        self.displacement = Vector2::ZERO;
        self.emit(&event);
        Some(event)
    }

    /// Drop the current gesture without emitting anything
    pub fn cancel(&mut self) {
        self.phase = TrackingPhase::Idle;
        self.displacement = Vector2::ZERO;
    }

    pub fn is_pressed(&self) -> bool {
        self.phase != TrackingPhase::Idle
    }

    pub fn is_dragging(&self) -> bool {
        self.phase == TrackingPhase::Dragging
    }

    pub fn displacement(&self) -> Vector2 {
        self.displacement
    }

    fn emit(&mut self, event: &GestureEvent) {
        for listener in self.listeners.iter_mut() {
            listener(event);
        }
    }
}
