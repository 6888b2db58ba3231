//! Spring-driven card position and rotation.
//!
//! Each axis is an independent damped spring integrated on [`SpringAnimator::tick`].
//! Settle and fling animations hand out an [`AnimationHandle`] that resolves only
//! after *both* axes have come to rest, so callers never advance the card stack
//! while one axis is still moving. Starting a new animation interrupts the
//! previous handle. An axis still moving after `max_duration_ms` snaps to its
//! target and completes.
//!
//! Rotation is not animated separately: it is derived from the horizontal offset,
//! linearly mapped from `[0, screen diagonal]` to `[0, max_rotation_degrees]`,
//! clamped, and mirrored for negative offsets.

use crate::geometry::{interpolate, Vector2};
use futures::FutureExt;
use movie_swipe_config::{AnimationConfig, ScreenConfig, SpringProfile};
use serde::Serialize;
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};
use std::time::Duration;
use tokio::sync::oneshot;
use tracing::trace;

/// Longest integration step; larger frame deltas are subdivided
const MAX_STEP_SECS: f64 = 1.0 / 240.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnimationMode {
    Resting,
    FollowTouch,
    SettleToOrigin,
    FlingOffscreen,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnimationOutcome {
    Finished,
    /// Another animation replaced this one before it finished
    Interrupted,
}

/// Render-ready front card transform
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CardFrame {
    pub x: f64,
    pub y: f64,
    pub rotation_degrees: f64,
}

/// Completion of a settle or fling animation
///
/// Resolves once both axis springs are at rest.
pub struct AnimationHandle {
    inner: Pin<Box<dyn Future<Output = AnimationOutcome> + Send>>,
}

impl AnimationHandle {
    fn join(x: oneshot::Receiver<()>, y: oneshot::Receiver<()>) -> Self {
        let inner = async move {
            let (x, y) = futures::future::join(x, y).await;
            if x.is_ok() && y.is_ok() {
                AnimationOutcome::Finished
            } else {
                AnimationOutcome::Interrupted
            }
        };
        Self { inner: Box::pin(inner) }
    }

    /// Check for completion without waiting
    ///
    /// Must not be called again once it has returned `Some`.
    pub fn poll_outcome(&mut self) -> Option<AnimationOutcome> {
        self.inner.as_mut().now_or_never()
    }
}

impl Future for AnimationHandle {
    type Output = AnimationOutcome;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        self.inner.as_mut().poll(cx)
    }
}

impl std::fmt::Debug for AnimationHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("AnimationHandle")
    }
}

#[derive(Debug)]
struct SpringAxis {
    position: f64,
    velocity: f64,
    target: f64,
    profile: SpringProfile,
    resting: bool,
    elapsed: f64,
    max_duration: f64,
    completion: Option<oneshot::Sender<()>>,
}

impl SpringAxis {
    fn new(profile: SpringProfile, max_duration: Duration) -> Self {
        Self {
            position: 0.0,
            velocity: 0.0,
            target: 0.0,
            profile,
            resting: true,
            elapsed: 0.0,
            max_duration: max_duration.as_secs_f64(),
            completion: None,
        }
    }

    /// Move the target without a completion signal
    fn retarget(&mut self, target: f64, profile: SpringProfile) {
        self.target = target;
        self.profile = profile;
        self.resting = false;
        self.elapsed = 0.0;
        self.completion = None;
    }

    fn animate_to(&mut self, target: f64, profile: SpringProfile, initial_velocity: Option<f64>) -> oneshot::Receiver<()> {
        let (tx, rx) = oneshot::channel();
        self.retarget(target, profile);
        if let Some(velocity) = initial_velocity {
            self.velocity = velocity;
        }
        self.completion = Some(tx);
        rx
    }

    fn step(&mut self, dt: f64) {
        if self.resting {
            return;
        }
        let p = &self.profile;
        let acceleration = (-p.stiffness * (self.position - self.target) - p.damping * self.velocity) / p.mass;
        self.velocity += acceleration * dt;
        self.position += self.velocity * dt;
        self.elapsed += dt;

        let settled = self.velocity.abs() <= p.rest_speed && (self.position - self.target).abs() <= p.rest_displacement;
        if settled || self.elapsed >= self.max_duration {
            if !settled {
                trace!(target = self.target, position = self.position, "Spring hit max duration, snapping");
            }
            self.position = self.target;
            self.velocity = 0.0;
            self.resting = true;
            if let Some(completion) = self.completion.take() {
                let _ = completion.send(());
            }
        }
    }

    fn snap(&mut self, value: f64) {
        self.position = value;
        self.target = value;
        self.velocity = 0.0;
        self.resting = true;
        self.completion = None;
    }
}

type FrameListener = Box<dyn FnMut(&CardFrame) + Send>;

/// Owned animation state for one card
pub struct SpringAnimator {
    x: SpringAxis,
    y: SpringAxis,
    mode: AnimationMode,
    animation: AnimationConfig,
    screen: ScreenConfig,
    listeners: Vec<FrameListener>,
}

impl SpringAnimator {
    pub fn new(animation: AnimationConfig, screen: ScreenConfig) -> Self {
        let max_duration = Duration::from_millis(animation.max_duration_ms);
        Self {
            x: SpringAxis::new(animation.settle, max_duration),
            y: SpringAxis::new(animation.settle, max_duration),
            mode: AnimationMode::Resting,
            animation,
            screen,
            listeners: Vec::new(),
        }
    }

    /// Called with the new frame after every tick
    pub fn subscribe<F>(&mut self, listener: F)
    where
        F: FnMut(&CardFrame) + Send + 'static,
    {
        self.listeners.push(Box::new(listener));
    }

    /// Stick the card to the finger at `(dx, dy)`
    pub fn follow_touch(&mut self, dx: f64, dy: f64) {
        let profile = self.animation.follow;
        self.x.retarget(dx, profile);
        self.y.retarget(dy, profile);
        self.mode = AnimationMode::FollowTouch;
    }

    /// Soft return to the origin with zero rotation
    pub fn settle_to_origin(&mut self) -> AnimationHandle {
        let profile = self.animation.settle;
        let x = self.x.animate_to(0.0, profile, None);
        let y = self.y.animate_to(0.0, profile, None);
        self.mode = AnimationMode::SettleToOrigin;
        AnimationHandle::join(x, y)
    }

    /// Throw the card at least one screen diagonal along `direction`
    ///
    /// `velocity` seeds the springs so the exit continues the gesture's motion.
    pub fn fling_offscreen(&mut self, direction: Vector2, velocity: Vector2) -> AnimationHandle {
        let target = self.exit_target(direction, velocity);
        let profile = self.animation.fling;
        trace!(target_x = target.x, target_y = target.y, "Fling offscreen");

        let x = self.x.animate_to(target.x, profile, Some(velocity.x));
        let y = self.y.animate_to(target.y, profile, Some(velocity.y));
        self.mode = AnimationMode::FlingOffscreen;
        AnimationHandle::join(x, y)
    }

    /// Exit point one screen diagonal beyond the current position
    pub fn exit_target(&self, direction: Vector2, velocity: Vector2) -> Vector2 {
        let position = self.position();
        let unit = direction
            .normalized()
            .or_else(|| velocity.normalized())
            .or_else(|| position.normalized())
            .unwrap_or(Vector2::new(1.0, 0.0));
        position + unit * self.screen.diagonal()
    }

    /// Advance both springs by `dt` and notify listeners
    pub fn tick(&mut self, dt: Duration) -> CardFrame {
        let secs = dt.as_secs_f64();
        if secs > 0.0 {
            let steps = (secs / MAX_STEP_SECS).ceil().max(1.0) as u32;
            let step = secs / steps as f64;
            for _ in 0..steps {
                self.x.step(step);
                self.y.step(step);
            }
        }

        if self.mode == AnimationMode::SettleToOrigin && self.is_at_rest() {
            self.mode = AnimationMode::Resting;
        }

        let frame = self.frame();
        for listener in self.listeners.iter_mut() {
            listener(&frame);
        }
        frame
    }

    /// Snap back to the origin, dropping any running animation
    pub fn reset(&mut self) {
        self.x.snap(0.0);
        self.y.snap(0.0);
        self.mode = AnimationMode::Resting;
    }

    pub fn frame(&self) -> CardFrame {
        CardFrame {
            x: self.x.position,
            y: self.y.position,
            rotation_degrees: self.rotation_for(self.x.position),
        }
    }

    pub fn rotation_for(&self, dx: f64) -> f64 {
        let magnitude = interpolate(
            dx.abs(),
            (0.0, self.screen.diagonal()),
            (0.0, self.animation.max_rotation_degrees),
        );
        magnitude.copysign(dx)
    }

    pub fn position(&self) -> Vector2 {
        Vector2::new(self.x.position, self.y.position)
    }

    pub fn velocity(&self) -> Vector2 {
        Vector2::new(self.x.velocity, self.y.velocity)
    }

    pub fn mode(&self) -> AnimationMode {
        self.mode
    }

    pub fn is_at_rest(&self) -> bool {
        self.x.resting && self.y.resting
    }

    pub fn screen(&self) -> &ScreenConfig {
        &self.screen
    }
}
