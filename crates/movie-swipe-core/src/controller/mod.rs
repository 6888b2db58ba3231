//! The swipeable card stack.
//!
//! [`CardStackController`] owns the queue, the rated-id set, the gesture
//! tracker, and the front card's springs. It is driven from a single task:
//! gesture callbacks and [`CardStackController::tick`] are the only places that
//! mutate it. Rating writes and catalog replenishment run as Tokio tasks and
//! report back over a channel that `tick` drains, so every state change is
//! applied in order by the owner.
//!
//! Lifecycle of one card:
//!
//! ```text
//! Idle -> Dragging -> Deciding -> Committing -> (fling done) -> Idle, card popped
//!                              \-> Reverting  -> (settle done) -> Idle
//! ```
//!
//! The rating write is issued as soon as a commit is decided; the card leaves
//! the queue once both fling springs are at rest. Writes go through a single
//! writer task, so the store sees them in commit order.

use crate::cursor_storage::CursorStorage;
use crate::error::SwipeError;
use crate::geometry::{interpolate, Vector2};
use crate::gesture::{GestureEvent, GestureTracker};
use crate::replenish::{QueueReplenisher, ReplenishOutcome, ReplenishRequest};
use crate::resolver::SwipeDirectionResolver;
use crate::spring::{AnimationHandle, AnimationOutcome, CardFrame, SpringAnimator};
use movie_swipe_config::{Config, SwipeConfig};
use movie_swipe_models::{LikedState, MovieCandidate, PaginationCursor, RatingRecord, RatingUpsert, SwipeDirection};
use movie_swipe_sources::{MovieProvider, RatingStore, SourceError};
use rand::Rng;
use serde::Serialize;
use std::collections::{HashSet, VecDeque};
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

#[cfg(test)]
mod tests;

const EVENT_CAPACITY: usize = 256;

/// Upper bound on frames driven by [`CardStackController::run_until_idle`]
const MAX_IDLE_FRAMES: usize = 5_000;

const NEXT_CARD_SCALE: (f64, f64) = (0.92, 1.0);
const NEXT_CARD_OPACITY: (f64, f64) = (0.6, 1.0);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControllerState {
    Idle,
    Dragging,
    /// Release received, direction being resolved
    Deciding,
    Committing,
    Reverting,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReleaseOutcome {
    /// Released without leaving the dead zone
    Tapped,
    Committing(SwipeDirection),
    Reverting,
    /// No touch was in progress
    NoGesture,
}

/// A card that finished its exit animation and left the queue
#[derive(Debug, Clone, PartialEq)]
pub struct CommittedSwipe {
    pub movie: MovieCandidate,
    pub direction: SwipeDirection,
    pub liked_state: LikedState,
}

/// Transform for the card underneath the front card
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct NextCardStyle {
    pub scale: f64,
    pub opacity: f64,
}

#[derive(Debug, Clone)]
pub enum ControllerEvent {
    CardsChanged { front: Option<u64>, next: Option<u64> },
    QueueLength(usize),
    RatingSaved(RatingRecord),
    PersistFailed { movie_id: u64, error: String },
    ReplenishFinished { added: usize, next_page: u32 },
    ReplenishFailed { added: usize, error: String },
}

enum BackgroundMessage {
    Persisted {
        movie_id: u64,
        result: Result<RatingRecord, SourceError>,
    },
    Replenished {
        generation: u64,
        outcome: ReplenishOutcome,
    },
}

#[derive(Debug)]
struct PendingCommit {
    movie: MovieCandidate,
    direction: SwipeDirection,
    liked_state: LikedState,
}

pub struct CardStackController {
    store: Arc<dyn RatingStore>,
    user_id: String,
    swipe: SwipeConfig,

    queue: VecDeque<MovieCandidate>,
    rated_ids: HashSet<u64>,
    history: VecDeque<MovieCandidate>,

    tracker: GestureTracker,
    animator: SpringAnimator,
    resolver: SwipeDirectionResolver,
    state: ControllerState,
    animation: Option<AnimationHandle>,
    commit: Option<PendingCommit>,

    cursor: PaginationCursor,
    cursor_storage: Option<CursorStorage>,
    replenisher: Arc<QueueReplenisher>,
    replenish_task: Option<JoinHandle<()>>,
    generation: u64,
    cycles_started: u64,

    background_tx: mpsc::UnboundedSender<BackgroundMessage>,
    background_rx: mpsc::UnboundedReceiver<BackgroundMessage>,
    persist_tx: mpsc::UnboundedSender<RatingUpsert>,
    pending_persists: usize,
    failures: Vec<SwipeError>,
    events: broadcast::Sender<ControllerEvent>,
    runtime: Handle,
}

impl CardStackController {
    /// Build a controller on the current Tokio runtime
    pub fn new(
        provider: Arc<dyn MovieProvider>,
        store: Arc<dyn RatingStore>,
        config: &Config,
        cursor: PaginationCursor,
    ) -> Result<Self, SwipeError> {
        let runtime = Handle::try_current().map_err(|e| SwipeError::Runtime(e.to_string()))?;
        let swipe = config.swipe.clone();
        let replenisher = QueueReplenisher::new(provider, swipe.target_queue_size, swipe.max_pages_per_cycle);
        let (background_tx, background_rx) = mpsc::unbounded_channel();
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        let persist_tx = spawn_rating_writer(&runtime, store.clone(), config.user.user_id.clone(), background_tx.clone());

        Ok(Self {
            store,
            user_id: config.user.user_id.clone(),
            queue: VecDeque::new(),
            rated_ids: HashSet::new(),
            history: VecDeque::new(),
            tracker: GestureTracker::new(swipe.dead_zone),
            animator: SpringAnimator::new(config.animation.clone(), config.screen),
            resolver: SwipeDirectionResolver::new(swipe.requirement, swipe.threshold()),
            state: ControllerState::Idle,
            animation: None,
            commit: None,
            cursor,
            cursor_storage: None,
            replenisher: Arc::new(replenisher),
            replenish_task: None,
            generation: 0,
            cycles_started: 0,
            background_tx,
            background_rx,
            persist_tx,
            pending_persists: 0,
            failures: Vec::new(),
            events,
            runtime,
            swipe,
        })
    }

    /// Save the cursor here after every merged replenishment
    pub fn with_cursor_storage(mut self, storage: CursorStorage) -> Self {
        self.cursor_storage = Some(storage);
        self
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ControllerEvent> {
        self.events.subscribe()
    }

    /// Seed the rated-id set from the store
    ///
    /// Queued cards the user already rated are dropped.
    pub async fn load_rating_history(&mut self) -> Result<usize, SwipeError> {
        let records = self
            .store
            .list_ratings(&self.user_id)
            .await
            .map_err(SwipeError::History)?;
        let loaded = records.len();
        let rated: HashSet<u64> = records.into_iter().map(|r| r.movie_id).collect();

        let before = self.queue.len();
        let in_flight = self.commit.as_ref().map(|c| c.movie.id);
        self.queue
            .retain(|m| Some(m.id) == in_flight || !rated.contains(&m.id));
        self.rated_ids.extend(rated);

        info!(user_id = %self.user_id, loaded, dropped = before - self.queue.len(), "Loaded rating history");
        if self.queue.len() != before {
            self.notify_cards();
        }
        Ok(loaded)
    }

    /// Append movies to the back of the queue
    ///
    /// Movies already queued or rated are skipped. Returns how many were added.
    pub fn enqueue(&mut self, movies: Vec<MovieCandidate>) -> usize {
        let before = (self.front_id(), self.next_id());
        let mut known: HashSet<u64> = self.queue.iter().map(|m| m.id).collect();
        let mut added = 0;
        for movie in movies {
            if self.rated_ids.contains(&movie.id) || !known.insert(movie.id) {
                continue;
            }
            self.queue.push_back(movie);
            added += 1;
        }

        if added > 0 {
            if before != (self.front_id(), self.next_id()) {
                self.emit(ControllerEvent::CardsChanged {
                    front: self.front_id(),
                    next: self.next_id(),
                });
            }
            self.emit(ControllerEvent::QueueLength(self.queue.len()));
        }
        added
    }

    /// Top up the queue if it is below the low-water mark
    pub fn start(&mut self) -> bool {
        self.replenish_if_low()
    }

    pub fn front_card(&self) -> Option<&MovieCandidate> {
        self.queue.front()
    }

    pub fn next_card(&self) -> Option<&MovieCandidate> {
        self.queue.get(1)
    }

    pub fn queue_len(&self) -> usize {
        self.queue.len()
    }

    pub fn queued_ids(&self) -> Vec<u64> {
        self.queue.iter().map(|m| m.id).collect()
    }

    pub fn is_rated(&self, movie_id: u64) -> bool {
        self.rated_ids.contains(&movie_id)
    }

    pub fn state(&self) -> ControllerState {
        self.state
    }

    pub fn cursor(&self) -> &PaginationCursor {
        &self.cursor
    }

    pub fn card_frame(&self) -> CardFrame {
        self.animator.frame()
    }

    pub fn is_replenishing(&self) -> bool {
        self.replenish_task.is_some()
    }

    pub fn replenish_cycles_started(&self) -> u64 {
        self.cycles_started
    }

    /// Errors from background writes and fetches since the last call
    pub fn take_failures(&mut self) -> Vec<SwipeError> {
        std::mem::take(&mut self.failures)
    }

    /// Scale and opacity of the next card, growing as the front card moves away
    pub fn next_card_style(&self) -> NextCardStyle {
        let position = self.animator.position();
        let half_width = (self.animator.screen().width / 2.0).max(1.0);
        let progress = interpolate(position.x.abs().max(position.y.abs()), (0.0, half_width), (0.0, 1.0));
        NextCardStyle {
            scale: interpolate(progress, (0.0, 1.0), NEXT_CARD_SCALE),
            opacity: interpolate(progress, (0.0, 1.0), NEXT_CARD_OPACITY),
        }
    }

    pub fn on_drag_start(&mut self) -> Result<(), SwipeError> {
        if self.state != ControllerState::Idle {
            return Err(SwipeError::Busy(self.state));
        }
        if self.queue.is_empty() {
            return Err(SwipeError::NoCard);
        }
        self.tracker.on_gesture_start();
        Ok(())
    }

    /// Pointer moved to `(dx, dy)` from the touch-down point
    ///
    /// Starts a touch if none is in progress.
    pub fn on_drag_update(&mut self, dx: f64, dy: f64) -> Result<(), SwipeError> {
        if !self.tracker.is_pressed() {
            self.on_drag_start()?;
        } else if !matches!(self.state, ControllerState::Idle | ControllerState::Dragging) {
            return Err(SwipeError::Busy(self.state));
        }

        match self.tracker.on_gesture_update(dx, dy) {
            Some(GestureEvent::Started { displacement }) => {
                self.state = ControllerState::Dragging;
                self.animator.follow_touch(displacement.x, displacement.y);
            }
            Some(GestureEvent::Updated { displacement }) => {
                self.animator.follow_touch(displacement.x, displacement.y);
            }
            _ => {}
        }
        Ok(())
    }

    /// Touch released with velocity `(vx, vy)` in points per second
    pub fn on_drag_end(&mut self, vx: f64, vy: f64) -> Result<ReleaseOutcome, SwipeError> {
        match self.tracker.on_gesture_end(vx, vy) {
            Some(GestureEvent::Tapped) => Ok(ReleaseOutcome::Tapped),
            Some(GestureEvent::Ended { displacement, velocity }) => {
                self.state = ControllerState::Deciding;
                let direction = self.resolver.resolve_release(displacement, velocity);
                if direction != SwipeDirection::None && self.swipe.is_allowed(direction) {
                    let exit = self.resolver.deciding_vector(displacement, velocity);
                    self.begin_commit(direction, exit, velocity)?;
                    Ok(ReleaseOutcome::Committing(direction))
                } else {
                    debug!(direction = %direction, dx = displacement.x, dy = displacement.y, "Release did not commit");
                    self.begin_revert();
                    Ok(ReleaseOutcome::Reverting)
                }
            }
            _ => Ok(ReleaseOutcome::NoGesture),
        }
    }

    /// Swipe the front card without a gesture
    ///
    /// The exit velocity gets a small random sideways component so repeated
    /// swipes don't follow an identical path.
    pub fn swipe_programmatically(&mut self, direction: SwipeDirection) -> Result<(), SwipeError> {
        if self.state != ControllerState::Idle || self.tracker.is_pressed() {
            return Err(SwipeError::Busy(self.state));
        }
        if direction == SwipeDirection::None || !self.swipe.is_allowed(direction) {
            return Err(SwipeError::DirectionNotAllowed(direction));
        }
        if self.queue.is_empty() {
            return Err(SwipeError::NoCard);
        }

        let unit = Vector2::from(direction.unit_vector());
        let jitter = self.random_jitter();
        let velocity = unit * self.swipe.programmatic_velocity + unit.perpendicular() * jitter;
        self.begin_commit(direction, unit, velocity)
    }

    /// Put the most recently swiped card back on top of the stack
    ///
    /// The movie is removed from the rated-id set so it can be swiped again;
    /// the stored rating is left as is until it is overwritten.
    pub fn restore_card(&mut self) -> Result<MovieCandidate, SwipeError> {
        if self.state != ControllerState::Idle || self.tracker.is_pressed() {
            return Err(SwipeError::Busy(self.state));
        }
        let movie = self.history.pop_back().ok_or(SwipeError::NothingToRestore)?;

        self.rated_ids.remove(&movie.id);
        self.queue.retain(|m| m.id != movie.id);
        self.queue.push_front(movie.clone());
        self.animator.reset();

        info!(movie_id = movie.id, title = %movie.title, "Restored card");
        self.notify_cards();
        Ok(movie)
    }

    /// Advance animations by `dt` and apply finished background work
    ///
    /// Returns the card that left the stack during this frame, if any.
    pub fn tick(&mut self, dt: Duration) -> Option<CommittedSwipe> {
        if self.state != ControllerState::Idle || !self.animator.is_at_rest() {
            self.animator.tick(dt);
        }

        let mut committed = None;
        if let Some(outcome) = self.animation.as_mut().and_then(|handle| handle.poll_outcome()) {
            self.animation = None;
            committed = self.finish_animation(outcome);
        }

        self.drain_background();
        committed
    }

    /// Tick with `frame` until the running animation has finished
    pub fn run_until_idle(&mut self, frame: Duration) -> Option<CommittedSwipe> {
        let mut committed = None;
        for _ in 0..MAX_IDLE_FRAMES {
            if self.state == ControllerState::Idle && self.animation.is_none() {
                break;
            }
            if let Some(swipe) = self.tick(frame) {
                committed = Some(swipe);
            }
        }
        self.drain_background();
        committed
    }

    /// Start a replenishment cycle unless one is already running
    pub fn request_replenish(&mut self) -> bool {
        if self.replenish_task.is_some() {
            debug!("Replenishment already in flight, coalescing request");
            return false;
        }

        let request = ReplenishRequest {
            cursor: self.cursor.clone(),
            excluded_ids: self.rated_ids.clone(),
            queued_ids: self.queue.iter().map(|m| m.id).collect(),
            existing_len: self.queue.len(),
        };

        self.generation += 1;
        self.cycles_started += 1;
        let generation = self.generation;
        let replenisher = self.replenisher.clone();
        let tx = self.background_tx.clone();

        info!(
            queue_len = self.queue.len(),
            page = self.cursor.page_index,
            target = self.replenisher.target_size(),
            "Starting replenishment"
        );
        self.replenish_task = Some(self.runtime.spawn(async move {
            let outcome = replenisher.replenish(request).await;
            let _ = tx.send(BackgroundMessage::Replenished { generation, outcome });
        }));
        true
    }

    /// Wait for the running replenishment cycle and apply its result
    pub async fn wait_for_replenish(&mut self) {
        while self.replenish_task.is_some() {
            match self.background_rx.recv().await {
                Some(message) => self.handle_background(message),
                None => break,
            }
        }
    }

    /// Wait until every issued rating write has reported back
    pub async fn flush_persistence(&mut self) {
        while self.pending_persists > 0 {
            match self.background_rx.recv().await {
                Some(message) => self.handle_background(message),
                None => break,
            }
        }
    }

    /// Cancel replenishment; a result still in the channel is ignored
    pub fn shutdown(&mut self) {
        if let Some(task) = self.replenish_task.take() {
            task.abort();
            debug!("Cancelled in-flight replenishment");
        }
        self.generation += 1;
        self.tracker.cancel();
    }

    fn begin_commit(&mut self, direction: SwipeDirection, exit: Vector2, velocity: Vector2) -> Result<(), SwipeError> {
        let (movie, liked_state) = match (self.queue.front(), direction.liked_state()) {
            (Some(movie), Some(liked_state)) => (movie.clone(), liked_state),
            (None, _) => {
                self.state = ControllerState::Idle;
                return Err(SwipeError::NoCard);
            }
            (_, None) => {
                self.state = ControllerState::Idle;
                return Err(SwipeError::DirectionNotAllowed(direction));
            }
        };

        info!(movie_id = movie.id, title = %movie.title, direction = %direction, "Committing swipe");
        self.state = ControllerState::Committing;
        self.rated_ids.insert(movie.id);
        self.queue_persist(&movie, liked_state);
        self.animation = Some(self.animator.fling_offscreen(exit, velocity));
        self.commit = Some(PendingCommit {
            movie,
            direction,
            liked_state,
        });
        Ok(())
    }

    fn begin_revert(&mut self) {
        self.state = ControllerState::Reverting;
        self.animation = Some(self.animator.settle_to_origin());
    }

    fn queue_persist(&mut self, movie: &MovieCandidate, liked_state: LikedState) {
        let upsert = RatingUpsert::new(movie.id, movie.title.clone(), liked_state).with_poster(movie.poster_url.clone());
        if self.persist_tx.send(upsert).is_ok() {
            self.pending_persists += 1;
        } else {
            warn!(movie_id = movie.id, "Rating writer stopped, rating not saved");
            self.failures.push(SwipeError::Persist {
                movie_id: movie.id,
                source: SourceError::Store("rating writer stopped".to_string()),
            });
        }
    }

    fn finish_animation(&mut self, outcome: AnimationOutcome) -> Option<CommittedSwipe> {
        if outcome == AnimationOutcome::Interrupted {
            debug!(state = ?self.state, "Animation interrupted");
        }

        match self.state {
            ControllerState::Committing => {
                self.state = ControllerState::Idle;
                self.animator.reset();
                let commit = self.commit.take()?;

                match self.queue.iter().position(|m| m.id == commit.movie.id) {
                    Some(0) => {
                        self.queue.pop_front();
                    }
                    Some(index) => {
                        self.queue.remove(index);
                    }
                    None => {}
                }
                if self.swipe.restore_history > 0 {
                    if self.history.len() == self.swipe.restore_history {
                        self.history.pop_front();
                    }
                    self.history.push_back(commit.movie.clone());
                }

                debug!(movie_id = commit.movie.id, queue_len = self.queue.len(), "Card left the stack");
                self.notify_cards();
                self.replenish_if_low();

                Some(CommittedSwipe {
                    movie: commit.movie,
                    direction: commit.direction,
                    liked_state: commit.liked_state,
                })
            }
            ControllerState::Reverting => {
                self.state = ControllerState::Idle;
                self.animator.reset();
                None
            }
            _ => None,
        }
    }

    fn drain_background(&mut self) {
        while let Ok(message) = self.background_rx.try_recv() {
            self.handle_background(message);
        }
    }

    fn handle_background(&mut self, message: BackgroundMessage) {
        match message {
            BackgroundMessage::Persisted { movie_id, result } => {
                self.pending_persists = self.pending_persists.saturating_sub(1);
                match result {
                    Ok(record) => {
                        debug!(movie_id, liked_state = record.liked_state.as_str(), "Rating saved");
                        self.emit(ControllerEvent::RatingSaved(record));
                    }
                    Err(e) => {
                        warn!(movie_id, "Failed to save rating: {}", e);
                        self.emit(ControllerEvent::PersistFailed {
                            movie_id,
                            error: e.to_string(),
                        });
                        self.failures.push(SwipeError::Persist { movie_id, source: e });
                    }
                }
            }
            BackgroundMessage::Replenished { generation, outcome } => {
                if generation != self.generation || self.replenish_task.is_none() {
                    debug!(generation, current = self.generation, "Discarding stale replenishment");
                    return;
                }
                self.replenish_task = None;
                self.apply_replenish(outcome);
            }
        }
    }

    fn apply_replenish(&mut self, outcome: ReplenishOutcome) {
        let before = (self.front_id(), self.next_id());
        let mut known: HashSet<u64> = self.queue.iter().map(|m| m.id).collect();
        let mut added = 0;
        for movie in outcome.additions {
            if self.rated_ids.contains(&movie.id) || !known.insert(movie.id) {
                continue;
            }
            self.queue.push_back(movie);
            added += 1;
        }

        if outcome.pages_merged > 0 {
            self.cursor = outcome.cursor;
            self.save_cursor();
        }

        if before != (self.front_id(), self.next_id()) {
            self.emit(ControllerEvent::CardsChanged {
                front: self.front_id(),
                next: self.next_id(),
            });
        }
        self.emit(ControllerEvent::QueueLength(self.queue.len()));

        match outcome.error {
            Some(e) => {
                warn!(added, next_page = self.cursor.page_index, "Replenishment stopped early: {}", e);
                self.emit(ControllerEvent::ReplenishFailed {
                    added,
                    error: e.to_string(),
                });
                self.failures.push(SwipeError::ProviderFetch(e));
            }
            None => {
                info!(added, queue_len = self.queue.len(), next_page = self.cursor.page_index, "Replenishment applied");
                self.emit(ControllerEvent::ReplenishFinished {
                    added,
                    next_page: self.cursor.page_index,
                });
                // Keep going only while the catalog is still producing cards
                if added > 0 {
                    self.replenish_if_low();
                }
            }
        }
    }

    fn replenish_if_low(&mut self) -> bool {
        if self.queue.len() < self.swipe.low_water_mark {
            self.request_replenish()
        } else {
            false
        }
    }

    fn save_cursor(&self) {
        if let Some(storage) = &self.cursor_storage {
            if let Err(e) = storage.save(&self.cursor) {
                warn!("Failed to save catalog cursor: {}", e);
            }
        }
    }

    fn random_jitter(&self) -> f64 {
        let jitter = self.swipe.programmatic_jitter.abs();
        if jitter == 0.0 {
            return 0.0;
        }
        rand::rng().random_range(-jitter..=jitter)
    }

    fn front_id(&self) -> Option<u64> {
        self.queue.front().map(|m| m.id)
    }

    fn next_id(&self) -> Option<u64> {
        self.queue.get(1).map(|m| m.id)
    }

    fn notify_cards(&self) {
        self.emit(ControllerEvent::CardsChanged {
            front: self.front_id(),
            next: self.next_id(),
        });
        self.emit(ControllerEvent::QueueLength(self.queue.len()));
    }

    fn emit(&self, event: ControllerEvent) {
        // No subscribers is fine
        let _ = self.events.send(event);
    }
}

/// Run rating writes one at a time in the order they were queued
///
/// The task ends when the controller drops its sender.
fn spawn_rating_writer(
    runtime: &Handle,
    store: Arc<dyn RatingStore>,
    user_id: String,
    tx: mpsc::UnboundedSender<BackgroundMessage>,
) -> mpsc::UnboundedSender<RatingUpsert> {
    let (persist_tx, mut persist_rx) = mpsc::unbounded_channel::<RatingUpsert>();
    runtime.spawn(async move {
        while let Some(upsert) = persist_rx.recv().await {
            let movie_id = upsert.movie_id;
            let result = store.upsert_rating(&user_id, upsert).await;
            if tx.send(BackgroundMessage::Persisted { movie_id, result }).is_err() {
                break;
            }
        }
        debug!("Rating writer finished");
    });
    persist_tx
}

impl Drop for CardStackController {
    fn drop(&mut self) {
        if let Some(task) = self.replenish_task.take() {
            task.abort();
        }
    }
}
