use super::*;
use crate::test_support::{movie, movies, rated, FakeProvider, FakeStore};
use movie_swipe_models::CatalogType;
use tokio::sync::Notify;

const FRAME: Duration = Duration::from_millis(16);

fn build(provider: FakeProvider, store: Arc<FakeStore>, config: &Config) -> CardStackController {
    CardStackController::new(
        Arc::new(provider),
        store,
        config,
        PaginationCursor::new(CatalogType::Popular),
    )
    .unwrap()
}

fn stack_of(ids: impl IntoIterator<Item = u64>, provider: FakeProvider, store: Arc<FakeStore>) -> CardStackController {
    let mut controller = build(provider, store, &Config::default());
    controller.enqueue(movies(ids));
    controller
}

/// Touch down and move to `(dx, dy)` over a few frames
fn drag_to(controller: &mut CardStackController, dx: f64, dy: f64) {
    controller.on_drag_start().unwrap();
    for step in 1..=5 {
        let t = step as f64 / 5.0;
        controller.on_drag_update(dx * t, dy * t).unwrap();
        controller.tick(FRAME);
    }
}

async fn settle_tasks() {
    for _ in 0..10 {
        tokio::task::yield_now().await;
    }
}

fn drain_events(rx: &mut broadcast::Receiver<ControllerEvent>) -> Vec<ControllerEvent> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}

#[tokio::test]
async fn test_fast_right_swipe_likes_front_card() {
    let store = Arc::new(FakeStore::new());
    let mut controller = stack_of([1, 2, 3], FakeProvider::new(), store.clone());
    let mut events = controller.subscribe();

    drag_to(&mut controller, 60.0, 4.0);
    assert_eq!(controller.state(), ControllerState::Dragging);

    let outcome = controller.on_drag_end(1000.0, 0.0).unwrap();
    assert_eq!(outcome, ReleaseOutcome::Committing(SwipeDirection::Right));
    assert_eq!(controller.state(), ControllerState::Committing);

    // The write goes out while the card is still flying
    controller.flush_persistence().await;
    let upserts = store.upsert_calls();
    assert_eq!(upserts.len(), 1);
    assert_eq!(upserts[0].movie_id, 1);
    assert_eq!(upserts[0].liked_state, LikedState::Liked);
    assert_eq!(controller.queued_ids(), vec![1, 2, 3]);

    let committed = controller.run_until_idle(FRAME).unwrap();
    assert_eq!(committed.movie.id, 1);
    assert_eq!(committed.direction, SwipeDirection::Right);
    assert_eq!(committed.liked_state, LikedState::Liked);

    assert_eq!(controller.state(), ControllerState::Idle);
    assert_eq!(controller.queued_ids(), vec![2, 3]);
    assert!(controller.is_rated(1));
    assert_eq!(controller.card_frame(), CardFrame { x: 0.0, y: 0.0, rotation_degrees: 0.0 });

    let events = drain_events(&mut events);
    assert!(events
        .iter()
        .any(|e| matches!(e, ControllerEvent::RatingSaved(record) if record.movie_id == 1)));
    assert!(events.iter().any(|e| matches!(
        e,
        ControllerEvent::CardsChanged {
            front: Some(2),
            next: Some(3)
        }
    )));
}

#[tokio::test]
async fn test_slow_release_reverts_without_rating() {
    let store = Arc::new(FakeStore::new());
    let mut controller = stack_of([1, 2, 3], FakeProvider::new(), store.clone());

    drag_to(&mut controller, 60.0, 0.0);
    assert_eq!(controller.on_drag_end(200.0, 0.0).unwrap(), ReleaseOutcome::Reverting);
    assert_eq!(controller.state(), ControllerState::Reverting);

    assert_eq!(controller.run_until_idle(FRAME), None);
    controller.flush_persistence().await;

    assert_eq!(controller.state(), ControllerState::Idle);
    assert_eq!(controller.card_frame(), CardFrame { x: 0.0, y: 0.0, rotation_degrees: 0.0 });
    assert_eq!(controller.queued_ids(), vec![1, 2, 3]);
    assert!(store.upsert_calls().is_empty());
    assert_eq!(controller.replenish_cycles_started(), 0);
}

#[tokio::test]
async fn test_commit_below_low_water_mark_replenishes_once() {
    let store = Arc::new(FakeStore::with_history(vec![
        rated(1, LikedState::Liked),
        rated(2, LikedState::Disliked),
    ]));
    let provider = FakeProvider::new().with_page(1, movies(1..=5));
    let mut controller = stack_of(100..115, provider, store);
    assert_eq!(controller.load_rating_history().await.unwrap(), 2);
    assert!(!controller.start());

    controller.swipe_programmatically(SwipeDirection::Right).unwrap();
    controller.run_until_idle(FRAME).unwrap();
    assert_eq!(controller.queue_len(), 14);
    assert!(controller.is_replenishing());
    assert_eq!(controller.replenish_cycles_started(), 1);

    controller.wait_for_replenish().await;

    assert_eq!(controller.queue_len(), 17);
    assert_eq!(&controller.queued_ids()[14..], &[3, 4, 5]);
    assert_eq!(controller.cursor().page_index, 2);
    assert_eq!(controller.replenish_cycles_started(), 1);
    assert!(controller.queued_ids().iter().all(|&id| !matches!(id, 1 | 2 | 100)));
    assert!(!controller.is_replenishing());
}

#[tokio::test]
async fn test_replenish_requests_coalesce_while_in_flight() {
    let gate = Arc::new(Notify::new());
    let provider = Arc::new(FakeProvider::new().with_page(1, movies(100..=110)).gated(gate.clone()));
    let store = Arc::new(FakeStore::new());
    let mut controller = CardStackController::new(
        provider.clone(),
        store,
        &Config::default(),
        PaginationCursor::new(CatalogType::Popular),
    )
    .unwrap();
    controller.enqueue(movies(1..=10));

    for _ in 0..3 {
        controller.swipe_programmatically(SwipeDirection::Right).unwrap();
        assert!(controller.run_until_idle(FRAME).is_some());
        settle_tasks().await;
    }

    assert_eq!(controller.queue_len(), 7);
    assert_eq!(controller.replenish_cycles_started(), 1);
    assert_eq!(provider.pages_fetched(), vec![1]);
    assert!(!controller.request_replenish());

    gate.notify_one();
    controller.wait_for_replenish().await;

    assert_eq!(controller.queue_len(), 18);
    assert_eq!(controller.cursor().page_index, 2);
    assert_eq!(controller.replenish_cycles_started(), 1);
}

#[tokio::test]
async fn test_programmatic_left_swipe_dislikes() {
    let store = Arc::new(FakeStore::new());
    let mut controller = stack_of([7, 8], FakeProvider::new(), store.clone());

    controller.swipe_programmatically(SwipeDirection::Left).unwrap();
    assert_eq!(controller.state(), ControllerState::Committing);
    controller.tick(FRAME);
    assert!(controller.card_frame().x < 0.0);

    let committed = controller.run_until_idle(FRAME).unwrap();
    assert_eq!(committed.movie.id, 7);
    assert_eq!(committed.liked_state, LikedState::Disliked);

    controller.flush_persistence().await;
    let upserts = store.upsert_calls();
    assert_eq!(upserts.len(), 1);
    assert_eq!(upserts[0].liked_state, LikedState::Disliked);
    assert_eq!(controller.queued_ids(), vec![8]);
}

#[tokio::test]
async fn test_input_rejected_while_committing() {
    let store = Arc::new(FakeStore::new());
    let mut controller = stack_of([1, 2, 3], FakeProvider::new(), store.clone());

    controller.swipe_programmatically(SwipeDirection::Right).unwrap();
    assert!(matches!(
        controller.on_drag_start(),
        Err(SwipeError::Busy(ControllerState::Committing))
    ));
    assert!(matches!(
        controller.on_drag_update(40.0, 0.0),
        Err(SwipeError::Busy(ControllerState::Committing))
    ));
    assert!(matches!(
        controller.swipe_programmatically(SwipeDirection::Left),
        Err(SwipeError::Busy(_))
    ));
    assert!(matches!(controller.restore_card(), Err(SwipeError::Busy(_))));

    controller.run_until_idle(FRAME);
    controller.flush_persistence().await;
    assert_eq!(store.upsert_calls().len(), 1);
    assert_eq!(controller.queued_ids(), vec![2, 3]);
}

#[tokio::test]
async fn test_persist_failure_still_advances_stack() {
    let store = Arc::new(FakeStore::failing());
    let mut controller = stack_of([1, 2], FakeProvider::new(), store.clone());
    let mut events = controller.subscribe();

    controller.swipe_programmatically(SwipeDirection::Right).unwrap();
    let committed = controller.run_until_idle(FRAME).unwrap();
    assert_eq!(committed.movie.id, 1);
    controller.flush_persistence().await;

    assert_eq!(controller.queued_ids(), vec![2]);
    assert_eq!(store.upsert_calls().len(), 1);
    assert!(drain_events(&mut events)
        .iter()
        .any(|e| matches!(e, ControllerEvent::PersistFailed { movie_id: 1, .. })));

    let failures = controller.take_failures();
    assert_eq!(failures.len(), 1);
    assert!(matches!(failures[0], SwipeError::Persist { movie_id: 1, .. }));
    assert!(controller.take_failures().is_empty());
}

#[tokio::test]
async fn test_restore_puts_last_card_back() {
    let store = Arc::new(FakeStore::new());
    let mut controller = stack_of([1, 2, 3], FakeProvider::new(), store.clone());

    controller.swipe_programmatically(SwipeDirection::Right).unwrap();
    controller.run_until_idle(FRAME);
    assert!(controller.is_rated(1));

    let restored = controller.restore_card().unwrap();
    assert_eq!(restored.id, 1);
    assert_eq!(controller.queued_ids(), vec![1, 2, 3]);
    assert!(!controller.is_rated(1));
    assert!(matches!(controller.restore_card(), Err(SwipeError::NothingToRestore)));

    // Swiping it again overwrites the first rating
    controller.swipe_programmatically(SwipeDirection::Left).unwrap();
    controller.run_until_idle(FRAME);
    controller.flush_persistence().await;
    let upserts = store.upsert_calls();
    assert_eq!(upserts.len(), 2);
    assert_eq!(upserts[1].movie_id, 1);
    assert_eq!(upserts[1].liked_state, LikedState::Disliked);
}

#[tokio::test]
async fn test_reswipe_after_restore_keeps_latest_rating() {
    let store = Arc::new(FakeStore::slow_first_upsert(Duration::from_millis(50)));
    let mut controller = stack_of([1, 2, 3], FakeProvider::new(), store.clone());

    controller.swipe_programmatically(SwipeDirection::Right).unwrap();
    controller.run_until_idle(FRAME);
    controller.restore_card().unwrap();
    controller.swipe_programmatically(SwipeDirection::Left).unwrap();
    controller.run_until_idle(FRAME);
    controller.flush_persistence().await;

    let stored = store.stored();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].movie_id, 1);
    assert_eq!(stored[0].liked_state, LikedState::Disliked);
    assert!(controller.take_failures().is_empty());
}

#[tokio::test]
async fn test_fling_without_rest_thresholds_still_completes() {
    let mut config = Config::default();
    config.animation.fling.rest_speed = 0.0;
    config.animation.fling.rest_displacement = 0.0;
    let store = Arc::new(FakeStore::new());
    let mut controller = build(FakeProvider::new(), store, &config);
    controller.enqueue(movies([1, 2, 3]));

    controller.swipe_programmatically(SwipeDirection::Right).unwrap();
    let committed = controller.run_until_idle(FRAME).unwrap();
    assert_eq!(committed.movie.id, 1);
    assert_eq!(controller.state(), ControllerState::Idle);

    controller.swipe_programmatically(SwipeDirection::Left).unwrap();
    assert_eq!(controller.run_until_idle(FRAME).unwrap().movie.id, 2);
    controller.flush_persistence().await;
}

#[tokio::test]
async fn test_tap_does_not_move_card() {
    let store = Arc::new(FakeStore::new());
    let mut controller = stack_of([1], FakeProvider::new(), store.clone());

    controller.on_drag_start().unwrap();
    controller.on_drag_update(1.0, -1.5).unwrap();
    assert_eq!(controller.state(), ControllerState::Idle);
    assert_eq!(controller.on_drag_end(0.0, 0.0).unwrap(), ReleaseOutcome::Tapped);
    assert_eq!(controller.on_drag_end(0.0, 0.0).unwrap(), ReleaseOutcome::NoGesture);

    controller.tick(FRAME);
    assert_eq!(controller.state(), ControllerState::Idle);
    assert_eq!(controller.queued_ids(), vec![1]);
    assert!(store.upsert_calls().is_empty());
}

#[tokio::test]
async fn test_disallowed_direction_reverts() {
    let store = Arc::new(FakeStore::new());
    let mut controller = stack_of([1, 2], FakeProvider::new(), store.clone());

    drag_to(&mut controller, 0.0, -80.0);
    assert_eq!(controller.on_drag_end(0.0, -1500.0).unwrap(), ReleaseOutcome::Reverting);
    controller.run_until_idle(FRAME);

    assert!(matches!(
        controller.swipe_programmatically(SwipeDirection::Up),
        Err(SwipeError::DirectionNotAllowed(SwipeDirection::Up))
    ));
    controller.flush_persistence().await;
    assert!(store.upsert_calls().is_empty());
    assert_eq!(controller.queued_ids(), vec![1, 2]);
}

#[tokio::test]
async fn test_vertical_swipe_records_neither_when_allowed() {
    let mut config = Config::default();
    config.swipe.allowed_directions = vec![SwipeDirection::Left, SwipeDirection::Right, SwipeDirection::Up];
    let store = Arc::new(FakeStore::new());
    let mut controller = build(FakeProvider::new(), store.clone(), &config);
    controller.enqueue(movies([1, 2]));

    drag_to(&mut controller, 5.0, -80.0);
    assert_eq!(
        controller.on_drag_end(100.0, -1500.0).unwrap(),
        ReleaseOutcome::Committing(SwipeDirection::Up)
    );
    let committed = controller.run_until_idle(FRAME).unwrap();
    assert_eq!(committed.liked_state, LikedState::Neither);
}

#[tokio::test]
async fn test_distance_requirement_uses_displacement() {
    let mut config = Config::default();
    config.swipe.requirement = movie_swipe_models::SwipeRequirement::Distance;
    let store = Arc::new(FakeStore::new());
    let mut controller = build(FakeProvider::new(), store, &config);
    controller.enqueue(movies([1, 2]));

    // Far drag with no release velocity still commits
    drag_to(&mut controller, -150.0, 10.0);
    assert_eq!(
        controller.on_drag_end(0.0, 0.0).unwrap(),
        ReleaseOutcome::Committing(SwipeDirection::Left)
    );
    assert_eq!(controller.run_until_idle(FRAME).unwrap().movie.id, 1);
}

#[tokio::test]
async fn test_stale_replenish_result_is_discarded() {
    let provider = FakeProvider::new().with_page(1, movies(50..=60));
    let mut controller = stack_of([1, 2], provider, Arc::new(FakeStore::new()));

    assert!(controller.start());
    settle_tasks().await;
    controller.shutdown();
    controller.tick(FRAME);

    assert_eq!(controller.queued_ids(), vec![1, 2]);
    assert_eq!(controller.cursor().page_index, 1);
    assert!(!controller.is_replenishing());
}

#[tokio::test]
async fn test_failed_page_keeps_cursor() {
    let provider = FakeProvider::new().failing_page(1);
    let mut controller = stack_of([1, 2, 3], provider, Arc::new(FakeStore::new()));
    let mut events = controller.subscribe();

    assert!(controller.start());
    controller.wait_for_replenish().await;

    assert_eq!(controller.queue_len(), 3);
    assert_eq!(controller.cursor().page_index, 1);
    assert!(drain_events(&mut events)
        .iter()
        .any(|e| matches!(e, ControllerEvent::ReplenishFailed { added: 0, .. })));
    assert!(matches!(controller.take_failures()[..], [SwipeError::ProviderFetch(_)]));
}

#[tokio::test]
async fn test_enqueue_skips_rated_and_duplicate_movies() {
    let store = Arc::new(FakeStore::with_history(vec![rated(2, LikedState::Liked)]));
    let mut controller = build(FakeProvider::new(), store, &Config::default());
    controller.load_rating_history().await.unwrap();

    assert_eq!(controller.enqueue(vec![movie(1), movie(2), movie(3), movie(1)]), 2);
    assert_eq!(controller.queued_ids(), vec![1, 3]);
    assert_eq!(controller.front_card().map(|m| m.id), Some(1));
    assert_eq!(controller.next_card().map(|m| m.id), Some(3));
}

#[tokio::test]
async fn test_history_drops_already_queued_ratings() {
    let store = Arc::new(FakeStore::with_history(vec![rated(1, LikedState::Disliked)]));
    let mut controller = stack_of([1, 2], FakeProvider::new(), store);

    controller.load_rating_history().await.unwrap();
    assert_eq!(controller.queued_ids(), vec![2]);
}

#[tokio::test]
async fn test_next_card_grows_as_front_card_moves() {
    let mut controller = stack_of([1, 2], FakeProvider::new(), Arc::new(FakeStore::new()));
    assert_eq!(controller.next_card_style(), NextCardStyle { scale: 0.92, opacity: 0.6 });

    drag_to(&mut controller, 300.0, 0.0);
    for _ in 0..30 {
        controller.tick(FRAME);
    }
    let style = controller.next_card_style();
    assert!((style.scale - 1.0).abs() < 1e-9);
    assert!((style.opacity - 1.0).abs() < 1e-9);
}

#[tokio::test]
async fn test_empty_stack_rejects_swipes() {
    let mut controller = build(FakeProvider::new(), Arc::new(FakeStore::new()), &Config::default());
    assert!(matches!(controller.on_drag_start(), Err(SwipeError::NoCard)));
    assert!(matches!(
        controller.swipe_programmatically(SwipeDirection::Right),
        Err(SwipeError::NoCard)
    ));
}

#[test]
fn test_requires_runtime() {
    let result = CardStackController::new(
        Arc::new(FakeProvider::new()),
        Arc::new(FakeStore::new()),
        &Config::default(),
        PaginationCursor::new(CatalogType::Popular),
    );
    assert!(matches!(result, Err(SwipeError::Runtime(_))));
}
