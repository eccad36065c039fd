//! Integration tests for the async walk driver.
//!
//! Readings are pushed through `SensorFeed`s the way a platform layer would
//! deliver them, and observed through the `WalkHandle`.

use pawwalk_walk::{
    GeoPoint, GoalKm, ManualClock, Milestone, PositionSample, PositionSource, SensorFeed,
    SourceError, StepSample, TrackerSettings, WalkDriver, WalkError, WalkHandle, WalkState,
    WalkTracker, WatchOptions,
};
use tokio::sync::mpsc;

/// Point `km` kilometers due north of `from`
fn offset_north(from: GeoPoint, km: f64) -> GeoPoint {
    let d_lat = (km / pawwalk_walk::geo::EARTH_RADIUS_KM).to_degrees();
    GeoPoint::new(from.latitude + d_lat, from.longitude)
}

const T0: i64 = 1_700_000_000_000;
const HOP_KM: f64 = 0.1001;

fn origin() -> GeoPoint {
    GeoPoint::new(47.6062, -122.3321)
}

struct Harness {
    handle: WalkHandle,
    positions: SensorFeed<PositionSample>,
    steps: SensorFeed<StepSample>,
    clock: ManualClock,
    milestones: mpsc::UnboundedReceiver<Milestone>,
    driver: tokio::task::JoinHandle<()>,
}

fn harness() -> Harness {
    let clock = ManualClock::new(T0);
    let (milestone_tx, milestones) = mpsc::unbounded_channel();
    let positions = SensorFeed::new();
    let steps = SensorFeed::new();

    let tracker = WalkTracker::new(TrackerSettings::default(), clock.clone(), milestone_tx);
    let (driver, handle) = WalkDriver::new(
        tracker,
        positions.clone(),
        steps.clone(),
        WatchOptions::default(),
    );

    Harness {
        handle,
        positions,
        steps,
        clock,
        milestones,
        driver: driver.spawn(),
    }
}

/// Push `hops` northward readings starting after `from`
fn push_walk(feed: &SensorFeed<PositionSample>, from: GeoPoint, hops: usize) -> GeoPoint {
    let mut at = from;
    for _ in 0..hops {
        at = offset_north(at, HOP_KM);
        assert!(feed.push(PositionSample::at(at, 5.0)));
    }
    at
}

#[tokio::test]
async fn test_full_walk_lifecycle() {
    let mut h = harness();

    h.handle.start(GoalKm::new(1.0).unwrap()).await.unwrap();
    assert!(h.positions.is_subscribed());
    assert!(h.steps.is_subscribed());

    assert!(h.steps.push(StepSample { cumulative_steps: 5_000 }));
    assert!(h.positions.push(PositionSample::at(origin(), 5.0)));
    let at = push_walk(&h.positions, origin(), 5);
    assert!(h.steps.push(StepSample { cumulative_steps: 5_700 }));

    let stats = h.handle.snapshot().await.unwrap().unwrap();
    assert_eq!(stats.state, WalkState::Active);
    assert_eq!(stats.route_points, 6);
    assert!((stats.distance_km - 0.5005).abs() < 1e-6);
    assert_eq!(stats.step_count, 700);
    assert_eq!(h.milestones.try_recv().unwrap(), Milestone::HalfGoal { goal_km: 1.0 });

    // Pausing releases the sensors
    h.clock.advance(10 * 60 * 1000);
    h.handle.pause().await.unwrap();
    assert!(!h.positions.is_subscribed());
    assert!(!h.positions.push(PositionSample::at(offset_north(at, HOP_KM), 5.0)));

    // Time spent paused is not charged
    h.clock.advance(30 * 60 * 1000);
    h.handle.resume().await.unwrap();
    assert!(h.positions.is_subscribed());
    let stats = h.handle.snapshot().await.unwrap().unwrap();
    assert_eq!(stats.elapsed_ms, 10 * 60 * 1000);

    h.clock.advance(5 * 60 * 1000);
    push_walk(&h.positions, at, 5);

    let summary = h.handle.stop().await.unwrap();
    assert_eq!(summary.state, WalkState::Stopped);
    assert!((summary.distance_km - 1.001).abs() < 1e-6);
    assert_eq!(summary.elapsed_ms, 15 * 60 * 1000);
    assert_eq!(summary.remaining_km, 0.0);
    assert_eq!(summary.progress_fraction, 1.0);
    assert_eq!(
        h.milestones.try_recv().unwrap(),
        Milestone::FullGoal {
            goal_km: 1.0,
            calorie_estimate: 57,
        }
    );
    assert!(h.milestones.try_recv().is_err());
    assert!(!h.positions.is_subscribed());
    assert_eq!(h.handle.snapshot().await.unwrap(), None);

    drop(h.handle);
    h.driver.await.unwrap();
}

#[tokio::test]
async fn test_invalid_commands_are_reported() {
    let h = harness();

    assert!(matches!(
        h.handle.pause().await,
        Err(WalkError::InvalidTransition { op: "pause", .. })
    ));
    assert!(h.handle.stop().await.is_err());

    h.handle.start(GoalKm::new(2.0).unwrap()).await.unwrap();
    assert!(h.handle.start(GoalKm::new(3.0).unwrap()).await.is_err());
    assert!(h.handle.resume().await.is_err());
}

#[tokio::test]
async fn test_restart_after_stop_resubscribes() {
    let h = harness();

    h.handle.start(GoalKm::new(1.0).unwrap()).await.unwrap();
    h.handle.stop().await.unwrap();
    assert!(!h.positions.is_subscribed());

    h.handle.start(GoalKm::new(1.0).unwrap()).await.unwrap();
    assert!(h.positions.is_subscribed());
    let stats = h.handle.snapshot().await.unwrap().unwrap();
    assert_eq!(stats.route_points, 0);
    assert_eq!(stats.distance_km, 0.0);
}

struct DeniedPositions;

impl PositionSource for DeniedPositions {
    fn subscribe(
        &mut self,
        _options: &WatchOptions,
    ) -> Result<mpsc::Receiver<PositionSample>, SourceError> {
        Err(SourceError::PermissionDenied)
    }

    fn unsubscribe(&mut self) {}
}

#[tokio::test]
async fn test_denied_position_source_is_not_fatal() {
    let clock = ManualClock::new(T0);
    let steps: SensorFeed<StepSample> = SensorFeed::new();
    let tracker = WalkTracker::new(
        TrackerSettings::default(),
        clock.clone(),
        Vec::<Milestone>::new(),
    );
    let (driver, handle) = WalkDriver::new(
        tracker,
        DeniedPositions,
        steps.clone(),
        WatchOptions::default(),
    );
    let join = driver.spawn();

    handle.start(GoalKm::new(1.0).unwrap()).await.unwrap();
    assert!(steps.push(StepSample { cumulative_steps: 10 }));
    assert!(steps.push(StepSample { cumulative_steps: 25 }));
    clock.advance(60_000);

    let stats = handle.snapshot().await.unwrap().unwrap();
    assert_eq!(stats.distance_km, 0.0);
    assert_eq!(stats.step_count, 15);
    assert_eq!(stats.elapsed_ms, 60_000);

    drop(handle);
    join.await.unwrap();
}

#[tokio::test]
async fn test_handle_reports_driver_gone() {
    let h = harness();
    h.driver.abort();
    let _ = h.driver.await;

    assert_eq!(
        h.handle.start(GoalKm::new(1.0).unwrap()).await,
        Err(WalkError::DriverGone)
    );
}
