//! The walk tracker.
//!
//! A `WalkTracker` owns at most one session. Position samples pass an
//! accuracy check and a hop-length window before they extend the route; the
//! accepted hops sum to the walked distance. Goal milestones latch once per
//! session.

use crate::announce::AnnouncementSink;
use crate::clock::Clock;
use crate::geo::{haversine_km, GeoPoint};
use crate::settings::TrackerSettings;
use crate::stats::{self, WalkStats};
use crate::types::{
    GoalKm, Milestone, PositionSample, RejectReason, SampleOutcome, StepSample, WalkError,
    WalkState,
};

#[derive(Debug, Clone)]
struct Session {
    goal: GoalKm,
    route: Vec<GeoPoint>,
    distance_km: f64,
    baseline_steps: Option<i64>,
    step_count: i64,
    started_at_ms: i64,
    elapsed_ms: i64,
    half_announced: bool,
    full_announced: bool,
}

impl Session {
    fn new(goal: GoalKm, now_ms: i64) -> Self {
        Self {
            goal,
            route: Vec::new(),
            distance_km: 0.0,
            baseline_steps: None,
            step_count: 0,
            started_at_ms: now_ms,
            elapsed_ms: 0,
            half_announced: false,
            full_announced: false,
        }
    }
}

pub struct WalkTracker<C, S> {
    settings: TrackerSettings,
    clock: C,
    sink: S,
    state: WalkState,
    session: Option<Session>,
}

impl<C: Clock, S: AnnouncementSink> WalkTracker<C, S> {
    pub fn new(settings: TrackerSettings, clock: C, sink: S) -> Self {
        Self {
            settings,
            clock,
            sink,
            state: WalkState::Idle,
            session: None,
        }
    }

    pub fn state(&self) -> WalkState {
        self.state
    }

    pub fn settings(&self) -> &TrackerSettings {
        &self.settings
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Accepted route points, oldest first
    pub fn route(&self) -> &[GeoPoint] {
        self.session.as_ref().map_or(&[], |s| s.route.as_slice())
    }

    pub fn distance_km(&self) -> f64 {
        self.session.as_ref().map_or(0.0, |s| s.distance_km)
    }

    pub fn step_count(&self) -> i64 {
        self.session.as_ref().map_or(0, |s| s.step_count)
    }

    /// Elapsed walking time; frozen while paused
    pub fn elapsed_ms(&self) -> i64 {
        match (&self.session, self.state) {
            (Some(s), WalkState::Active) => self.clock.now_ms() - s.started_at_ms,
            (Some(s), _) => s.elapsed_ms,
            (None, _) => 0,
        }
    }

    /// Begin a new walk. Any previous session must have been stopped.
    pub fn start(&mut self, goal: GoalKm) -> Result<(), WalkError> {
        match self.state {
            WalkState::Idle | WalkState::Stopped => {}
            state => return Err(WalkError::InvalidTransition { op: "start", state }),
        }

        self.session = Some(Session::new(goal, self.clock.now_ms()));
        self.state = WalkState::Active;
        tracing::info!("Walk started with a {} km goal", goal.km());
        Ok(())
    }

    pub fn pause(&mut self) -> Result<(), WalkError> {
        self.require(WalkState::Active, "pause")?;
        let elapsed = self.elapsed_ms();
        if let Some(session) = self.session.as_mut() {
            session.elapsed_ms = elapsed;
        }
        self.state = WalkState::Paused;
        tracing::info!("Walk paused at {}", stats::format_elapsed(elapsed));
        Ok(())
    }

    /// Continue a paused walk. Time spent paused is not counted and the step
    /// baseline is kept.
    pub fn resume(&mut self) -> Result<(), WalkError> {
        self.require(WalkState::Paused, "resume")?;
        let now = self.clock.now_ms();
        if let Some(session) = self.session.as_mut() {
            session.started_at_ms = now - session.elapsed_ms;
        }
        self.state = WalkState::Active;
        tracing::info!("Walk resumed");
        Ok(())
    }

    /// End the walk and discard the session, returning its final statistics
    pub fn stop(&mut self) -> Result<WalkStats, WalkError> {
        match self.state {
            WalkState::Active | WalkState::Paused => {}
            state => return Err(WalkError::InvalidTransition { op: "stop", state }),
        }

        let elapsed = self.elapsed_ms();
        if let Some(session) = self.session.as_mut() {
            session.elapsed_ms = elapsed;
        }
        self.state = WalkState::Stopped;
        let summary = self.stats_with_state(WalkState::Stopped);
        self.session = None;

        let summary = summary.ok_or(WalkError::InvalidTransition {
            op: "stop",
            state: WalkState::Idle,
        })?;
        tracing::info!(
            "Walk stopped: {:.2} km in {}",
            summary.distance_km,
            summary.elapsed_display()
        );
        Ok(summary)
    }

    /// Clock tick: refresh the stored elapsed time
    pub fn tick(&mut self) {
        if self.state != WalkState::Active {
            return;
        }
        let elapsed = self.elapsed_ms();
        if let Some(session) = self.session.as_mut() {
            session.elapsed_ms = elapsed;
        }
    }

    pub fn on_position_sample(&mut self, sample: PositionSample) -> SampleOutcome {
        if self.state != WalkState::Active {
            return SampleOutcome::Ignored;
        }
        let Some(session) = self.session.as_mut() else {
            return SampleOutcome::Ignored;
        };

        let point = sample.point();
        if !point.is_valid() || !sample.accuracy_meters.is_finite() {
            tracing::trace!("Rejected invalid sample {:?}", sample);
            return SampleOutcome::Rejected(RejectReason::Invalid);
        }
        if sample.accuracy_meters > self.settings.accuracy_threshold_m {
            tracing::trace!("Rejected sample with accuracy {} m", sample.accuracy_meters);
            return SampleOutcome::Rejected(RejectReason::LowAccuracy {
                accuracy_m: sample.accuracy_meters,
            });
        }

        let Some(last) = session.route.last().copied() else {
            session.route.push(point);
            tracing::debug!("Route anchored at {}, {}", point.latitude, point.longitude);
            return SampleOutcome::First;
        };

        let delta_km = haversine_km(last, point);
        // NaN fails `contains` and lands in Jump
        if !(self.settings.min_delta_km..=self.settings.max_delta_km).contains(&delta_km) {
            let reason = if delta_km < self.settings.min_delta_km {
                tracing::trace!("Rejected {:.4} km hop as jitter", delta_km);
                RejectReason::Jitter { delta_km }
            } else {
                tracing::trace!("Rejected {:.4} km hop as implausible", delta_km);
                RejectReason::Jump { delta_km }
            };
            return SampleOutcome::Rejected(reason);
        }

        session.route.push(point);
        session.distance_km += delta_km;
        self.check_milestones();

        SampleOutcome::Accepted { delta_km }
    }

    /// Record a cumulative step count. The first reading of a walk is the
    /// baseline; later readings are reported relative to it, unclamped.
    pub fn on_step_sample(&mut self, sample: StepSample) {
        if self.state != WalkState::Active {
            return;
        }
        if let Some(session) = self.session.as_mut() {
            let baseline = *session.baseline_steps.get_or_insert(sample.cumulative_steps);
            session.step_count = sample.cumulative_steps - baseline;
        }
    }

    /// Snapshot of the current walk, `None` when there is no session
    pub fn stats(&self) -> Option<WalkStats> {
        self.stats_with_state(self.state)
    }

    fn stats_with_state(&self, state: WalkState) -> Option<WalkStats> {
        let session = self.session.as_ref()?;
        let goal_km = session.goal.km();
        let elapsed_ms = self.elapsed_ms();

        Some(WalkStats {
            state,
            goal_km,
            distance_km: session.distance_km,
            elapsed_ms,
            step_count: session.step_count,
            pace_sec_per_km: stats::pace_sec_per_km(elapsed_ms, session.distance_km),
            calorie_estimate: self.calorie_estimate_for(elapsed_ms),
            remaining_km: stats::remaining_km(goal_km, session.distance_km),
            progress_fraction: stats::progress_fraction(goal_km, session.distance_km),
            route_points: session.route.len(),
        })
    }

    fn calorie_estimate_for(&self, elapsed_ms: i64) -> u32 {
        stats::calorie_estimate(self.settings.weight_kg, self.settings.met, elapsed_ms)
    }

    fn check_milestones(&mut self) {
        let elapsed_ms = self.elapsed_ms();
        let calories = self.calorie_estimate_for(elapsed_ms);
        let Some(session) = self.session.as_mut() else {
            return;
        };
        session.elapsed_ms = elapsed_ms;
        let goal_km = session.goal.km();

        if !session.half_announced && session.distance_km >= goal_km / 2.0 {
            session.half_announced = true;
            self.sink.notify(Milestone::HalfGoal { goal_km });
        }

        if !session.full_announced && session.distance_km >= goal_km {
            session.full_announced = true;
            self.sink.notify(Milestone::FullGoal {
                goal_km,
                calorie_estimate: calories,
            });
        }
    }

    fn require(&self, expected: WalkState, op: &'static str) -> Result<(), WalkError> {
        if self.state == expected {
            Ok(())
        } else {
            Err(WalkError::InvalidTransition {
                op,
                state: self.state,
            })
        }
    }
}
