//! Async host for a `WalkTracker`.
//!
//! The driver task is the only owner of the tracker. It multiplexes sensor
//! readings, clock ticks and UI commands one at a time, so the session needs
//! no locking. Sensor subscriptions follow the walk lifecycle: taken on start
//! and resume, released on pause and stop.

use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::announce::AnnouncementSink;
use crate::clock::Clock;
use crate::source::{PositionSource, StepSource, WatchOptions};
use crate::stats::WalkStats;
use crate::tracker::WalkTracker;
use crate::types::{GoalKm, PositionSample, SampleOutcome, StepSample, WalkError, WalkState};

const COMMAND_CAPACITY: usize = 16;

type Reply<T> = oneshot::Sender<Result<T, WalkError>>;

#[derive(Debug)]
enum WalkCommand {
    Start(GoalKm, Reply<()>),
    Pause(Reply<()>),
    Resume(Reply<()>),
    Stop(Reply<WalkStats>),
    Snapshot(oneshot::Sender<Option<WalkStats>>),
}

/// Cloneable handle for controlling a running driver
#[derive(Debug, Clone)]
pub struct WalkHandle {
    tx: mpsc::Sender<WalkCommand>,
}

impl WalkHandle {
    pub async fn start(&self, goal: GoalKm) -> Result<(), WalkError> {
        self.request(|reply| WalkCommand::Start(goal, reply)).await
    }

    pub async fn pause(&self) -> Result<(), WalkError> {
        self.request(WalkCommand::Pause).await
    }

    pub async fn resume(&self) -> Result<(), WalkError> {
        self.request(WalkCommand::Resume).await
    }

    /// Stop the walk and get its final statistics
    pub async fn stop(&self) -> Result<WalkStats, WalkError> {
        self.request(WalkCommand::Stop).await
    }

    /// Current statistics, `None` when no walk is in progress
    pub async fn snapshot(&self) -> Result<Option<WalkStats>, WalkError> {
        let (reply, rx) = oneshot::channel();
        self.tx
            .send(WalkCommand::Snapshot(reply))
            .await
            .map_err(|_| WalkError::DriverGone)?;
        rx.await.map_err(|_| WalkError::DriverGone)
    }

    async fn request<T>(&self, make: impl FnOnce(Reply<T>) -> WalkCommand) -> Result<T, WalkError> {
        let (reply, rx) = oneshot::channel();
        self.tx
            .send(make(reply))
            .await
            .map_err(|_| WalkError::DriverGone)?;
        rx.await.map_err(|_| WalkError::DriverGone)?
    }
}

pub struct WalkDriver<P, St, C, S> {
    tracker: WalkTracker<C, S>,
    positions: P,
    steps: St,
    watch: WatchOptions,
    commands: mpsc::Receiver<WalkCommand>,
    position_rx: Option<mpsc::Receiver<PositionSample>>,
    step_rx: Option<mpsc::Receiver<StepSample>>,
}

impl<P, St, C, S> WalkDriver<P, St, C, S>
where
    P: PositionSource + 'static,
    St: StepSource + 'static,
    C: Clock + 'static,
    S: AnnouncementSink + 'static,
{
    pub fn new(
        tracker: WalkTracker<C, S>,
        positions: P,
        steps: St,
        watch: WatchOptions,
    ) -> (Self, WalkHandle) {
        let (tx, commands) = mpsc::channel(COMMAND_CAPACITY);
        let driver = Self {
            tracker,
            positions,
            steps,
            watch,
            commands,
            position_rx: None,
            step_rx: None,
        };
        (driver, WalkHandle { tx })
    }

    /// Run the driver on the current tokio runtime
    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(self.run())
    }

    /// Process events until every `WalkHandle` is dropped
    pub async fn run(mut self) {
        let mut ticker = tokio::time::interval(self.tracker.settings().tick_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            let active = self.tracker.state() == WalkState::Active;

            // Sensor readings first so a command never overtakes readings
            // that were delivered before it
            tokio::select! {
                biased;

                sample = recv_or_pending(&mut self.position_rx) => match sample {
                    Some(sample) => {
                        let outcome = self.tracker.on_position_sample(sample);
                        if let SampleOutcome::Accepted { delta_km } = outcome {
                            tracing::debug!(
                                "Accepted {:.3} km hop, total {:.3} km",
                                delta_km,
                                self.tracker.distance_km()
                            );
                        }
                    }
                    None => {
                        tracing::warn!("Position source closed");
                        self.position_rx = None;
                    }
                },
                sample = recv_or_pending(&mut self.step_rx) => match sample {
                    Some(sample) => self.tracker.on_step_sample(sample),
                    None => {
                        tracing::warn!("Step source closed");
                        self.step_rx = None;
                    }
                },
                _ = ticker.tick(), if active => self.tracker.tick(),
                command = self.commands.recv() => match command {
                    Some(command) => self.handle(command),
                    None => break,
                },
            }
        }

        self.release_sensors();
        tracing::debug!("Walk driver exiting");
    }

    fn handle(&mut self, command: WalkCommand) {
        match command {
            WalkCommand::Start(goal, reply) => {
                let result = self.tracker.start(goal);
                if result.is_ok() {
                    self.acquire_sensors();
                }
                let _ = reply.send(result);
            }
            WalkCommand::Pause(reply) => {
                let result = self.tracker.pause();
                if result.is_ok() {
                    self.release_sensors();
                }
                let _ = reply.send(result);
            }
            WalkCommand::Resume(reply) => {
                let result = self.tracker.resume();
                if result.is_ok() {
                    self.acquire_sensors();
                }
                let _ = reply.send(result);
            }
            WalkCommand::Stop(reply) => {
                let result = self.tracker.stop();
                if result.is_ok() {
                    self.release_sensors();
                }
                let _ = reply.send(result);
            }
            WalkCommand::Snapshot(reply) => {
                let _ = reply.send(self.tracker.stats());
            }
        }
    }

    /// A failed subscription is not fatal: the walk continues without that
    /// sensor and simply accumulates nothing from it.
    fn acquire_sensors(&mut self) {
        match self.positions.subscribe(&self.watch) {
            Ok(rx) => self.position_rx = Some(rx),
            Err(e) => tracing::warn!("Position updates unavailable: {}", e),
        }
        match self.steps.subscribe() {
            Ok(rx) => self.step_rx = Some(rx),
            Err(e) => tracing::warn!("Step counting unavailable: {}", e),
        }
    }

    /// Readings still queued in the dropped receivers are discarded
    fn release_sensors(&mut self) {
        if self.position_rx.take().is_some() {
            self.positions.unsubscribe();
        }
        if self.step_rx.take().is_some() {
            self.steps.unsubscribe();
        }
    }
}

async fn recv_or_pending<T>(rx: &mut Option<mpsc::Receiver<T>>) -> Option<T> {
    match rx {
        Some(rx) => rx.recv().await,
        None => std::future::pending().await,
    }
}
