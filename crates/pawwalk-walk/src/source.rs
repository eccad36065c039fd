//! Sensor collaborators.
//!
//! Sources hand out an mpsc receiver on `subscribe`; dropping or replacing it
//! ends delivery. `SensorFeed` is the bridge a platform layer pushes readings
//! into.

use std::sync::Arc;

use parking_lot::Mutex;
use pawwalk_core::WalkConfig;
use tokio::sync::mpsc;

use crate::types::{PositionSample, SourceError, StepSample};

const FEED_CAPACITY: usize = 64;

/// Requested location accuracy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AccuracyTier {
    Balanced,
    High,
    #[default]
    BestForNavigation,
}

/// Position subscription options
#[derive(Debug, Clone, PartialEq)]
pub struct WatchOptions {
    pub accuracy: AccuracyTier,
    /// Minimum movement between reports
    pub distance_interval_m: f64,
    /// Minimum time between reports
    pub time_interval_ms: u64,
}

impl Default for WatchOptions {
    fn default() -> Self {
        Self {
            accuracy: AccuracyTier::BestForNavigation,
            distance_interval_m: 5.0,
            time_interval_ms: 2000,
        }
    }
}

impl From<&WalkConfig> for WatchOptions {
    fn from(config: &WalkConfig) -> Self {
        Self {
            accuracy: AccuracyTier::BestForNavigation,
            distance_interval_m: config.distance_interval_m,
            time_interval_ms: config.time_interval_ms,
        }
    }
}

pub trait PositionSource: Send {
    fn subscribe(
        &mut self,
        options: &WatchOptions,
    ) -> Result<mpsc::Receiver<PositionSample>, SourceError>;

    fn unsubscribe(&mut self);
}

pub trait StepSource: Send {
    fn subscribe(&mut self) -> Result<mpsc::Receiver<StepSample>, SourceError>;

    fn unsubscribe(&mut self);
}

/// Push-style sensor bridge. Clones share the same subscription slot.
#[derive(Debug)]
pub struct SensorFeed<T> {
    slot: Arc<Mutex<Option<mpsc::Sender<T>>>>,
}

impl<T> Clone for SensorFeed<T> {
    fn clone(&self) -> Self {
        Self {
            slot: Arc::clone(&self.slot),
        }
    }
}

impl<T> Default for SensorFeed<T> {
    fn default() -> Self {
        Self {
            slot: Arc::new(Mutex::new(None)),
        }
    }
}

impl<T: Send + std::fmt::Debug> SensorFeed<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Deliver a reading. Returns false when nobody is subscribed or the
    /// subscriber is not keeping up.
    pub fn push(&self, reading: T) -> bool {
        let slot = self.slot.lock();
        let Some(tx) = slot.as_ref() else {
            tracing::trace!("No subscriber, dropping {:?}", reading);
            return false;
        };
        match tx.try_send(reading) {
            Ok(()) => true,
            Err(e) => {
                tracing::debug!("Sensor reading not delivered: {}", e);
                false
            }
        }
    }

    pub fn is_subscribed(&self) -> bool {
        self.slot.lock().as_ref().is_some_and(|tx| !tx.is_closed())
    }

    fn attach(&self) -> mpsc::Receiver<T> {
        let (tx, rx) = mpsc::channel(FEED_CAPACITY);
        *self.slot.lock() = Some(tx);
        rx
    }

    fn detach(&self) {
        self.slot.lock().take();
    }
}

impl PositionSource for SensorFeed<PositionSample> {
    fn subscribe(
        &mut self,
        options: &WatchOptions,
    ) -> Result<mpsc::Receiver<PositionSample>, SourceError> {
        tracing::debug!("Position watch started: {:?}", options);
        Ok(self.attach())
    }

    fn unsubscribe(&mut self) {
        self.detach();
    }
}

impl StepSource for SensorFeed<StepSample> {
    fn subscribe(&mut self) -> Result<mpsc::Receiver<StepSample>, SourceError> {
        Ok(self.attach())
    }

    fn unsubscribe(&mut self) {
        self.detach();
    }
}
