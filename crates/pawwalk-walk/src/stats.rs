//! Derived walk statistics. Everything here is a pure function of session state.

use serde::Serialize;

use crate::settings::MIN_PACE_DISTANCE_KM;
use crate::types::WalkState;

const MS_PER_HOUR: f64 = 3_600_000.0;

/// Placeholder shown while the pace is undefined
pub const PACE_PLACEHOLDER: &str = "–";

/// Snapshot of a walk for display
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WalkStats {
    pub state: WalkState,
    pub goal_km: f64,
    pub distance_km: f64,
    pub elapsed_ms: i64,
    pub step_count: i64,
    /// Seconds per km, `None` until enough distance is covered
    pub pace_sec_per_km: Option<u64>,
    pub calorie_estimate: u32,
    pub remaining_km: f64,
    pub progress_fraction: f64,
    pub route_points: usize,
}

impl WalkStats {
    pub fn elapsed_display(&self) -> String {
        format_elapsed(self.elapsed_ms)
    }

    pub fn pace_display(&self) -> String {
        format_pace(self.pace_sec_per_km)
    }
}

/// Energy estimate from body weight, MET and time, rounded to whole kcal
pub fn calorie_estimate(weight_kg: f64, met: f64, elapsed_ms: i64) -> u32 {
    let hours = elapsed_ms.max(0) as f64 / MS_PER_HOUR;
    (weight_kg * met * hours).round() as u32
}

pub fn pace_sec_per_km(elapsed_ms: i64, distance_km: f64) -> Option<u64> {
    if distance_km < MIN_PACE_DISTANCE_KM {
        return None;
    }
    let secs = elapsed_ms.max(0) as f64 / 1000.0;
    Some((secs / distance_km).floor() as u64)
}

pub fn remaining_km(goal_km: f64, distance_km: f64) -> f64 {
    (goal_km - distance_km).max(0.0)
}

pub fn progress_fraction(goal_km: f64, distance_km: f64) -> f64 {
    (distance_km / goal_km).min(1.0)
}

/// `"12m 05s"`
pub fn format_elapsed(elapsed_ms: i64) -> String {
    let total = elapsed_ms.max(0) / 1000;
    format!("{}m {:02}s", total / 60, total % 60)
}

/// `"8:20 /km"`, or the placeholder
pub fn format_pace(pace: Option<u64>) -> String {
    match pace {
        Some(p) => format!("{}:{:02} /km", p / 60, p % 60),
        None => PACE_PLACEHOLDER.to_string(),
    }
}
