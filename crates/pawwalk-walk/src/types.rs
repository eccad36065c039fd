use serde::{Deserialize, Serialize};

use crate::geo::GeoPoint;

/// A validated, strictly positive goal distance in km
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize)]
pub struct GoalKm(f64);

impl GoalKm {
    pub fn new(km: f64) -> Result<Self, WalkError> {
        if km.is_finite() && km > 0.0 {
            Ok(Self(km))
        } else {
            Err(WalkError::InvalidGoal(km.to_string()))
        }
    }

    /// Parse user input such as `"2.5"`
    pub fn parse(input: &str) -> Result<Self, WalkError> {
        let km: f64 = input
            .trim()
            .parse()
            .map_err(|_| WalkError::InvalidGoal(input.to_string()))?;
        Self::new(km)
    }

    pub fn km(&self) -> f64 {
        self.0
    }
}

/// One reading from the position source
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PositionSample {
    pub latitude: f64,
    pub longitude: f64,
    pub accuracy_meters: f64,
}

impl PositionSample {
    pub fn new(latitude: f64, longitude: f64, accuracy_meters: f64) -> Self {
        Self {
            latitude,
            longitude,
            accuracy_meters,
        }
    }

    pub fn at(point: GeoPoint, accuracy_meters: f64) -> Self {
        Self::new(point.latitude, point.longitude, accuracy_meters)
    }

    pub fn point(&self) -> GeoPoint {
        GeoPoint::new(self.latitude, self.longitude)
    }
}

/// One reading from the step counter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepSample {
    pub cumulative_steps: i64,
}

/// Lifecycle of the tracker
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum WalkState {
    #[default]
    Idle,
    Active,
    Paused,
    Stopped,
}

/// Goal progress notifications, each fired at most once per walk
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Milestone {
    HalfGoal { goal_km: f64 },
    FullGoal { goal_km: f64, calorie_estimate: u32 },
}

/// Why a position sample was dropped
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RejectReason {
    /// NaN or out-of-range coordinates or accuracy
    Invalid,
    LowAccuracy { accuracy_m: f64 },
    Jitter { delta_km: f64 },
    Jump { delta_km: f64 },
}

/// What happened to a position sample
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SampleOutcome {
    /// Tracker was not active
    Ignored,
    Rejected(RejectReason),
    /// First point of the route; no distance added
    First,
    Accepted { delta_km: f64 },
}

impl SampleOutcome {
    pub fn is_accepted(&self) -> bool {
        matches!(self, Self::First | Self::Accepted { .. })
    }
}

/// Walk tracking errors
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum WalkError {
    #[error("Invalid goal distance: {0}")]
    InvalidGoal(String),
    #[error("Cannot {op} while {state:?}")]
    InvalidTransition { op: &'static str, state: WalkState },
    #[error("Walk driver has shut down")]
    DriverGone,
}

/// Sensor subscription errors
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SourceError {
    #[error("Sensor permission denied")]
    PermissionDenied,
    #[error("Sensor unavailable")]
    Unavailable,
    #[error("Sensor error: {0}")]
    Other(String),
}

impl From<WalkError> for pawwalk_core::AppError {
    fn from(e: WalkError) -> Self {
        let mapped = match e {
            WalkError::InvalidGoal(input) => pawwalk_core::WalkError::InvalidGoal(input),
            other => pawwalk_core::WalkError::InvalidState(other.to_string()),
        };
        mapped.into()
    }
}

impl From<SourceError> for pawwalk_core::AppError {
    fn from(e: SourceError) -> Self {
        pawwalk_core::WalkError::SensorUnavailable(e.to_string()).into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_goal_parse_accepts_positive() {
        assert_eq!(GoalKm::parse("2.5").unwrap().km(), 2.5);
        assert_eq!(GoalKm::parse(" 3 ").unwrap().km(), 3.0);
    }

    #[test]
    fn test_goal_rejects_non_positive_and_garbage() {
        assert!(matches!(GoalKm::parse("0"), Err(WalkError::InvalidGoal(_))));
        assert!(GoalKm::parse("-1").is_err());
        assert!(GoalKm::parse("abc").is_err());
        assert!(GoalKm::parse("").is_err());
        assert!(GoalKm::parse("NaN").is_err());
        assert!(GoalKm::parse("inf").is_err());
    }

    #[test]
    fn test_milestone_serializes_with_kind_tag() {
        let m = Milestone::FullGoal {
            goal_km: 1.0,
            calorie_estimate: 57,
        };
        let json = serde_json::to_value(m).unwrap();
        assert_eq!(json["kind"], "full_goal");
        assert_eq!(json["calorie_estimate"], 57);
    }

    #[test]
    fn test_transition_error_message() {
        let err = WalkError::InvalidTransition {
            op: "pause",
            state: WalkState::Idle,
        };
        assert_eq!(err.to_string(), "Cannot pause while Idle");
    }

    #[test]
    fn test_errors_map_to_app_errors() {
        let app: pawwalk_core::AppError = WalkError::InvalidGoal("abc".into()).into();
        assert_eq!(app.user_message(), "Please enter a valid goal distance.");

        let app: pawwalk_core::AppError = SourceError::PermissionDenied.into();
        assert!(matches!(
            app,
            pawwalk_core::AppError::Walk(pawwalk_core::WalkError::SensorUnavailable(_))
        ));
    }
}
