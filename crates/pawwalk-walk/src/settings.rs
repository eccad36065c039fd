use std::time::Duration;

use pawwalk_core::WalkConfig;

pub const ACCURACY_THRESHOLD_M: f64 = 20.0;
pub const MIN_DELTA_KM: f64 = 0.01;
pub const MAX_DELTA_KM: f64 = 0.2;
pub const WEIGHT_KG: f64 = 65.0;
/// MET for walking at about 5 km/h
pub const WALK_MET: f64 = 3.5;
/// Below this distance the pace is not reported
pub const MIN_PACE_DISTANCE_KM: f64 = 0.01;
pub const TICK_INTERVAL_MS: u64 = 1000;

/// Tunables for sample filtering and statistics
#[derive(Debug, Clone, PartialEq)]
pub struct TrackerSettings {
    pub accuracy_threshold_m: f64,
    pub min_delta_km: f64,
    pub max_delta_km: f64,
    pub weight_kg: f64,
    pub met: f64,
    pub tick_interval: Duration,
}

impl Default for TrackerSettings {
    fn default() -> Self {
        Self {
            accuracy_threshold_m: ACCURACY_THRESHOLD_M,
            min_delta_km: MIN_DELTA_KM,
            max_delta_km: MAX_DELTA_KM,
            weight_kg: WEIGHT_KG,
            met: WALK_MET,
            tick_interval: Duration::from_millis(TICK_INTERVAL_MS),
        }
    }
}

impl From<&WalkConfig> for TrackerSettings {
    fn from(config: &WalkConfig) -> Self {
        Self {
            accuracy_threshold_m: config.accuracy_threshold_m,
            min_delta_km: config.min_delta_km,
            max_delta_km: config.max_delta_km,
            weight_kg: config.weight_kg,
            met: config.met,
            tick_interval: Duration::from_millis(config.tick_interval_ms.max(1)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_matches_default_settings() {
        let settings = TrackerSettings::from(&WalkConfig::default());
        assert_eq!(settings, TrackerSettings::default());
    }

    #[test]
    fn test_zero_tick_interval_is_clamped() {
        let config = WalkConfig {
            tick_interval_ms: 0,
            ..WalkConfig::default()
        };
        let settings = TrackerSettings::from(&config);
        assert_eq!(settings.tick_interval, Duration::from_millis(1));
    }
}
