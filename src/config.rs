//! Engine configuration.

use serde::{Deserialize, Serialize};

use crate::waypoint::kind;

/// Tunable parameters for the plan engine.
///
/// All fields have conservative defaults; embedding code usually only
/// overrides `default_altitude`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlanConfig {
    /// Altitude (metres) assigned to new waypoints placed outside a
    /// diversion window.
    pub default_altitude: f64,
    /// Window (seconds) during which repeated edits of confirmed waypoints
    /// are granted without re-prompting the operator.
    pub debounce_secs: u64,
    /// Command kinds for which a zero altitude requires explicit
    /// confirmation before sending.
    pub zero_alt_kinds: Vec<u16>,
}

impl Default for PlanConfig {
    fn default() -> Self {
        Self {
            default_altitude: 150.0,
            debounce_secs: 10,
            zero_alt_kinds: vec![kind::LOITER, kind::RTL, kind::LAND, kind::TAKEOFF],
        }
    }
}

impl PlanConfig {
    /// Whether sending `kind` with altitude zero needs confirmation.
    pub fn is_zero_alt_sensitive(&self, kind: u16) -> bool {
        self.zero_alt_kinds.contains(&kind)
    }

    /// The edit-confirmation debounce window.
    pub fn debounce(&self) -> chrono::Duration {
        chrono::Duration::seconds(self.debounce_secs as i64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let cfg = PlanConfig::default();
        assert_eq!(cfg.default_altitude, 150.0);
        assert_eq!(cfg.debounce_secs, 10);
        assert!(cfg.is_zero_alt_sensitive(kind::TAKEOFF));
        assert!(cfg.is_zero_alt_sensitive(kind::LAND));
        assert!(!cfg.is_zero_alt_sensitive(kind::WAYPOINT));
    }

    #[test]
    fn partial_config_deserializes_with_defaults() {
        let cfg: PlanConfig = serde_json::from_str(r#"{"default_altitude": 80.0}"#).unwrap();
        assert_eq!(cfg.default_altitude, 80.0);
        assert_eq!(cfg.debounce_secs, 10);
    }
}
