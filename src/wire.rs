//! Wire shapes exchanged with the vehicle-control service.
//!
//! The engine treats the service as a black box: these types only pin down
//! the JSON shapes it needs from the endpoints it consumes (list snapshot,
//! single insert/update/delete, wholesale replace, diversion snapshot and
//! path-planning requests).  Reads additionally carry `min_dist`; writes do
//! not send it back.

use serde::{Deserialize, Serialize};

use crate::errors::PlanError;
use crate::waypoint::Waypoint;

/// Per-waypoint wire record.
///
/// Missing optional fields deserialize to their defaults so a sparse or
/// partially populated snapshot degrades gracefully instead of failing the
/// whole poll cycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerWaypoint {
    pub lat: f64,
    pub lon: f64,
    pub alt: f64,
    pub command: u16,
    /// Target list index on writes, server sequence position on reads.
    #[serde(default = "unassigned_index")]
    pub index: i32,
    #[serde(default)]
    pub sda: bool,
    /// Closest-approach distance; read-only, never echoed back.
    #[serde(default, skip_serializing)]
    pub min_dist: f64,
}

fn unassigned_index() -> i32 {
    -1
}

impl ServerWaypoint {
    /// Wire form of a local waypoint, with an explicit target index.
    pub fn from_waypoint(wp: &Waypoint, index: i32) -> Self {
        Self {
            lat: wp.lat,
            lon: wp.lon,
            alt: wp.alt,
            command: wp.kind,
            index,
            sda: wp.is_sda,
            min_dist: 0.0,
        }
    }
}

/// Request body for the path-planning endpoint: the two main-list indices to
/// connect, an (unused here) geofence, and a caller-supplied buffer distance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathPlanRequest {
    pub route_wp_indices: Vec<usize>,
    pub geofence: Vec<serde_json::Value>,
    pub buffer: f64,
}

impl PathPlanRequest {
    /// Request a connecting path between two main-list waypoints.
    pub fn between(start: usize, end: usize, buffer: f64) -> Self {
        Self {
            route_wp_indices: vec![start, end],
            geofence: Vec::new(),
            buffer,
        }
    }
}

/// Parse a full-list snapshot as returned by the snapshot endpoint.
///
/// A malformed body is reported as an error; the caller treats that as
/// "no change for this poll cycle".
pub fn parse_snapshot(json: &str) -> Result<Vec<ServerWaypoint>, PlanError> {
    Ok(serde_json::from_str(json)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snapshot_fills_missing_fields() {
        let wps = parse_snapshot(r#"[{"lat":1.0,"lon":2.0,"alt":100.0,"command":16}]"#).unwrap();
        assert_eq!(wps.len(), 1);
        assert_eq!(wps[0].index, -1);
        assert!(!wps[0].sda);
        assert_eq!(wps[0].min_dist, 0.0);
    }

    #[test]
    fn malformed_snapshot_is_an_error() {
        assert!(parse_snapshot("{not json").is_err());
        assert!(parse_snapshot(r#"[{"lat":"north"}]"#).is_err());
    }

    #[test]
    fn writes_do_not_carry_min_dist() {
        let wp = ServerWaypoint {
            lat: 1.0,
            lon: 2.0,
            alt: 3.0,
            command: 16,
            index: 0,
            sda: false,
            min_dist: 42.0,
        };
        let json = serde_json::to_string(&wp).unwrap();
        assert!(!json.contains("min_dist"));
    }
}
