//! Waypoint entity model.
//!
//! A [`Waypoint`] carries two parallel sets of values: the *live* fields the
//! operator edits (`alt`, `lat`, `lon`, `kind`) and the `original_*` fields
//! holding the last server-confirmed values.  A waypoint is *dirty* (has
//! unsent edits) whenever a live field differs from its `original_*`
//! counterpart, or when it is still a temp waypoint the server has never
//! seen.  `original_*` fields are only ever overwritten when the server
//! confirms that exact waypoint — never by a local edit.

use crate::wire::ServerWaypoint;

// ─────────────────────────────────────────────────────────────────────────────
// Command codes
// ─────────────────────────────────────────────────────────────────────────────

/// MAV-style command codes used for the `kind` field.
///
/// The engine only needs to distinguish a handful of semantic subtypes; every
/// other code passes through untouched.
pub mod kind {
    /// Plain navigation waypoint.
    pub const WAYPOINT: u16 = 16;
    /// Loiter indefinitely around the point.
    pub const LOITER: u16 = 17;
    /// Loiter for a number of turns.
    pub const LOITER_TURNS: u16 = 18;
    /// Loiter for a fixed time.
    pub const LOITER_TIME: u16 = 19;
    /// Return to launch.
    pub const RTL: u16 = 20;
    /// Landing point.
    pub const LAND: u16 = 21;
    /// Take-off point.
    pub const TAKEOFF: u16 = 22;
    /// Jump to another sequence item.
    pub const DO_JUMP: u16 = 177;
}

// ─────────────────────────────────────────────────────────────────────────────
// Numeric tolerance
// ─────────────────────────────────────────────────────────────────────────────

/// Compare two values under the reconciliation tolerance.
///
/// Values are close when they are exactly equal, when the reference is zero
/// and the candidate lies within 0.02 absolute, or when the relative error is
/// below 2%.  The asymmetry near zero is a fixed contract inherited from the
/// vehicle-control service, not a candidate for unification.
pub fn value_close(a: f64, b: f64) -> bool {
    if a == b {
        true
    } else if b == 0.0 {
        a.abs() < 0.02
    } else {
        ((b - a) / b).abs() < 0.02
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Waypoint
// ─────────────────────────────────────────────────────────────────────────────

/// A single flight-plan point.
#[derive(Debug, Clone, PartialEq)]
pub struct Waypoint {
    /// Created locally, not yet accepted/numbered by the server.
    pub is_temp: bool,
    /// Belongs to the diversion (SDA) window.
    pub is_sda: bool,
    /// Server-assigned sequence id, −1 while unassigned.
    pub number: i32,
    /// Command code (see [`kind`]).
    pub kind: u16,
    /// Live altitude (metres).
    pub alt: f64,
    /// Live latitude (degrees).
    pub lat: f64,
    /// Live longitude (degrees).
    pub lon: f64,
    /// Last server-confirmed command code.
    pub original_kind: u16,
    /// Last server-confirmed altitude.
    pub original_alt: f64,
    /// Last server-confirmed latitude.
    pub original_lat: f64,
    /// Last server-confirmed longitude.
    pub original_lon: f64,
    /// Position in the owning list.
    pub index: usize,
    /// Staging field for explicit renumbering from the edit UI.
    pub edit_index: usize,
    /// Closest-approach distance reported by the server (display only).
    pub min_dist: f64,
}

impl Default for Waypoint {
    fn default() -> Self {
        Self {
            is_temp: false,
            is_sda: false,
            number: -1,
            kind: kind::WAYPOINT,
            alt: 0.0,
            lat: 0.0,
            lon: 0.0,
            original_kind: kind::WAYPOINT,
            original_alt: 0.0,
            original_lat: 0.0,
            original_lon: 0.0,
            index: 0,
            edit_index: 0,
            min_dist: 0.0,
        }
    }
}

impl Waypoint {
    /// Build a confirmed waypoint from a polled server record.
    ///
    /// `index` is both the server sequence number and the list position the
    /// record lands at.  With `sda_means_temp` the server's `sda` flag is
    /// carried into `is_temp`, which is how diversion-window snapshots mark
    /// waypoints the vehicle has not committed to yet.
    pub fn from_server(wp: &ServerWaypoint, index: usize, sda_means_temp: bool) -> Self {
        Self {
            is_temp: sda_means_temp && wp.sda,
            is_sda: wp.sda,
            number: index as i32,
            kind: wp.command,
            alt: wp.alt,
            lat: wp.lat,
            lon: wp.lon,
            original_kind: wp.command,
            original_alt: wp.alt,
            original_lat: wp.lat,
            original_lon: wp.lon,
            index,
            edit_index: index,
            min_dist: wp.min_dist,
        }
    }

    /// Whether this waypoint has edits the server has not confirmed.
    pub fn is_dirty(&self) -> bool {
        self.is_temp
            || self.kind != self.original_kind
            || self.alt != self.original_alt
            || self.lat != self.original_lat
            || self.lon != self.original_lon
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Altitude interpolation
// ─────────────────────────────────────────────────────────────────────────────

/// Default altitude for a new point placed with an active diversion window.
///
/// Computes straight-line planar distances from `(lat, lon)` to the window's
/// start and end waypoints and returns the inverse-distance-weighted average
/// of their altitudes — the closer endpoint dominates.  Outside a window (or
/// with invalid bounds) the fixed `default_alt` is returned.
pub fn interpolate_altitude(
    waypoints: &[Waypoint],
    sda_start: Option<usize>,
    sda_end: Option<usize>,
    diversion: bool,
    lat: f64,
    lon: f64,
    default_alt: f64,
) -> f64 {
    if !diversion {
        return default_alt;
    }
    let (start, end) = match (sda_start, sda_end) {
        (Some(s), Some(e)) if s < waypoints.len() && e < waypoints.len() => (s, e),
        _ => return default_alt,
    };
    let d_start = ((waypoints[start].lat - lat).powi(2) + (waypoints[start].lon - lon).powi(2)).sqrt();
    let d_end = ((waypoints[end].lat - lat).powi(2) + (waypoints[end].lon - lon).powi(2)).sqrt();
    let z_start = waypoints[start].alt;
    let z_end = waypoints[end].alt;
    if d_start + d_end == 0.0 {
        // New point coincides with both endpoints.
        return (0.5 * (z_start + z_end)).abs();
    }
    ((z_start * d_end + z_end * d_start) / (d_start + d_end)).abs()
}

// ─────────────────────────────────────────────────────────────────────────────
// Unit tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn value_close_exact_and_relative() {
        assert!(value_close(100.0, 100.0));
        assert!(value_close(100.0, 101.0)); // under 2% relative
        assert!(!value_close(100.0, 105.0));
    }

    #[test]
    fn value_close_zero_is_absolute() {
        assert!(value_close(0.0, 0.0));
        assert!(value_close(0.019, 0.0));
        assert!(!value_close(0.02, 0.0));
        // The asymmetry: comparing 0.0 against a tiny non-zero reference is
        // relative, not absolute.
        assert!(!value_close(0.0, 0.019));
    }

    #[test]
    fn dirty_tracks_live_vs_original() {
        let mut wp = Waypoint {
            alt: 100.0,
            original_alt: 100.0,
            ..Waypoint::default()
        };
        assert!(!wp.is_dirty());
        wp.alt = 101.0;
        assert!(wp.is_dirty());
        wp.alt = 100.0;
        wp.is_temp = true;
        assert!(wp.is_dirty());
    }

    #[test]
    fn interpolation_outside_window_uses_default() {
        let alt = interpolate_altitude(&[], None, None, false, 1.0, 2.0, 150.0);
        assert_eq!(alt, 150.0);
    }

    #[test]
    fn interpolation_equidistant_is_mean() {
        let mut a = Waypoint::default();
        a.lat = 0.0;
        a.lon = 0.0;
        a.alt = 100.0;
        let mut b = Waypoint::default();
        b.lat = 2.0;
        b.lon = 0.0;
        b.alt = 200.0;
        let wps = vec![a, b];
        let alt = interpolate_altitude(&wps, Some(0), Some(1), true, 1.0, 0.0, 150.0);
        assert!((alt - 150.0).abs() < 1e-9, "equidistant point should average endpoint altitudes");
    }

    #[test]
    fn interpolation_closer_endpoint_dominates() {
        let mut a = Waypoint::default();
        a.alt = 100.0;
        let mut b = Waypoint::default();
        b.lat = 10.0;
        b.alt = 200.0;
        let wps = vec![a, b];
        // Point very close to the start endpoint.
        let alt = interpolate_altitude(&wps, Some(0), Some(1), true, 0.1, 0.0, 150.0);
        assert!(alt < 110.0, "start endpoint should dominate, got {alt}");
    }
}
