//! The owned mutable state aggregate for the flight plan.
//!
//! [`PlanState`] is created once at session start and mutated exclusively
//! through the operations defined across this crate ([`crate::reconcile`],
//! [`crate::selection`], [`crate::overlay`], [`crate::send`] and the basic
//! edit operations below).  Order of `waypoints` is meaningful: it encodes
//! vehicle execution order.

use chrono::{DateTime, Utc};

use crate::config::PlanConfig;
use crate::waypoint::{interpolate_altitude, kind, Waypoint};

/// Which editable cell a table edit targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellField {
    Alt,
    Lat,
    Lon,
    Kind,
    EditIndex,
}

/// Value for a cell edit, matching [`CellField`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CellValue {
    Number(f64),
    Kind(u16),
    Index(usize),
}

/// Aggregate state of the flight-plan editor.
#[derive(Debug, Clone, Default)]
pub struct PlanState {
    /// The main flight plan, in vehicle execution order.
    pub waypoints: Vec<Waypoint>,
    /// Working copy of the diversion window, edited independently.
    pub sda_waypoints: Vec<Waypoint>,
    /// Splice start index into `waypoints`, `None` when no window is active.
    pub sda_start: Option<usize>,
    /// Splice end index into `waypoints`.
    pub sda_end: Option<usize>,
    /// Whether the current diversion waypoints were already accepted and
    /// numbered by the server (controls resend semantics).
    pub sda_from_server: bool,
    /// Selected row in the main list.
    pub selected_row: Option<usize>,
    /// Selected row in the diversion list.
    pub selected_sda: Option<usize>,
    /// Main-list indices caught by the last rectangle selection.
    pub selected_wps: Vec<usize>,
    /// Time of the last confirmed risky edit (debounce anchor).
    pub last_change: Option<DateTime<Utc>>,
    /// Index of the waypoint the vehicle is currently flying toward.
    pub current_waypoint: usize,
    /// How many times the current waypoint has advanced this session.
    pub waypoints_completed: u32,
    /// When set, newly added points go to the diversion list.
    pub sda_mode: bool,
    /// Display the merged (spliced) form of the plan.
    pub show_all_sda: bool,
}

impl PlanState {
    /// Fresh, empty session state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a diversion window is currently active.
    pub fn window_active(&self) -> bool {
        self.sda_start.is_some() && self.sda_end.is_some()
    }

    /// Reassign every waypoint's `index` to its list position.
    pub fn renumber(&mut self) {
        for (i, wp) in self.waypoints.iter_mut().enumerate() {
            wp.index = i;
        }
        for (i, wp) in self.sda_waypoints.iter_mut().enumerate() {
            wp.index = i;
        }
    }

    /// Add a locally created temp waypoint at `(lat, lon)`.
    ///
    /// Non-finite inputs are coerced to 0 rather than rejected — the point
    /// can still be dragged into place afterwards.  Altitude defaults via
    /// the window interpolation rule.  The point goes to the diversion list
    /// when `sda_mode` is on.
    pub fn add_temp(&mut self, lat: f64, lon: f64, config: &PlanConfig) {
        let lat = if lat.is_finite() { lat } else { 0.0 };
        let lon = if lon.is_finite() { lon } else { 0.0 };
        let alt = interpolate_altitude(
            &self.waypoints,
            self.sda_start,
            self.sda_end,
            self.sda_mode,
            lat,
            lon,
            config.default_altitude,
        );
        let target_len = if self.sda_mode {
            self.sda_waypoints.len()
        } else {
            self.waypoints.len()
        };
        let wp = Waypoint {
            is_temp: true,
            is_sda: self.sda_mode,
            kind: kind::WAYPOINT,
            alt,
            lat,
            lon,
            original_kind: kind::WAYPOINT,
            original_lat: lat,
            original_lon: lon,
            index: target_len,
            edit_index: target_len,
            ..Waypoint::default()
        };
        if self.sda_mode {
            self.sda_waypoints.push(wp);
        } else {
            self.waypoints.push(wp);
        }
    }

    /// Move one element from `from` to `to` (clamped to the list end) and
    /// reassign every element's `index` to its new position.
    ///
    /// Applying the inverse move restores the original order and indices.
    pub fn reorder(&mut self, sda: bool, from: usize, to: usize) {
        let list = if sda { &mut self.sda_waypoints } else { &mut self.waypoints };
        if from >= list.len() {
            return;
        }
        let to = to.min(list.len() - 1);
        let wp = list.remove(from);
        list.insert(to, wp);
        for (i, wp) in list.iter_mut().enumerate() {
            wp.index = i;
        }
        // A reorder invalidates single-row selections.
        self.selected_row = None;
        self.selected_sda = None;
    }

    /// Edit a single cell, broadcasting altitude edits across a rectangle
    /// selection when the edited row is part of it.
    pub fn update_cell(&mut self, sda: bool, index: usize, field: CellField, value: CellValue) {
        let group = !sda
            && field == CellField::Alt
            && !self.selected_wps.is_empty()
            && self.selected_wps.contains(&index);
        if group {
            if let CellValue::Number(alt) = value {
                for &i in &self.selected_wps {
                    if let Some(wp) = self.waypoints.get_mut(i) {
                        wp.alt = alt;
                    }
                }
            }
            return;
        }
        let list = if sda { &mut self.sda_waypoints } else { &mut self.waypoints };
        let Some(wp) = list.get_mut(index) else { return };
        match (field, value) {
            (CellField::Alt, CellValue::Number(v)) => wp.alt = v,
            (CellField::Lat, CellValue::Number(v)) => wp.lat = v,
            (CellField::Lon, CellValue::Number(v)) => wp.lon = v,
            (CellField::Kind, CellValue::Kind(k)) => wp.kind = k,
            (CellField::EditIndex, CellValue::Index(i)) => wp.edit_index = i,
            _ => {}
        }
    }

    /// Move a waypoint to `(lat, lon)`.
    ///
    /// When the row belongs to the rectangle selection the whole selection is
    /// translated by the same delta, keeping relative offsets intact.
    pub fn update_lat_lon(&mut self, sda: bool, index: usize, lat: f64, lon: f64) {
        let group = !sda && !self.selected_wps.is_empty() && self.selected_wps.contains(&index);
        if group {
            let Some(anchor) = self.waypoints.get(index) else { return };
            let d_lat = lat - anchor.lat;
            let d_lon = lon - anchor.lon;
            for &i in &self.selected_wps.clone() {
                if let Some(wp) = self.waypoints.get_mut(i) {
                    wp.lat += d_lat;
                    wp.lon += d_lon;
                }
            }
            return;
        }
        let list = if sda { &mut self.sda_waypoints } else { &mut self.waypoints };
        if let Some(wp) = list.get_mut(index) {
            wp.lat = lat;
            wp.lon = lon;
        }
    }

    /// Drop all unsent temp waypoints from the main list.
    pub fn clear_temp(&mut self) {
        self.waypoints.retain(|wp| !wp.is_temp);
        self.renumber();
    }

    /// Record the vehicle's reported current waypoint.
    ///
    /// Returns `true` when it advanced.
    pub fn receive_current(&mut self, current: usize) -> bool {
        let changed = self.current_waypoint != current;
        if changed {
            self.waypoints_completed += 1;
        }
        self.current_waypoint = current;
        changed
    }

    /// Zero the completed-waypoint counter, typically when the embedding
    /// archives a finished flight.
    pub fn reset_completed(&mut self) {
        self.waypoints_completed = 0;
    }

    /// Splice externally generated points into the plan right after the
    /// current waypoint, as unsent temp waypoints.
    pub fn insert_generated(&mut self, points: &[(f64, f64, f64)]) {
        let at = (self.current_waypoint + 1).min(self.waypoints.len());
        let new_wps = points.iter().map(|&(lat, lon, alt)| Waypoint {
            is_temp: true,
            kind: kind::WAYPOINT,
            alt,
            lat,
            lon,
            original_kind: kind::WAYPOINT,
            original_alt: alt,
            original_lat: lat,
            original_lon: lon,
            ..Waypoint::default()
        });
        self.waypoints.splice(at..at, new_wps);
        self.renumber();
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Unit tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn confirmed(lat: f64, lon: f64, number: i32) -> Waypoint {
        Waypoint {
            number,
            lat,
            lon,
            original_lat: lat,
            original_lon: lon,
            alt: 100.0,
            original_alt: 100.0,
            index: number as usize,
            edit_index: number as usize,
            ..Waypoint::default()
        }
    }

    #[test]
    fn add_temp_coerces_non_finite_inputs() {
        let mut state = PlanState::new();
        state.add_temp(f64::NAN, 5.0, &PlanConfig::default());
        assert_eq!(state.waypoints.len(), 1);
        assert_eq!(state.waypoints[0].lat, 0.0);
        assert_eq!(state.waypoints[0].lon, 5.0);
        assert!(state.waypoints[0].is_temp);
        assert_eq!(state.waypoints[0].alt, 150.0);
    }

    #[test]
    fn add_temp_targets_sda_list_in_sda_mode() {
        let mut state = PlanState::new();
        state.sda_mode = true;
        state.add_temp(1.0, 2.0, &PlanConfig::default());
        assert!(state.waypoints.is_empty());
        assert_eq!(state.sda_waypoints.len(), 1);
        assert!(state.sda_waypoints[0].is_sda);
        assert_eq!(state.sda_waypoints[0].index, 0);
    }

    #[test]
    fn reorder_roundtrip_restores_order_and_indices() {
        let mut state = PlanState::new();
        state.waypoints = vec![confirmed(0.0, 0.0, 0), confirmed(1.0, 1.0, 1), confirmed(2.0, 2.0, 2)];
        let original = state.waypoints.clone();
        state.reorder(false, 0, 2);
        assert_eq!(state.waypoints[2].number, 0);
        assert_eq!(state.waypoints[2].index, 2);
        state.reorder(false, 2, 0);
        assert_eq!(state.waypoints, original);
    }

    #[test]
    fn reorder_clamps_past_end() {
        let mut state = PlanState::new();
        state.waypoints = vec![confirmed(0.0, 0.0, 0), confirmed(1.0, 1.0, 1)];
        state.reorder(false, 0, 99);
        assert_eq!(state.waypoints[1].number, 0);
    }

    #[test]
    fn group_altitude_edit_broadcasts() {
        let mut state = PlanState::new();
        state.waypoints = vec![confirmed(0.0, 0.0, 0), confirmed(1.0, 1.0, 1), confirmed(2.0, 2.0, 2)];
        state.selected_wps = vec![0, 2];
        state.update_cell(false, 0, CellField::Alt, CellValue::Number(75.0));
        assert_eq!(state.waypoints[0].alt, 75.0);
        assert_eq!(state.waypoints[1].alt, 100.0, "unselected row must not change");
        assert_eq!(state.waypoints[2].alt, 75.0);
        // Originals untouched: the edit is unsent.
        assert_eq!(state.waypoints[0].original_alt, 100.0);
    }

    #[test]
    fn group_drag_translates_selection() {
        let mut state = PlanState::new();
        state.waypoints = vec![confirmed(10.0, 10.0, 0), confirmed(11.0, 10.0, 1)];
        state.selected_wps = vec![0, 1];
        state.update_lat_lon(false, 0, 10.5, 10.25);
        assert_eq!(state.waypoints[0].lat, 10.5);
        assert_eq!(state.waypoints[0].lon, 10.25);
        // Relative offset preserved.
        assert_eq!(state.waypoints[1].lat, 11.5);
        assert_eq!(state.waypoints[1].lon, 10.25);
    }

    #[test]
    fn receive_current_counts_advances() {
        let mut state = PlanState::new();
        assert!(!state.receive_current(0));
        assert!(state.receive_current(1));
        assert!(state.receive_current(2));
        assert_eq!(state.waypoints_completed, 2);
    }

    #[test]
    fn insert_generated_splices_after_current() {
        let mut state = PlanState::new();
        state.waypoints = vec![confirmed(0.0, 0.0, 0), confirmed(1.0, 1.0, 1)];
        state.current_waypoint = 0;
        state.insert_generated(&[(5.0, 6.0, 90.0)]);
        assert_eq!(state.waypoints.len(), 3);
        assert!(state.waypoints[1].is_temp);
        assert_eq!(state.waypoints[1].lat, 5.0);
        assert_eq!(state.waypoints[2].index, 2);
    }
}
