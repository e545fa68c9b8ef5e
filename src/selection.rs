//! Selection tracking and the guarded edit confirmation.
//!
//! Three selection channels exist: a single main-list row, a single
//! diversion-list row, and a rectangle (lasso) set over the main list.  The
//! two single-item channels are mutually exclusive, and any single-item
//! selection clears the rectangle set.
//!
//! Selecting an already confirmed main-list waypoint is safety-sensitive —
//! the edit that follows can move a vehicle in flight — so it goes through a
//! debounced confirmation: inside the debounce window the selection is
//! granted silently as a continuation of the same editing session, outside
//! it the operator must confirm explicitly.

use chrono::{DateTime, Duration, Utc};

use crate::confirm::{ConfirmPrompt, Confirmer};
use crate::state::PlanState;

/// Result of a guarded selection attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectOutcome {
    /// The selection was applied.
    Accepted,
    /// The operator refused; nothing changed.
    Rejected,
}

impl PlanState {
    /// Select a main-list row unconditionally (table click on a temp row,
    /// keyboard navigation, …).  Clears the other channels.
    pub fn select_row(&mut self, index: Option<usize>) {
        self.selected_row = index;
        self.selected_sda = None;
        self.selected_wps.clear();
    }

    /// Select a diversion-list row unconditionally.  Clears the other
    /// channels.
    pub fn select_sda(&mut self, index: Option<usize>) {
        self.selected_sda = index;
        self.selected_row = None;
        self.selected_wps.clear();
    }

    /// Guarded selection of row `index` for subsequent editing.
    ///
    /// Diversion rows and temp rows are not yet live on the vehicle and
    /// select freely.  A confirmed main-list row is granted silently when
    /// the last confirmed risky edit is younger than `debounce`, otherwise
    /// the injected [`Confirmer`] is asked.  Acceptance refreshes the
    /// debounce anchor; refusal changes nothing.
    pub fn confirm_select(
        &mut self,
        index: usize,
        is_sda: bool,
        confirmer: &dyn Confirmer,
        now: DateTime<Utc>,
        debounce: Duration,
    ) -> SelectOutcome {
        if is_sda {
            self.select_sda(Some(index));
            return SelectOutcome::Accepted;
        }
        if self.waypoints.get(index).map(|wp| wp.is_temp).unwrap_or(false) {
            self.select_row(Some(index));
            return SelectOutcome::Accepted;
        }
        let within_debounce = self
            .last_change
            .map(|t| now - t < debounce)
            .unwrap_or(false);
        if within_debounce || confirmer.confirm(ConfirmPrompt::EditOnboardWaypoint) {
            self.last_change = Some(now);
            self.select_row(Some(index));
            SelectOutcome::Accepted
        } else {
            SelectOutcome::Rejected
        }
    }

    /// Rectangle/lasso selection over the main list.
    ///
    /// Collects the non-temp waypoints whose coordinates satisfy the
    /// injected containment predicate.  Row 0 (the home position) is never
    /// part of a rectangle selection.  Requires no confirmation — that is
    /// deferred to the send or edit operation that follows.
    pub fn select_area(&mut self, contains: &dyn Fn(f64, f64) -> bool) {
        self.selected_wps = self
            .waypoints
            .iter()
            .skip(1)
            .filter(|wp| !wp.is_temp && contains(wp.lat, wp.lon))
            .map(|wp| wp.index)
            .collect();
    }

    /// Clear the rectangle set and the main-list selection.
    pub fn clear_area_selection(&mut self) {
        self.selected_wps.clear();
        self.selected_row = None;
    }

    /// Move the single-item selection one row down, clamped to the list end.
    /// Starts at the top when nothing is selected.
    pub fn increment_selection(&mut self, is_sda: bool) {
        let (list_len, current) = if is_sda {
            (self.sda_waypoints.len(), self.selected_sda)
        } else {
            (self.waypoints.len(), self.selected_row)
        };
        if list_len == 0 {
            return;
        }
        let next = current.map(|i| i + 1).unwrap_or(0).min(list_len - 1);
        if is_sda {
            self.select_sda(Some(next));
        } else {
            self.select_row(Some(next));
        }
    }

    /// Move the single-item selection one row up, clamped to the top.
    /// Starts at the bottom when nothing is selected.
    pub fn decrement_selection(&mut self, is_sda: bool) {
        let (list_len, current) = if is_sda {
            (self.sda_waypoints.len(), self.selected_sda)
        } else {
            (self.waypoints.len(), self.selected_row)
        };
        if list_len == 0 {
            return;
        }
        let prev = match current {
            None => list_len - 1,
            Some(0) => 0,
            Some(i) => i - 1,
        };
        if is_sda {
            self.select_sda(Some(prev));
        } else {
            self.select_row(Some(prev));
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Unit tests
// ─────────────────────────────────────────────────────────────────────────────
