//! The diversion window: a bounded sub-range of the main plan that can be
//! swapped for an alternate, separately edited list and spliced back in on
//! send.
//!
//! While a window `[sda_start, sda_end]` is active, the *effective* plan is
//! `waypoints[..=sda_start] ++ sda_waypoints ++ waypoints[sda_end..]`.  The
//! window has a small lifecycle: `NoWindow → WindowSelected →
//! (ServerUnconfirmed | ServerConfirmed) → NoWindow`, and every way back to
//! `NoWindow` goes through either a send or an explicit clear.

use crate::events::{EventController, EventKind, PlanEvent};
use crate::state::PlanState;
use crate::transport::Transport;
use crate::waypoint::Waypoint;
use crate::wire::PathPlanRequest;

impl PlanState {
    /// Record new splice points and ask the server for a connecting path.
    ///
    /// The actual route computation is server-side; this only owns the
    /// bounds and forwards the request with the caller-supplied buffer
    /// distance.
    pub fn set_window(
        &mut self,
        start: usize,
        end: usize,
        buffer: f64,
        transport: &dyn Transport,
        events: &EventController,
    ) {
        self.sda_start = Some(start);
        self.sda_end = Some(end);
        transport.request_path_plan(&PathPlanRequest::between(start, end, buffer));
        events.emit(PlanEvent::new(EventKind::WINDOW_CHANGED));
    }

    /// Reset the window, discard the diversion list and signal the server to
    /// drop its diversion state.
    pub fn clear_window(&mut self, transport: &dyn Transport, events: &EventController) {
        transport.clear_path_plan();
        self.reset_window();
        events.emit(PlanEvent::new(EventKind::WINDOW_CHANGED | EventKind::SDA_CHANGED));
    }

    /// Drop all window state without talking to the server.
    pub(crate) fn reset_window(&mut self) {
        self.sda_start = None;
        self.sda_end = None;
        self.sda_waypoints.clear();
        self.sda_from_server = false;
        self.selected_sda = None;
    }

    /// Flatten the plan for transmission: main list up to and including the
    /// window start, then the diversion list, then the main list from the
    /// window end.  The window is consumed — bounds, list and the
    /// server-confirmed flag are all reset.
    pub fn splice_for_send(&mut self) -> Vec<Waypoint> {
        let (start, end) = match (self.sda_start, self.sda_end) {
            (Some(s), Some(e)) => (s, e),
            _ => return std::mem::take(&mut self.sda_waypoints),
        };
        let before = self.waypoints.iter().take(start + 1).cloned();
        let diversion = self.sda_waypoints.iter().cloned();
        let after = self.waypoints.iter().skip(end).cloned();
        let spliced: Vec<Waypoint> = before.chain(diversion).chain(after).collect();
        self.reset_window();
        spliced
    }

    /// The plan as displayed when the operator views the merged form;
    /// falls back to the main list when no window is active.
    pub fn effective_plan(&self) -> Vec<Waypoint> {
        match (self.sda_start, self.sda_end) {
            (Some(start), Some(end)) if self.show_all_sda => {
                let before = self.waypoints.iter().take(start + 1).cloned();
                let diversion = self.sda_waypoints.iter().cloned();
                let after = self.waypoints.iter().skip(end).cloned();
                before.chain(diversion).chain(after).collect()
            }
            _ => self.waypoints.clone(),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Unit tests
// ─────────────────────────────────────────────────────────────────────────────
