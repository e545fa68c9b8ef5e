//! The send coordinator: validation, risky-value confirmation and transmit
//! decisions.
//!
//! Every send is a synchronous point-in-time snapshot of current state; the
//! transport is fire-and-forget and the next poll's reconciliation is the
//! only feedback channel.  Validation failures and refused confirmations
//! leave state unchanged and surface as warning events.

use crate::confirm::{ConfirmPrompt, Confirmer};
use crate::config::PlanConfig;
use crate::errors::validate;
use crate::events::{EventController, EventKind, PlanEvent, SentMeta};
use crate::state::PlanState;
use crate::transport::Transport;
use crate::waypoint::Waypoint;
use crate::wire::ServerWaypoint;

/// Collaborators a send operation needs, bundled to keep signatures flat.
pub struct SendContext<'a> {
    pub transport: &'a dyn Transport,
    pub confirmer: &'a dyn Confirmer,
    pub events: &'a EventController,
    pub config: &'a PlanConfig,
}

/// Server insertion index for a temp waypoint at `row`: the nearest already
/// confirmed predecessor's number plus one (1 when there is none).
fn insert_index(waypoints: &[Waypoint], mut row: usize) -> i32 {
    loop {
        if row == 0 {
            return 1;
        }
        if !waypoints[row].is_temp {
            return waypoints[row].number + 1;
        }
        row -= 1;
    }
}

/// Whether any waypoint in the slice trips the zero-altitude gate.
fn zero_alt_flagged(waypoints: &[Waypoint], config: &PlanConfig) -> bool {
    waypoints
        .iter()
        .any(|wp| config.is_zero_alt_sensitive(wp.kind) && wp.alt == 0.0)
}

fn sent_event(count: usize, extra: EventKind) -> PlanEvent {
    let mut evt = PlanEvent::new(EventKind::SENT | extra);
    evt.sent = Some(SentMeta { count });
    evt
}

impl PlanState {
    /// Transmit the currently selected main-list waypoint.
    ///
    /// No-op with a warning when nothing is selected (silent under `quiet`),
    /// a silent no-op when the waypoint has no unsent edits, and aborted
    /// with a warning when validation fails or a required zero-altitude
    /// confirmation is refused.
    pub fn send_one(&mut self, ctx: &SendContext, quiet: bool) {
        let Some(row) = self.selected_row else {
            if !quiet {
                ctx.events.warn("No waypoint selected");
            }
            return;
        };
        if self.transmit_row(ctx, row) {
            ctx.events.emit(sent_event(1, EventKind::NONE));
        }
    }

    /// Transmit the waypoint at `row` if it carries unsent edits.
    ///
    /// Returns whether anything was handed to the transport.  Clean rows are
    /// skipped silently; validation failures and refused zero-altitude
    /// confirmations warn and skip.
    fn transmit_row(&self, ctx: &SendContext, row: usize) -> bool {
        let Some(wp) = self.waypoints.get(row) else {
            return false;
        };
        if !wp.is_dirty() {
            // Nothing to send.
            return false;
        }
        if let Err(err) = validate(wp.alt, wp.lat, wp.lon) {
            ctx.events.warn(err.to_string());
            return false;
        }
        if ctx.config.is_zero_alt_sensitive(wp.kind)
            && wp.alt == 0.0
            && !ctx.confirmer.confirm(ConfirmPrompt::ZeroAltitude)
        {
            ctx.events.warn("Waypoint was not sent");
            return false;
        }

        if wp.is_temp {
            let index = if row == 0 { 0 } else { insert_index(&self.waypoints, row) };
            ctx.transport.send_waypoint(&ServerWaypoint::from_waypoint(wp, index));
        } else {
            // Temp waypoints do not yet occupy a server slot, so the update
            // index is the row position net of the temps preceding it.
            let preceding_temps = self.waypoints[..row].iter().filter(|w| w.is_temp).count();
            let index = (row - preceding_temps) as i32;
            ctx.transport.update_waypoint(&ServerWaypoint::from_waypoint(wp, index));
        }
        true
    }

    /// Quietly push unsent edits on every confirmed main-list row.
    ///
    /// Runs after a group translation so the moved rows reach the vehicle
    /// without a separate operator action; rows without edits are skipped.
    pub(crate) fn send_dirty(&mut self, ctx: &SendContext) {
        let mut count = 0;
        for row in 0..self.waypoints.len() {
            if self.waypoints[row].is_temp {
                continue;
            }
            if self.transmit_row(ctx, row) {
                count += 1;
            }
        }
        if count > 0 {
            ctx.events.emit(sent_event(count, EventKind::NONE));
        }
    }

    /// Ask the vehicle to make the selected waypoint its current target.
    ///
    /// Warns when nothing is selected or when the selection is a temp row
    /// the vehicle does not know about yet.
    pub fn set_current(&self, ctx: &SendContext) {
        let Some(row) = self.selected_row else {
            ctx.events.warn("No waypoint selected");
            return;
        };
        let Some(wp) = self.waypoints.get(row) else {
            return;
        };
        if wp.is_temp {
            ctx.events.warn("Can't set a temp waypoint to current");
            return;
        }
        ctx.transport.set_current(wp.number);
    }

    /// Transmit the whole main list as a batch.
    ///
    /// One zero-altitude prompt covers all flagged waypoints.  Temp
    /// waypoints are stripped from local state afterwards: a bulk send
    /// implies a full server-side replace, and the stripped rows come back
    /// confirmed on the next poll.
    pub fn send_all(&mut self, ctx: &SendContext) {
        if zero_alt_flagged(&self.waypoints, ctx.config)
            && !ctx.confirmer.confirm(ConfirmPrompt::ZeroAltitude)
        {
            ctx.events.warn("Waypoints were not sent");
            return;
        }
        let wire: Vec<ServerWaypoint> = self
            .waypoints
            .iter()
            .map(|wp| ServerWaypoint::from_waypoint(wp, wp.index as i32))
            .collect();
        let count = wire.len();
        ctx.transport.send_batch(&wire);
        self.waypoints.retain(|wp| !wp.is_temp);
        self.renumber();
        ctx.events.emit(sent_event(count, EventKind::PLAN_CHANGED));
    }

    /// Transmit the diversion window.
    ///
    /// The branch cascade, in order: nothing to send; a manual-only path
    /// that is not contiguous; diversion waypoints without a selected
    /// window; a server-unconfirmed window (zero-altitude gate, then splice
    /// and send); an already confirmed window (same); a degenerate
    /// single-waypoint main list (send the diversion list directly).
    pub fn send_all_diversion(&mut self, ctx: &SendContext) {
        let non_temp_sda = self.sda_waypoints.iter().filter(|wp| !wp.is_temp).count();
        let non_temp_main = self.waypoints.iter().filter(|wp| !wp.is_temp).count();

        if self.sda_waypoints.is_empty() {
            ctx.events.warn("No SDA waypoints to send");
            return;
        }
        if let (Some(start), Some(end)) = (self.sda_start, self.sda_end) {
            if end > start + 1 && non_temp_sda == 0 {
                ctx.events.warn("Manual-only SDA paths must consist of a single path");
                return;
            }
        }
        if (self.sda_start.is_none() || self.sda_end.is_none()) && non_temp_main > 0 {
            ctx.events.warn("Please select an SDA path before sending");
            return;
        }
        if !self.sda_from_server {
            self.splice_and_send(ctx);
            return;
        }
        if let (Some(_), Some(end)) = (self.sda_start, self.sda_end) {
            if end >= 1 {
                self.splice_and_send(ctx);
                return;
            }
        }
        if self.waypoints.len() <= 1 {
            let wire: Vec<ServerWaypoint> = self
                .sda_waypoints
                .iter()
                .map(|wp| ServerWaypoint::from_waypoint(wp, wp.index as i32))
                .collect();
            ctx.transport.send_batch(&wire);
            self.sda_waypoints.clear();
            ctx.events.emit(sent_event(wire.len(), EventKind::SDA_CHANGED));
            return;
        }
        ctx.events.warn("No start and end points selected");
    }

    /// Zero-altitude gate, then splice the window into the main list and
    /// transmit the flattened batch.  The window is consumed on success.
    fn splice_and_send(&mut self, ctx: &SendContext) {
        if zero_alt_flagged(&self.sda_waypoints, ctx.config)
            && !ctx.confirmer.confirm(ConfirmPrompt::ZeroAltitude)
        {
            ctx.events.warn("Waypoints were not sent");
            return;
        }
        let spliced = self.splice_for_send();
        let wire: Vec<ServerWaypoint> = spliced
            .iter()
            .enumerate()
            .map(|(i, wp)| ServerWaypoint::from_waypoint(wp, i as i32))
            .collect();
        ctx.transport.send_batch(&wire);
        ctx.events.emit(sent_event(
            wire.len(),
            EventKind::WINDOW_CHANGED | EventKind::SDA_CHANGED,
        ));
    }

    /// Delete the current selection.
    ///
    /// A selected diversion row is removed locally (the server-confirmed
    /// flag drops when the list empties).  A selected main-list row is
    /// removed locally, with a server delete by number first when it is
    /// confirmed.  A rectangle selection is processed in descending index
    /// order the same way.  All survivors are renumbered by position.
    pub fn delete(&mut self, ctx: &SendContext) {
        if self.selected_wps.is_empty() {
            if let Some(i) = self.selected_sda {
                if i < self.sda_waypoints.len() {
                    self.sda_waypoints.remove(i);
                    if self.sda_waypoints.is_empty() {
                        self.sda_from_server = false;
                    }
                    self.selected_sda = None;
                    self.renumber();
                    ctx.events.emit(PlanEvent::new(EventKind::DELETED | EventKind::SDA_CHANGED));
                }
                return;
            }
        }
        if let Some(row) = self.selected_row {
            let Some(wp) = self.waypoints.get(row) else {
                return;
            };
            if !wp.is_temp {
                ctx.transport.delete_waypoint(wp.number);
            }
            self.waypoints.remove(row);
            self.selected_row = None;
            self.selected_wps.clear();
            self.renumber();
            ctx.events.emit(PlanEvent::new(EventKind::DELETED | EventKind::PLAN_CHANGED));
            return;
        }
        if !self.selected_wps.is_empty() {
            let mut targets = self.selected_wps.clone();
            targets.sort_unstable();
            for &i in targets.iter().rev() {
                let Some(wp) = self.waypoints.get(i) else {
                    continue;
                };
                if !wp.is_temp {
                    ctx.transport.delete_waypoint(wp.number);
                }
                self.waypoints.remove(i);
            }
            self.selected_wps.clear();
            self.selected_row = None;
            self.renumber();
            ctx.events.emit(PlanEvent::new(EventKind::DELETED | EventKind::PLAN_CHANGED));
            return;
        }
        ctx.events.warn("No waypoint selected");
    }

    /// Replace the entire flight plan with an externally supplied one.
    ///
    /// Every waypoint is validated first and the operator confirms the
    /// replacement once; the local list is cleared and repopulated by the
    /// next poll.
    pub fn replace_plan(&mut self, ctx: &SendContext, plan: &[ServerWaypoint]) {
        for wp in plan {
            if let Err(err) = validate(wp.alt, wp.lat, wp.lon) {
                ctx.events.warn(err.to_string());
                return;
            }
        }
        if !ctx.confirmer.confirm(ConfirmPrompt::ReplacePlan) {
            ctx.events.warn("Flight plan was not replaced");
            return;
        }
        ctx.transport.replace_all(plan);
        self.waypoints.clear();
        self.selected_row = None;
        self.selected_wps.clear();
        ctx.events.emit(sent_event(plan.len(), EventKind::PLAN_CHANGED));
    }
}
