//! The plan engine: a single dispatch loop over the owned state aggregate.
//!
//! [`PlanEngine`] owns the [`PlanState`] exclusively.  Commands arrive on
//! one channel from both the poll timer and operator actions, and each is
//! applied as a single atomic state transition — an operator action never
//! observes a partially reconciled list.  Changes are announced through the
//! [`EventController`] so views can redraw only when something actually
//! happened; the reconciler's same-allocation no-op contract is what makes
//! that cheap to detect.

use std::sync::mpsc::Receiver;

use chrono::Utc;

use crate::commands::{PlanCommand, PlanSink};
use crate::config::PlanConfig;
use crate::confirm::Confirmer;
use crate::events::{EventController, EventKind, PlanEvent, SelectionMeta};
use crate::reconcile::{reconcile, reconcile_sda};
use crate::selection::SelectOutcome;
use crate::send::SendContext;
use crate::state::PlanState;
use crate::transport::Transport;

/// Owns the plan state and applies commands to it.
pub struct PlanEngine {
    state: PlanState,
    config: PlanConfig,
    transport: Box<dyn Transport>,
    confirmer: Box<dyn Confirmer>,
    events: EventController,
    rx: Receiver<PlanCommand>,
}

impl PlanEngine {
    /// Create an engine with its command sink.
    pub fn new(
        config: PlanConfig,
        transport: Box<dyn Transport>,
        confirmer: Box<dyn Confirmer>,
    ) -> (Self, PlanSink) {
        let (sink, rx) = crate::commands::channel();
        let engine = Self {
            state: PlanState::new(),
            config,
            transport,
            confirmer,
            events: EventController::new(),
            rx,
        };
        (engine, sink)
    }

    /// Read access to the current state.
    pub fn state(&self) -> &PlanState {
        &self.state
    }

    /// The event controller; clone it and subscribe to observe changes.
    pub fn events(&self) -> EventController {
        self.events.clone()
    }

    /// Drain and apply all queued commands.  Returns how many were applied.
    pub fn process_pending(&mut self) -> usize {
        let mut applied = 0;
        while let Ok(cmd) = self.rx.try_recv() {
            self.apply(cmd);
            applied += 1;
        }
        applied
    }

    fn emit_selection(&self) {
        let mut evt = PlanEvent::new(EventKind::SELECTION_CHANGED);
        evt.selection = Some(SelectionMeta {
            row: self.state.selected_row,
            sda: self.state.selected_sda,
            area: self.state.selected_wps.len(),
        });
        self.events.emit(evt);
    }

    fn emit_list_changed(&self, sda: bool) {
        let kind = if sda { EventKind::SDA_CHANGED } else { EventKind::PLAN_CHANGED };
        self.events.emit(PlanEvent::new(kind));
    }

    /// Apply a single command as one atomic state transition.
    pub fn apply(&mut self, cmd: PlanCommand) {
        let ctx = SendContext {
            transport: self.transport.as_ref(),
            confirmer: self.confirmer.as_ref(),
            events: &self.events,
            config: &self.config,
        };
        match cmd {
            PlanCommand::AddTemp { lat, lon } => {
                let sda = self.state.sda_mode;
                self.state.add_temp(lat, lon, &self.config);
                self.emit_list_changed(sda);
            }
            PlanCommand::UpdateCell { sda, index, field, value } => {
                self.state.update_cell(sda, index, field, value);
                self.emit_list_changed(sda);
            }
            PlanCommand::UpdateLatLon { sda, index, lat, lon } => {
                let group = !sda && self.state.selected_wps.contains(&index);
                self.state.update_lat_lon(sda, index, lat, lon);
                if group {
                    // A group drag moves confirmed rows; push the edits out
                    // right away instead of waiting for an explicit send.
                    self.state.send_dirty(&ctx);
                }
                self.emit_list_changed(sda);
            }
            PlanCommand::Reorder { sda, from, to } => {
                self.state.reorder(sda, from, to);
                self.emit_list_changed(sda);
            }
            PlanCommand::Select { index } => {
                self.state.select_row(index);
                self.emit_selection();
            }
            PlanCommand::SelectSda { index } => {
                self.state.select_sda(index);
                self.emit_selection();
            }
            PlanCommand::ConfirmSelect { index, sda } => {
                let outcome = self.state.confirm_select(
                    index,
                    sda,
                    self.confirmer.as_ref(),
                    Utc::now(),
                    self.config.debounce(),
                );
                if outcome == SelectOutcome::Accepted {
                    self.emit_selection();
                }
            }
            PlanCommand::SelectArea { contains } => {
                self.state.select_area(&*contains);
                self.emit_selection();
            }
            PlanCommand::ClearAreaSelection => {
                self.state.clear_area_selection();
                self.emit_selection();
            }
            PlanCommand::IncrementSelection { sda } => {
                self.state.increment_selection(sda);
                self.emit_selection();
            }
            PlanCommand::DecrementSelection { sda } => {
                self.state.decrement_selection(sda);
                self.emit_selection();
            }
            PlanCommand::SetSdaMode(on) => {
                self.state.sda_mode = on;
            }
            PlanCommand::SetShowAllSda(show) => {
                self.state.show_all_sda = show;
            }
            PlanCommand::SetWindow { start, end, buffer } => {
                self.state.set_window(start, end, buffer, self.transport.as_ref(), &self.events);
            }
            PlanCommand::ClearWindow => {
                self.state.clear_window(self.transport.as_ref(), &self.events);
            }
            PlanCommand::SendOne { quiet } => {
                self.state.send_one(&ctx, quiet);
            }
            PlanCommand::SendAll => {
                self.state.send_all(&ctx);
            }
            PlanCommand::SendAllDiversion => {
                self.state.send_all_diversion(&ctx);
            }
            PlanCommand::Delete => {
                self.state.delete(&ctx);
            }
            PlanCommand::SetCurrent => {
                self.state.set_current(&ctx);
            }
            PlanCommand::ClearTemp => {
                self.state.clear_temp();
                self.emit_list_changed(false);
            }
            PlanCommand::ReplacePlan(plan) => {
                self.state.replace_plan(&ctx, &plan);
            }
            PlanCommand::InsertGenerated(points) => {
                self.state.insert_generated(&points);
                self.emit_list_changed(false);
            }
            PlanCommand::ReceiveSnapshot(snapshot) => {
                let local = std::mem::take(&mut self.state.waypoints);
                let prev_ptr = local.as_ptr();
                let merged = reconcile(local, &snapshot);
                let changed = merged.as_ptr() != prev_ptr;
                self.state.waypoints = merged;
                if changed {
                    self.emit_list_changed(false);
                }
            }
            PlanCommand::ReceiveSdaSnapshot(snapshot) => {
                // An empty snapshot carries no information; skipping it also
                // leaves the server-confirmed flag alone.
                if snapshot.is_empty() {
                    return;
                }
                self.state.sda_from_server = true;
                let local = std::mem::take(&mut self.state.sda_waypoints);
                let prev_ptr = local.as_ptr();
                let merged = reconcile_sda(local, &snapshot);
                let changed = merged.as_ptr() != prev_ptr;
                self.state.sda_waypoints = merged;
                if changed {
                    self.emit_list_changed(true);
                }
            }
            PlanCommand::ReceiveCurrent(current) => {
                if self.state.receive_current(current) {
                    self.events.emit(PlanEvent::new(EventKind::CURRENT_CHANGED));
                }
            }
            PlanCommand::ResetCompleted => {
                self.state.reset_completed();
            }
        }
    }
}
