//! Command types and the channel used to drive the engine.
//!
//! Every mutation of the plan state — operator actions and poll results
//! alike — is expressed as one [`PlanCommand`] variant and applied by the
//! engine's single dispatch function.  A cloneable [`PlanSink`] feeds
//! commands over an mpsc channel from UI callbacks, the poll timer, or
//! anything else; the engine drains them one at a time, so state
//! transitions are atomic with respect to each other.

use std::sync::mpsc::{Receiver, Sender};

use crate::state::{CellField, CellValue};
use crate::wire::ServerWaypoint;

/// Injected containment test for rectangle/lasso selection.
///
/// The engine has no geometry dependency; the map widget supplies whatever
/// bounds test it already has.
pub type BoundsPredicate = Box<dyn Fn(f64, f64) -> bool + Send + 'static>;

/// One operation on the plan state.
pub enum PlanCommand {
    /// Place a new unsent temp waypoint (diversion list when sda-mode is on).
    AddTemp { lat: f64, lon: f64 },
    /// Edit one table cell, with group broadcast over a rectangle selection.
    UpdateCell { sda: bool, index: usize, field: CellField, value: CellValue },
    /// Move a waypoint (or a whole rectangle selection) to new coordinates.
    UpdateLatLon { sda: bool, index: usize, lat: f64, lon: f64 },
    /// Move one row and renumber.
    Reorder { sda: bool, from: usize, to: usize },
    /// Unconditional main-list selection.
    Select { index: Option<usize> },
    /// Unconditional diversion-list selection.
    SelectSda { index: Option<usize> },
    /// Guarded selection with the on-board-edit confirmation.
    ConfirmSelect { index: usize, sda: bool },
    /// Rectangle selection over the main list.
    SelectArea { contains: BoundsPredicate },
    /// Drop the rectangle selection and main-list selection.
    ClearAreaSelection,
    IncrementSelection { sda: bool },
    DecrementSelection { sda: bool },
    /// Route newly added points to the diversion list.
    SetSdaMode(bool),
    /// Display the merged (spliced) form of the plan.
    SetShowAllSda(bool),
    /// Activate a diversion window and request a connecting path.
    SetWindow { start: usize, end: usize, buffer: f64 },
    /// Drop the diversion window locally and server-side.
    ClearWindow,
    /// Transmit the selected waypoint.
    SendOne { quiet: bool },
    /// Transmit the whole main list.
    SendAll,
    /// Transmit the diversion window.
    SendAllDiversion,
    /// Delete the current selection.
    Delete,
    /// Make the selected waypoint the vehicle's current target.
    SetCurrent,
    /// Drop all unsent temp waypoints.
    ClearTemp,
    /// Replace the entire flight plan.
    ReplacePlan(Vec<ServerWaypoint>),
    /// Splice generated `(lat, lon, alt)` points in after the current
    /// waypoint.
    InsertGenerated(Vec<(f64, f64, f64)>),
    /// Poll result: full main-list snapshot.
    ReceiveSnapshot(Vec<ServerWaypoint>),
    /// Poll result: diversion-window snapshot.
    ReceiveSdaSnapshot(Vec<ServerWaypoint>),
    /// Poll result: index of the waypoint the vehicle is flying toward.
    ReceiveCurrent(usize),
    /// Zero the completed-waypoint counter, e.g. after archiving a flight.
    ResetCompleted,
}

/// Create the command channel: a cloneable sink plus the receiver the
/// engine drains.
pub fn channel() -> (PlanSink, Receiver<PlanCommand>) {
    let (tx, rx) = std::sync::mpsc::channel();
    (PlanSink { tx }, rx)
}

/// Convenience sender for feeding commands into the engine.
///
/// All helpers are fire-and-forget; sending after the engine is gone is a
/// silent no-op.
#[derive(Clone)]
pub struct PlanSink {
    tx: Sender<PlanCommand>,
}

impl PlanSink {
    /// Send a raw command.
    pub fn send(&self, cmd: PlanCommand) {
        self.tx.send(cmd).ok();
    }

    pub fn add_temp(&self, lat: f64, lon: f64) {
        self.send(PlanCommand::AddTemp { lat, lon });
    }

    pub fn confirm_select(&self, index: usize, sda: bool) {
        self.send(PlanCommand::ConfirmSelect { index, sda });
    }

    pub fn select_area(&self, contains: BoundsPredicate) {
        self.send(PlanCommand::SelectArea { contains });
    }

    pub fn set_window(&self, start: usize, end: usize, buffer: f64) {
        self.send(PlanCommand::SetWindow { start, end, buffer });
    }

    pub fn send_selected(&self) {
        self.send(PlanCommand::SendOne { quiet: false });
    }

    pub fn send_all(&self) {
        self.send(PlanCommand::SendAll);
    }

    pub fn send_all_diversion(&self) {
        self.send(PlanCommand::SendAllDiversion);
    }

    pub fn delete_selected(&self) {
        self.send(PlanCommand::Delete);
    }

    pub fn set_current(&self) {
        self.send(PlanCommand::SetCurrent);
    }

    /// Feed a polled main-list snapshot.
    pub fn receive_snapshot(&self, snapshot: Vec<ServerWaypoint>) {
        self.send(PlanCommand::ReceiveSnapshot(snapshot));
    }

    /// Feed a polled diversion-window snapshot.
    pub fn receive_sda_snapshot(&self, snapshot: Vec<ServerWaypoint>) {
        self.send(PlanCommand::ReceiveSdaSnapshot(snapshot));
    }

    pub fn receive_current(&self, current: usize) {
        self.send(PlanCommand::ReceiveCurrent(current));
    }
}
