//! Transport seam toward the vehicle-control service.
//!
//! The engine never performs network I/O itself.  It hands fully formed wire
//! records to a [`Transport`] implementation and moves on: calls are
//! fire-and-forget, there are no retries and no rollback.  The next poll's
//! reconciliation is the recovery mechanism for anything that got lost.

use std::sync::{Arc, Mutex};

use crate::wire::{PathPlanRequest, ServerWaypoint};

/// Outbound operations the engine needs from the service.
///
/// One method per consumed endpoint: single insert (`POST`), single update
/// (`PUT`), delete by waypoint number (`DELETE ?wpnum=`), current-target
/// change, batch send, wholesale replace (`POST …/replace`), path-planning
/// request (`POST …/path_planning`) and server-side diversion clear
/// (`DELETE …/path_planning/delete`).
pub trait Transport {
    /// Insert a single new waypoint.
    fn send_waypoint(&self, wp: &ServerWaypoint);
    /// Update a single confirmed waypoint.
    fn update_waypoint(&self, wp: &ServerWaypoint);
    /// Delete a confirmed waypoint by its server number.
    fn delete_waypoint(&self, number: i32);
    /// Make the waypoint with this server number the vehicle's current
    /// target.
    fn set_current(&self, number: i32);
    /// Send a batch of waypoints.
    fn send_batch(&self, wps: &[ServerWaypoint]);
    /// Replace the entire server-side flight plan.
    fn replace_all(&self, wps: &[ServerWaypoint]);
    /// Ask the server to compute a connecting path for the diversion window.
    fn request_path_plan(&self, req: &PathPlanRequest);
    /// Drop any server-side diversion state.
    fn clear_path_plan(&self);
}

// ─────────────────────────────────────────────────────────────────────────────
// Test/embedding helpers
// ─────────────────────────────────────────────────────────────────────────────

/// A transport that silently discards everything.
pub struct NullTransport;

impl Transport for NullTransport {
    fn send_waypoint(&self, _wp: &ServerWaypoint) {}
    fn update_waypoint(&self, _wp: &ServerWaypoint) {}
    fn delete_waypoint(&self, _number: i32) {}
    fn set_current(&self, _number: i32) {}
    fn send_batch(&self, _wps: &[ServerWaypoint]) {}
    fn replace_all(&self, _wps: &[ServerWaypoint]) {}
    fn request_path_plan(&self, _req: &PathPlanRequest) {}
    fn clear_path_plan(&self) {}
}

/// One recorded outbound call.
#[derive(Debug, Clone, PartialEq)]
pub enum TransportCall {
    Send(ServerWaypoint),
    Update(ServerWaypoint),
    Delete(i32),
    SetCurrent(i32),
    Batch(Vec<ServerWaypoint>),
    Replace(Vec<ServerWaypoint>),
    PathPlan(PathPlanRequest),
    ClearPathPlan,
}

/// A transport that records every call, for tests and dry runs.
#[derive(Clone, Default)]
pub struct RecordingTransport {
    calls: Arc<Mutex<Vec<TransportCall>>>,
}

impl RecordingTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// All calls recorded so far, in order.
    pub fn calls(&self) -> Vec<TransportCall> {
        self.calls.lock().unwrap().clone()
    }

    /// Number of recorded calls.
    pub fn len(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.calls.lock().unwrap().is_empty()
    }

    fn push(&self, call: TransportCall) {
        self.calls.lock().unwrap().push(call);
    }
}

impl Transport for RecordingTransport {
    fn send_waypoint(&self, wp: &ServerWaypoint) {
        self.push(TransportCall::Send(wp.clone()));
    }
    fn update_waypoint(&self, wp: &ServerWaypoint) {
        self.push(TransportCall::Update(wp.clone()));
    }
    fn delete_waypoint(&self, number: i32) {
        self.push(TransportCall::Delete(number));
    }
    fn set_current(&self, number: i32) {
        self.push(TransportCall::SetCurrent(number));
    }
    fn send_batch(&self, wps: &[ServerWaypoint]) {
        self.push(TransportCall::Batch(wps.to_vec()));
    }
    fn replace_all(&self, wps: &[ServerWaypoint]) {
        self.push(TransportCall::Replace(wps.to_vec()));
    }
    fn request_path_plan(&self, req: &PathPlanRequest) {
        self.push(TransportCall::PathPlan(req.clone()));
    }
    fn clear_path_plan(&self) {
        self.push(TransportCall::ClearPathPlan);
    }
}
