//! Reconciliation of local edits with polled server snapshots.
//!
//! Two independently mutating sources must be kept coherent: the operator's
//! working list (which may contain unsent temp waypoints anywhere) and the
//! server's authoritative, fully confirmed list delivered on every poll.
//! [`reconcile`] merges them without ever dropping a pending temp waypoint;
//! [`reconcile_sda`] does the simpler wholesale variant for the diversion
//! window.
//!
//! Both functions honor an explicit idempotence contract: when nothing
//! materially changed they return the *original* input vector (same
//! allocation), so callers can compare pointers and skip downstream redraw
//! or recompute work.

use crate::waypoint::{value_close, Waypoint};
use crate::wire::ServerWaypoint;

/// Server `min_dist` values above this are treated as "not measured" and the
/// locally cached value is kept.
const MIN_DIST_LIVE: f64 = 99.0;

/// Does a server record numerically match an unsent temp waypoint?
///
/// Altitude within tolerance, exact lat/lon/kind.  A match means the server
/// accepted what the operator proposed.
fn temp_matches(server: &ServerWaypoint, local: &Waypoint) -> bool {
    value_close(server.alt, local.alt)
        && server.lat == local.lat
        && server.lon == local.lon
        && server.command == local.kind
}

/// Does a server record still match an already confirmed local waypoint?
///
/// Compares against the `original_*` fields (local unsent edits must not
/// mask a genuine server-side change) plus the server sequence position.
fn confirmed_matches(server: &ServerWaypoint, server_index: usize, local: &Waypoint) -> bool {
    value_close(server.alt, local.original_alt)
        && server_index as i32 == local.number
        && server.lat == local.original_lat
        && server.lon == local.original_lon
        && (server.min_dist > MIN_DIST_LIVE || server.min_dist == local.min_dist)
        && server.command == local.original_kind
}

/// Merge the previously known local list with a freshly polled server list.
///
/// Walks the server list in order while advancing a cursor through the local
/// list:
///
/// 1. Temp waypoints under the cursor are matched against the current server
///    record; a match is *promoted* (replaced by a confirmed waypoint built
///    from the server record), a non-match is kept as-is and the cursor
///    advances — temp waypoints are never dropped here.
/// 2. A confirmed waypoint under the cursor is kept when it still matches
///    (preserving the cached `min_dist`), otherwise rebuilt from the server
///    record.
/// 3. Temp waypoints trailing the server list are appended unchanged.
///
/// An empty snapshot degrades to "no change".  When the result is identical
/// to the input the input vector itself is returned.
pub fn reconcile(local: Vec<Waypoint>, server: &[ServerWaypoint]) -> Vec<Waypoint> {
    if server.is_empty() {
        return local;
    }

    let mut changed = false;
    let mut merged: Vec<Waypoint> = Vec::with_capacity(local.len().max(server.len()));
    let mut cursor = 0usize;

    for (server_index, server_wp) in server.iter().enumerate() {
        // Carry over pending temp waypoints, promoting at most one match.
        let mut matched_temp = false;
        while let Some(local_wp) = local.get(cursor) {
            if !local_wp.is_temp {
                break;
            }
            if temp_matches(server_wp, local_wp) {
                // The server accepted this proposal; replace it with the
                // confirmed record at the position it occupies locally.
                changed = true;
                matched_temp = true;
                merged.push(Waypoint::from_server(server_wp, cursor, false));
                break;
            }
            merged.push(local_wp.clone());
            cursor += 1;
        }

        if !matched_temp {
            match local.get(cursor) {
                Some(local_wp) if confirmed_matches(server_wp, server_index, local_wp) => {
                    merged.push(local_wp.clone());
                }
                _ => {
                    changed = true;
                    merged.push(Waypoint::from_server(server_wp, server_index, false));
                }
            }
        }
        cursor += 1;
    }

    // Trailing temp waypoints survive; trailing confirmed waypoints no
    // longer exist server-side and are dropped.
    for local_wp in local.iter().skip(cursor) {
        if local_wp.is_temp {
            merged.push(local_wp.clone());
        }
    }

    if changed || merged.len() != local.len() {
        log::debug!("reconcile: list changed ({} -> {} waypoints)", local.len(), merged.len());
        merged
    } else {
        local
    }
}

/// Fields that decide whether a diversion-window snapshot replaces the local
/// working copy.
fn sda_equal(old: &Waypoint, new: &Waypoint) -> bool {
    old.is_sda == new.is_sda
        && old.is_temp == new.is_temp
        && old.number == new.number
        && value_close(old.original_alt, new.original_alt)
        && old.original_lat == new.original_lat
        && old.original_lon == new.original_lon
        && old.min_dist == new.min_dist
        && old.original_kind == new.original_kind
}

/// Diversion-window variant: wholesale replacement.
///
/// No temp-matching tolerance games — the window's waypoints are rebuilt
/// from the snapshot unless the entire set is size- and value-identical, in
/// which case the old vector is returned unchanged.  The server's `sda`
/// flag marks waypoints the vehicle has not committed to, carried into
/// `is_temp`.
pub fn reconcile_sda(local: Vec<Waypoint>, server: &[ServerWaypoint]) -> Vec<Waypoint> {
    let rebuilt: Vec<Waypoint> = server
        .iter()
        .enumerate()
        .map(|(i, wp)| Waypoint::from_server(wp, i, true))
        .collect();

    let unchanged = rebuilt.len() == local.len()
        && rebuilt.iter().zip(local.iter()).all(|(new, old)| sda_equal(old, new));

    if unchanged {
        local
    } else {
        rebuilt
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Unit tests
// ─────────────────────────────────────────────────────────────────────────────
