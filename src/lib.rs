//! Flightplan crate root: re-exports and module wiring.
//!
//! This crate is the client-side state layer of a ground-control-station
//! dashboard: it keeps an operator's flight-plan edits coherent with the
//! authoritative waypoint list a remote vehicle-control service reports on
//! every poll, without ever losing unsent work.
//!
//! The implementation is split into cohesive modules:
//! - `waypoint`: the entity model and the original-vs-current convention
//! - `wire`: JSON shapes exchanged with the vehicle-control service
//! - `state`: the owned mutable aggregate and basic edit operations
//! - `reconcile`: merging local edits with polled server snapshots
//! - `selection`: selection channels and the debounced edit confirmation
//! - `overlay`: the splice-in/splice-out diversion window
//! - `send`: validation, risky-value confirmation and transmit decisions
//! - `commands` / `engine`: one command type, one dispatch loop
//! - `events`: change/warning notifications for embedding views
//! - `transport` / `confirm`: injected seams for network and operator I/O

pub mod commands;
pub mod config;
pub mod confirm;
pub mod engine;
pub mod errors;
pub mod events;
pub mod overlay;
pub mod reconcile;
pub mod selection;
pub mod send;
pub mod state;
pub mod transport;
pub mod waypoint;
pub mod wire;

// Public re-exports for a compact external API
pub use commands::{channel, BoundsPredicate, PlanCommand, PlanSink};
pub use config::PlanConfig;
pub use confirm::{ConfirmAll, ConfirmPrompt, Confirmer, DenyAll};
pub use engine::PlanEngine;
pub use errors::PlanError;
pub use events::{EventController, EventFilter, EventKind, PlanEvent};
pub use reconcile::{reconcile, reconcile_sda};
pub use selection::SelectOutcome;
pub use send::SendContext;
pub use state::{CellField, CellValue, PlanState};
pub use transport::{NullTransport, RecordingTransport, Transport, TransportCall};
pub use waypoint::{interpolate_altitude, kind, value_close, Waypoint};
pub use wire::{parse_snapshot, PathPlanRequest, ServerWaypoint};
