//! Event system for the plan engine.
//!
//! Embedding code (table views, map renderers, toast/alert widgets) can
//! subscribe to engine events via [`EventController`].  Each event carries a
//! set of [`EventKind`] flags (bitflags-style) so a single occurrence can
//! match several categories, and subscribers pass an [`EventFilter`] OR-mask
//! to receive only what they care about.
//!
//! Operator-visible warnings are delivered here as `WARNING` events rather
//! than log lines: the engine never blocks on a display layer, it just
//! publishes.

use std::sync::mpsc::{Receiver, Sender};
use std::sync::{Arc, Mutex};

// ─────────────────────────────────────────────────────────────────────────────
// EventKind – bitflags
// ─────────────────────────────────────────────────────────────────────────────

/// Bitflags describing the categories an event belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EventKind(pub u64);

impl EventKind {
    /// An operator-visible warning; the triggering operation was aborted or
    /// downgraded and state is unchanged.
    pub const WARNING: Self = Self(1 << 0);
    /// The main waypoint list changed (reconciliation, edit, delete …).
    pub const PLAN_CHANGED: Self = Self(1 << 1);
    /// The diversion-window list changed.
    pub const SDA_CHANGED: Self = Self(1 << 2);
    /// The diversion window bounds were set, consumed or cleared.
    pub const WINDOW_CHANGED: Self = Self(1 << 3);
    /// Any selection channel changed.
    pub const SELECTION_CHANGED: Self = Self(1 << 4);
    /// One or more waypoints were handed to the transport.
    pub const SENT: Self = Self(1 << 5);
    /// One or more waypoints were removed.
    pub const DELETED: Self = Self(1 << 6);
    /// The vehicle's current-waypoint index advanced.
    pub const CURRENT_CHANGED: Self = Self(1 << 7);

    /// All categories.
    pub const ALL: Self = Self(u64::MAX);
    /// No categories.
    pub const NONE: Self = Self(0);

    /// Union of two kind sets.
    pub const fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    /// Whether all bits of `other` are set in `self`.
    pub const fn contains(self, other: Self) -> bool {
        (self.0 & other.0) == other.0
    }

    /// Whether any bit of `other` is set in `self`.
    pub const fn intersects(self, other: Self) -> bool {
        (self.0 & other.0) != 0
    }
}

impl std::ops::BitOr for EventKind {
    type Output = Self;
    fn bitor(self, rhs: Self) -> Self {
        self.union(rhs)
    }
}

impl std::ops::BitOrAssign for EventKind {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// PlanEvent
// ─────────────────────────────────────────────────────────────────────────────

/// Extra data for `SENT` events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SentMeta {
    /// Number of waypoints handed to the transport.
    pub count: usize,
}

/// Extra data for `SELECTION_CHANGED` events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelectionMeta {
    pub row: Option<usize>,
    pub sda: Option<usize>,
    /// Size of the rectangle multi-selection.
    pub area: usize,
}

/// A single engine event delivered to subscribers.
#[derive(Debug, Clone)]
pub struct PlanEvent {
    /// Categories this event belongs to.
    pub kinds: EventKind,
    /// Seconds since the controller was created.
    pub timestamp: f64,
    /// Human-readable operator message (always present for `WARNING`).
    pub message: Option<String>,
    pub sent: Option<SentMeta>,
    pub selection: Option<SelectionMeta>,
}

impl PlanEvent {
    /// Create a new event with the given kinds; the timestamp is stamped by
    /// the controller on emit.
    pub fn new(kinds: EventKind) -> Self {
        Self {
            kinds,
            timestamp: 0.0,
            message: None,
            sent: None,
            selection: None,
        }
    }

    /// A warning event with an operator-visible message.
    pub fn warning(message: impl Into<String>) -> Self {
        let mut evt = Self::new(EventKind::WARNING);
        evt.message = Some(message.into());
        evt
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// EventFilter
// ─────────────────────────────────────────────────────────────────────────────

/// OR-mask selecting which event categories a subscriber receives.
#[derive(Debug, Clone, Copy)]
pub struct EventFilter {
    pub mask: EventKind,
}

impl EventFilter {
    /// Accept all events.
    pub const fn all() -> Self {
        Self { mask: EventKind::ALL }
    }

    /// Accept only the specified event kinds.
    pub const fn only(mask: EventKind) -> Self {
        Self { mask }
    }

    /// Check whether an event passes this filter.
    #[inline]
    pub fn matches(&self, event: &PlanEvent) -> bool {
        event.kinds.intersects(self.mask)
    }
}

impl Default for EventFilter {
    fn default() -> Self {
        Self::all()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// EventController
// ─────────────────────────────────────────────────────────────────────────────

struct Subscriber {
    filter: EventFilter,
    sender: Sender<PlanEvent>,
}

/// Controller that distributes engine events to subscribers.
///
/// Cloneable; all clones share the same subscriber list.
#[derive(Clone)]
pub struct EventController {
    inner: Arc<Mutex<EventCtrlInner>>,
}

struct EventCtrlInner {
    subscribers: Vec<Subscriber>,
    start_instant: std::time::Instant,
}

impl EventController {
    /// Create a new event controller.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(EventCtrlInner {
                subscribers: Vec::new(),
                start_instant: std::time::Instant::now(),
            })),
        }
    }

    /// Subscribe to events matching the given filter.
    pub fn subscribe(&self, filter: EventFilter) -> Receiver<PlanEvent> {
        let (tx, rx) = std::sync::mpsc::channel();
        let mut inner = self.inner.lock().unwrap();
        inner.subscribers.push(Subscriber { filter, sender: tx });
        rx
    }

    /// Subscribe to all events (no filtering).
    pub fn subscribe_all(&self) -> Receiver<PlanEvent> {
        self.subscribe(EventFilter::all())
    }

    /// Emit an event to all matching subscribers.
    ///
    /// Subscribers whose receiving end was dropped are pruned on delivery.
    pub fn emit(&self, mut event: PlanEvent) {
        let mut inner = self.inner.lock().unwrap();
        event.timestamp = inner.start_instant.elapsed().as_secs_f64();
        inner.subscribers.retain(|sub| {
            if sub.filter.matches(&event) {
                sub.sender.send(event.clone()).is_ok()
            } else {
                true
            }
        });
    }

    /// Shorthand for emitting a warning with an operator message.
    pub fn warn(&self, message: impl Into<String>) {
        let message = message.into();
        log::warn!("{message}");
        self.emit(PlanEvent::warning(message));
    }
}

impl Default for EventController {
    fn default() -> Self {
        Self::new()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Unit tests
// ─────────────────────────────────────────────────────────────────────────────
