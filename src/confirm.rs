//! Operator confirmation seam.
//!
//! Risky operations (editing an on-board waypoint, sending a zero-altitude
//! waypoint of a sensitive kind, replacing the whole plan) require explicit
//! operator confirmation.  The engine asks synchronously through an injected
//! [`Confirmer`]; state does not change until the answer comes back, and a
//! batch operation issues a single prompt covering the whole batch.

/// What the operator is being asked to confirm.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfirmPrompt {
    /// Edit a waypoint that is already live on the vehicle.
    EditOnboardWaypoint,
    /// Send a waypoint (or batch containing one) with altitude 0 on a
    /// zero-altitude-sensitive kind.
    ZeroAltitude,
    /// Replace the entire flight plan.
    ReplacePlan,
}

impl ConfirmPrompt {
    /// Operator-facing prompt text.
    pub fn message(&self) -> &'static str {
        match self {
            ConfirmPrompt::EditOnboardWaypoint => {
                "Are you sure you want to edit an on-board waypoint?"
            }
            ConfirmPrompt::ZeroAltitude => {
                "This waypoint has altitude 0, are you sure you want to send it?"
            }
            ConfirmPrompt::ReplacePlan => {
                "This replaces the entire flight plan, are you sure?"
            }
        }
    }
}

/// Synchronous yes/no gate for risky operations.
pub trait Confirmer {
    /// Ask the operator; `true` means proceed.
    fn confirm(&self, prompt: ConfirmPrompt) -> bool;
}

/// Grants every prompt. Useful for tests and scripted operation.
pub struct ConfirmAll;

impl Confirmer for ConfirmAll {
    fn confirm(&self, _prompt: ConfirmPrompt) -> bool {
        true
    }
}

/// Refuses every prompt.
pub struct DenyAll;

impl Confirmer for DenyAll {
    fn confirm(&self, _prompt: ConfirmPrompt) -> bool {
        false
    }
}
