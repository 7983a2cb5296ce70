//! Command abstractions.

use uuid::Uuid;

/// A request to change an aggregate, routed to an application handler.
pub trait Command: Send + Sync + std::fmt::Debug {
    /// Stable command name used in logs (e.g. `combat.start_encounter`).
    fn command_type(&self) -> &'static str;

    /// Correlation ID carried onto every event the command produces.
    fn correlation_id(&self) -> Uuid;

    /// The aggregate this command targets.
    fn aggregate_id(&self) -> Uuid;
}
