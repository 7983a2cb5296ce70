//! Aggregate root abstraction.

use uuid::Uuid;

use crate::event::DomainEvent;

/// An event-sourced aggregate root.
///
/// `version` counts events that have been persisted and replayed through
/// [`AggregateRoot::apply`]. Events recorded by command methods stay in the
/// uncommitted buffer until the caller persists them and clears it, so the
/// version doubles as the expected version for optimistic concurrency.
pub trait AggregateRoot: Send + Sync {
    /// The event type this aggregate records and replays.
    type Event: DomainEvent;

    /// Returns the aggregate identifier.
    fn aggregate_id(&self) -> Uuid;

    /// Returns the number of persisted events applied so far.
    fn version(&self) -> i64;

    /// Replays a persisted event onto the aggregate.
    fn apply(&mut self, event: &Self::Event);

    /// Returns events recorded since the last persistence.
    fn uncommitted_events(&self) -> &[Self::Event];

    /// Clears uncommitted events after persistence.
    fn clear_uncommitted_events(&mut self);
}
