//! Domain event envelope.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::clock::Clock;

/// Envelope fields shared by every recorded event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventMetadata {
    /// Unique event identifier.
    pub event_id: Uuid,
    /// Event type name, e.g. `combat.turn_advanced`.
    pub event_type: String,
    /// Stream the event belongs to.
    pub aggregate_id: Uuid,
    /// 1-based position in the stream.
    pub sequence_number: i64,
    /// Correlation ID of the command that produced the event.
    pub correlation_id: Uuid,
    /// What caused the event; commands use their correlation ID.
    pub causation_id: Uuid,
    /// When the event was recorded, per the injected clock.
    pub occurred_at: DateTime<Utc>,
}

impl EventMetadata {
    /// Metadata for a freshly recorded event caused directly by a command.
    ///
    /// The event id is random; everything else is supplied by the caller or
    /// the clock.
    #[must_use]
    pub fn record(
        event_type: &str,
        aggregate_id: Uuid,
        sequence_number: i64,
        correlation_id: Uuid,
        clock: &dyn Clock,
    ) -> Self {
        Self {
            event_id: Uuid::new_v4(),
            event_type: event_type.to_owned(),
            aggregate_id,
            sequence_number,
            correlation_id,
            causation_id: correlation_id,
            occurred_at: clock.now(),
        }
    }
}

/// An event an aggregate records and replays.
pub trait DomainEvent: Send + Sync + std::fmt::Debug {
    /// Event type name used to route deserialization.
    fn event_type(&self) -> &'static str;

    /// The payload as JSON, without the envelope.
    fn to_payload(&self) -> serde_json::Value;

    /// The envelope.
    fn metadata(&self) -> &EventMetadata;
}
