//! In-memory home for live encounters, one per game session.

use std::collections::HashMap;

use skirmish_core::error::DomainError;
use tracing::{info, warn};
use uuid::Uuid;

use crate::domain::aggregates::CombatEncounter;

/// Owns at most one encounter per session.
///
/// Encounters never reference each other; dropping a session drops its
/// encounter and grid with it.
#[derive(Debug, Default)]
pub struct EncounterArena {
    encounters: HashMap<Uuid, CombatEncounter>,
}

impl EncounterArena {
    /// An empty arena.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Hands `encounter` to `session_id` and returns it for immediate use.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` if the session already has an
    /// encounter; the existing one is left untouched.
    pub fn open(
        &mut self,
        session_id: Uuid,
        encounter: CombatEncounter,
    ) -> Result<&mut CombatEncounter, DomainError> {
        if let Some(existing) = self.encounters.get(&session_id) {
            warn!(
                session_id = %session_id,
                encounter_id = %existing.id,
                "session already has an encounter"
            );
            return Err(DomainError::Validation(format!(
                "session {session_id} already has encounter {}",
                existing.id
            )));
        }
        info!(session_id = %session_id, encounter_id = %encounter.id, "encounter opened");
        Ok(self.encounters.entry(session_id).or_insert(encounter))
    }

    /// The session's encounter.
    #[must_use]
    pub fn get(&self, session_id: Uuid) -> Option<&CombatEncounter> {
        self.encounters.get(&session_id)
    }

    /// The session's encounter, mutably.
    pub fn get_mut(&mut self, session_id: Uuid) -> Option<&mut CombatEncounter> {
        self.encounters.get_mut(&session_id)
    }

    /// Removes and returns the session's encounter.
    pub fn close(&mut self, session_id: Uuid) -> Option<CombatEncounter> {
        let closed = self.encounters.remove(&session_id);
        if let Some(encounter) = &closed {
            info!(
                session_id = %session_id,
                encounter_id = %encounter.id,
                state = encounter.state().as_str(),
                "encounter closed"
            );
        }
        closed
    }

    /// Sessions with an open encounter, sorted.
    #[must_use]
    pub fn session_ids(&self) -> Vec<Uuid> {
        let mut ids: Vec<Uuid> = self.encounters.keys().copied().collect();
        ids.sort();
        ids
    }

    /// Number of open encounters.
    #[must_use]
    pub fn len(&self) -> usize {
        self.encounters.len()
    }

    /// Whether no session has an encounter.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.encounters.is_empty()
    }
}
