//! Skirmish: Tactical Combat bounded context.
//!
//! Decides whose turn it is, where combatants stand on the battle grid, and
//! when a fight ends. The domain layer is a synchronous, deterministic state
//! machine; the application layer persists it through the event repository
//! port and hosts one encounter per session.

pub mod application;
pub mod config;
pub mod domain;
