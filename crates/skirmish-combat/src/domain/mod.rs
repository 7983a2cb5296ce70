//! Domain model for the Tactical Combat context.

pub mod aggregates;
pub mod combatant;
pub mod commands;
pub mod events;
pub mod grid;
pub mod initiative;
pub mod participant;
pub mod position;
