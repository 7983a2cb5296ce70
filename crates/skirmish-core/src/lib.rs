//! Skirmish Core: shared domain abstractions.
//!
//! Traits and types every combat context builds on: event-sourced
//! aggregates, injected time and randomness, the event repository port, and
//! the domain error taxonomy. No storage or presentation code lives here.

pub mod aggregate;
pub mod clock;
pub mod command;
pub mod error;
pub mod event;
pub mod repository;
pub mod rng;
