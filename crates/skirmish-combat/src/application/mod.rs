//! Application services for the Tactical Combat context.

pub mod arena;
pub mod command_handlers;
pub mod query_handlers;
pub mod turn_policy;
