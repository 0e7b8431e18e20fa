//! Domain rules for the Syncdesk school helpdesk.
//!
//! This crate holds the pure decision logic: role capabilities, the ticket
//! state machine, the guardrail engine, visibility predicates, and
//! announcement targeting. Nothing here performs I/O; time and configuration
//! are passed in explicitly so every rule is deterministic under test.

pub mod announcement;
pub mod audit;
pub mod error;
pub mod guardrails;
pub mod roles;
pub mod ticket;
pub mod types;
pub mod visibility;
