//! PUNTER — decision core for binary-outcome channel-points wagering.
//!
//! Consumes raw outcome snapshots and an account balance from the
//! surrounding automation, and produces a wager decision: whether to bet,
//! which outcome to back, and how many points to stake. Polling, settings
//! persistence, and multi-event orchestration live outside this crate.

pub mod config;
pub mod engine;
pub mod filter;
pub mod strategy;
pub mod types;
