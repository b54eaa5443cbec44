//! BoltLock firmware library.
//!
//! Exposes the control logic for integration testing and external
//! inspection.  All ESP-IDF-specific code is guarded by
//! `#[cfg(target_os = "espidf")]` within each module.

#![deny(unused_must_use)]

pub mod app;
pub mod config;
pub mod connectivity;
pub mod error;
pub mod events;
pub mod fsm;
pub mod pins;
pub mod update;

// ESP-IDF-backed modules; each carries a simulation stub for host builds.
pub mod adapters;
pub mod drivers;
