//! Indoor air-quality monitor library.
//!
//! Exposes the pure-logic core (classification, baseline lifecycle, alert
//! state machine, scheduler) and the host adapters, so the binary and the
//! integration tests wire the same pieces.

#![deny(unused_must_use)]

pub mod adapters;
pub mod air_quality;
pub mod app;
pub mod baseline;
pub mod config;
pub mod error;
pub mod fsm;
pub mod readings;
pub mod scheduler;
