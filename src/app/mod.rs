//! Application core: monitor logic, no direct I/O.
//!
//! The orchestrator ([`service`]), the background jobs ([`jobs`]) and the
//! state they share ([`shared`]).  All interaction with hardware, files
//! and the network happens through the **port traits** in [`ports`].

pub mod events;
pub mod jobs;
pub mod ports;
pub mod service;
pub mod shared;
