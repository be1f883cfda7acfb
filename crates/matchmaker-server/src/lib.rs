//! matchmaker-server
//!
//! WebSocket matchmaking broker: game servers advertise capacity on
//! `/server`, players ask for a match on `/client`, and a single engine
//! task pairs them.

pub mod config;
pub mod logging;
pub mod types;
pub mod server;

// these are internal modules, not re-exported
mod connection;
mod engine_task;
mod stats;
