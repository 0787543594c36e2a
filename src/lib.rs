pub mod config;
pub mod error;
pub mod matching;
pub mod server;
pub mod telemetry;
