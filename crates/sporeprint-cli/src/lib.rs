//! sporeprint-cli: the mushroom classification dashboard and its command line.
pub mod classify;
pub mod config;
pub mod dashboard;
pub mod server;
