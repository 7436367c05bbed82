// src/monitor/mod.rs
mod runner;

pub use runner::{ExitStatus, Monitor, RunSummary};
