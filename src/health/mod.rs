// src/health/mod.rs
mod checker;
mod result;

pub use checker::HttpChecker;
pub use result::{CheckResult, FailureReason, ProbeError};
