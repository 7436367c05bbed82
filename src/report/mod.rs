// src/report/mod.rs
mod run_report;

pub use run_report::RunReport;
