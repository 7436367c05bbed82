// src/lib.rs
pub mod alert;
pub mod config;
pub mod health;
pub mod monitor;
pub mod report;
