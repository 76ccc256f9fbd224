//! ARGENT — Autonomous Data-Collection Agent for the Silver Market
//!
//! Library crate exposing all modules for use by integration tests
//! and the binary entry point.

pub mod config;
pub mod data;
pub mod environment;
pub mod forecast;
pub mod strategy;
pub mod types;
