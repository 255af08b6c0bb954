//! FLIPWATCH — Marketplace listing monitor
//!
//! Library crate exposing all modules for use by integration tests
//! and the binary entry point.

pub mod config;
pub mod types;
pub mod marketplace;
pub mod evaluation;
pub mod notify;
pub mod storage;
pub mod engine;
