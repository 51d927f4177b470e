//! Core library for the rate-graph arbitrage detector.
//!
//! Quotes stream into a shared [`graph::RateGraph`]; an
//! [`orchestrator::Orchestrator`] periodically snapshots it, searches the
//! snapshot for negative cycles and hands any route it finds to the
//! execution service.

pub mod cex;
pub mod config;
pub mod detect;
pub mod emitter;
pub mod errors;
pub mod execution;
pub mod graph;
pub mod models;
pub mod orchestrator;
pub mod utils;
