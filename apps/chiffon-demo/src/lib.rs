//! # ChiffonUpdater Demo Library
//!
//! This library exposes the demo application modules for testing and
//! integration.
//!
//! The main binary uses these modules through the `main.rs` entry point.

pub mod agent;
pub mod cli;
pub mod demo;
pub mod reporter;
pub mod tool;

// Re-export chiffon_core for convenience
pub use chiffon_core;
