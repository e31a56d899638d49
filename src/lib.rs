//! gravitoy library
//!
//! This provides the core functionality of gravitoy as a library
//! to enable integration testing and benchmarks.

pub mod cli;
pub mod config;
pub mod physics;
pub mod plugins;
pub mod prelude;
pub mod simulation;
pub mod surface;

// Test utilities are public for integration tests
pub mod test_utils;
