//! gravitoy prelude module
//!
//! This module re-exports the most commonly used types, traits, and functions
//! across the gravitoy application to reduce import boilerplate.

// External crate re-exports
pub use bevy::prelude::*;

// Internal re-exports - Config
pub use crate::config::SimulationConfig;

// Internal re-exports - Physics
pub use crate::physics::body::Body;
pub use crate::physics::trail::{Stamp, Trail};

// Internal re-exports - Simulation
pub use crate::simulation::{BodyId, LoopControl, Simulation, TrailId};

// Internal re-exports - Surface
pub use crate::surface::{Canvas, Surface, SurfaceEvent};
