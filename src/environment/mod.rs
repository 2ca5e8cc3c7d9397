//! Environments the planner searches
//!
//! `model` supplies the narrow collaborator surface the core consumes
//! (mesh extremes, motion primitives, a collision predicate);
//! `environment_3d` is the bounded 6-DOF lattice environment built on it.

pub mod environment_3d;
pub mod model;

// Re-exports for convenience
pub use environment_3d::Environment3D;
pub use model::{Mesh, Model, MotionPrimitive};
