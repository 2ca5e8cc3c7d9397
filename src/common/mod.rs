//! Common types, traits, and error definitions for motion_planning
//!
//! This module provides the foundational building blocks shared by the
//! search core and the environments.

pub mod error;
pub mod traits;
pub mod types;

pub use error::*;
pub use traits::*;
pub use types::*;
