//! Error types for motion_planning

use std::fmt;

/// Failure modes of a planning query
///
/// No-edge conditions during successor relaxation are not failures; they
/// degrade to infinite cost and never surface here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlanningError {
    /// Start state is out of bounds or in collision
    InvalidStart,
    /// Goal state is out of bounds or in collision
    InvalidGoal,
    /// The open list drained without reaching the goal
    NoPath,
    /// The stop flag was observed before the goal was found
    Cancelled,
}

impl fmt::Display for PlanningError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlanningError::InvalidStart => write!(f, "start state is invalid"),
            PlanningError::InvalidGoal => write!(f, "goal state is invalid"),
            PlanningError::NoPath => write!(f, "no path between start and goal"),
            PlanningError::Cancelled => write!(f, "planning was cancelled"),
        }
    }
}

impl std::error::Error for PlanningError {}

/// Result type alias for planning operations
pub type PlanningResult<T> = Result<T, PlanningError>;
