//! Search core: interned state storage, indexed open heap, weighted A*
//!
//! The pieces compose bottom-up:
//! - `state_table`: arena of search nodes interned by value
//! - `heap`: indexed binary min-heap with decrease-key over that arena
//! - `heuristics`: admissible estimates on lattice poses
//! - `a_star`: the weighted A* control loop tying them together

pub mod a_star;
pub mod heap;
pub mod heuristics;
pub mod state_table;

// Re-exports for convenience
pub use a_star::{AStarConfig, AStarPlanner, StopToken};
pub use heap::IndexedHeap;
pub use heuristics::{Euclidean, Manhattan};
pub use state_table::{NodeId, SearchNode, StateTable, INFINITE_COST, NO_SLOT};
