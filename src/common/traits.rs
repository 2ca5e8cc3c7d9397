//! Common traits defining the seams between the planner and its collaborators

use crate::planning::state_table::{NodeId, StateTable};

/// State graph abstraction driven by the A* planner
///
/// An environment interns every state it hands out, so a lattice value maps
/// to exactly one [`NodeId`] for the environment's lifetime. The planner
/// relaxes `g`/parent fields through [`states_mut`](Environment::states_mut);
/// `successors` must never touch them.
pub trait Environment {
    /// Discretized planner-space state; identity is componentwise equality
    type State: Clone + PartialEq;
    /// Continuous world-space counterpart accepted at the public boundary
    type World: Clone + PartialEq;

    /// Discretize a world state; idempotent after the first pass
    fn world_to_planner(&self, world: &Self::World) -> Self::State;

    /// Reconstruct the world state a planner state denotes
    fn planner_to_world(&self, state: &Self::State) -> Self::World;

    /// Whether the state is admissible; implementations may cache verdicts
    fn state_valid(&mut self, state: &Self::State) -> bool;

    /// Intern a state, returning its canonical node
    fn add_state(&mut self, state: Self::State) -> NodeId;

    /// Fill the parallel neighbor/cost sequences for one expansion; may
    /// intern new nodes but must not mutate path cost or parent fields
    fn successors(&mut self, node: NodeId, neighbors: &mut Vec<NodeId>, costs: &mut Vec<f64>);

    /// Edge cost between two adjacent states; `None` means no edge
    fn cost(&self, from: &Self::State, to: &Self::State) -> Option<f64>;

    /// The interned-state table backing this environment
    fn states(&self) -> &StateTable<Self::State>;

    fn states_mut(&mut self) -> &mut StateTable<Self::State>;
}

/// Estimate of remaining path cost between two planner states
pub trait Heuristic<S> {
    fn estimate(&self, from: &S, to: &S) -> f64;
}

/// Host hook invoked once per state expansion
///
/// This is the narrow contract for progress readouts: a host can render,
/// throttle, or stop the search from here without the planner knowing.
pub trait SearchObserver<S> {
    fn on_expansion(&mut self, state: &S, expansions: usize);
}
