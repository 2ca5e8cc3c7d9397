//! Weighted A* search over an interned state graph
//!
//! The planner drives an [`Environment`]: endpoints come in as world states,
//! get discretized and interned, and the search relaxes over the nodes the
//! environment hands back. With `weight == 1` and an admissible heuristic
//! the result is optimal; inflating the heuristic trades optimality for
//! speed, with path cost bounded by `weight` times the optimum.
//!
//! Reference: Pohl, I. (1970). "Heuristic search viewed as path finding in
//! a graph" (weighted A*).

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use log::{info, warn};

use crate::common::error::{PlanningError, PlanningResult};
use crate::common::traits::{Environment, Heuristic, SearchObserver};
use crate::planning::heap::IndexedHeap;
use crate::planning::state_table::{NodeId, INFINITE_COST, NO_SLOT};
use crate::utils::Timer;

/// Configuration for the A* planner
#[derive(Debug, Clone)]
pub struct AStarConfig {
    /// Heuristic inflation factor; 1.0 is optimal, larger is greedier
    pub weight: f64,
    /// Sleep after each expansion, for hosts that pace the search
    pub delay_micros: u64,
}

impl Default for AStarConfig {
    fn default() -> Self {
        Self {
            weight: 1.0,
            delay_micros: 0,
        }
    }
}

/// Cloneable handle that cancels an in-flight search from any thread
///
/// The flag is polled once per expansion; the only ordering requirement is
/// eventual visibility, so relaxed atomics are enough.
#[derive(Debug, Clone)]
pub struct StopToken {
    flag: Arc<AtomicBool>,
}

impl StopToken {
    pub fn stop(&self) {
        self.flag.store(true, Ordering::Relaxed);
    }

    pub fn is_stopped(&self) -> bool {
        self.flag.load(Ordering::Relaxed)
    }
}

/// Weighted A* planner over a borrowed environment
///
/// The environment (and the nodes it interns) outlives the planner; the
/// open heap, closed set, and explored readout are scoped to a single
/// [`plan`](AStarPlanner::plan) call and rebuilt on entry.
pub struct AStarPlanner<'a, E: Environment, H: Heuristic<E::State>> {
    environment: &'a mut E,
    heuristic: H,
    config: AStarConfig,
    stop: Arc<AtomicBool>,
    closed: Vec<bool>,
    explored: Vec<E::State>,
    state_expansions: usize,
    observer: Option<Box<dyn SearchObserver<E::State>>>,
}

impl<'a, E, H> AStarPlanner<'a, E, H>
where
    E: Environment,
    H: Heuristic<E::State>,
{
    pub fn new(environment: &'a mut E, heuristic: H) -> Self {
        Self::with_config(environment, heuristic, AStarConfig::default())
    }

    pub fn with_config(environment: &'a mut E, heuristic: H, config: AStarConfig) -> Self {
        Self {
            environment,
            heuristic,
            config,
            stop: Arc::new(AtomicBool::new(false)),
            closed: Vec::new(),
            explored: Vec::new(),
            state_expansions: 0,
            observer: None,
        }
    }

    /// Set the heuristic inflation factor (>= 1.0 for the suboptimality bound)
    pub fn set_weight(&mut self, weight: f64) {
        self.config.weight = weight;
    }

    pub fn weight(&self) -> f64 {
        self.config.weight
    }

    /// Set the per-expansion delay in microseconds
    pub fn set_delay(&mut self, delay_micros: u64) {
        self.config.delay_micros = delay_micros;
    }

    /// Install a host hook invoked once per expansion
    pub fn set_observer(&mut self, observer: Box<dyn SearchObserver<E::State>>) {
        self.observer = Some(observer);
    }

    /// Handle for cancelling the search from another thread
    pub fn stop_token(&self) -> StopToken {
        StopToken {
            flag: Arc::clone(&self.stop),
        }
    }

    /// Request cancellation; the in-flight expansion runs to completion
    pub fn stop(&self) {
        self.stop.store(true, Ordering::Relaxed);
    }

    /// States expanded by the last search, in expansion order
    pub fn explored_states(&self) -> &[E::State] {
        &self.explored
    }

    /// Expansion count of the last search
    pub fn state_expansions(&self) -> usize {
        self.state_expansions
    }

    /// Plan from `start` to `goal`, filling `out` with the world-space path
    ///
    /// Returns `false` on invalid endpoints, exhaustion, or cancellation;
    /// `out` is only written on success.
    pub fn plan(&mut self, start: &E::World, goal: &E::World, out: &mut Vec<E::World>) -> bool {
        match self.plan_checked(start, goal) {
            Ok(path) => {
                out.clear();
                out.extend(path);
                true
            }
            Err(_) => false,
        }
    }

    /// Like [`plan`](AStarPlanner::plan), but reports which way it failed
    pub fn plan_checked(
        &mut self,
        start: &E::World,
        goal: &E::World,
    ) -> PlanningResult<Vec<E::World>> {
        let requested_goal = goal.clone();

        let start_state = self.environment.world_to_planner(start);
        let goal_state = self.environment.world_to_planner(goal);

        if !self.environment.state_valid(&start_state) {
            warn!("plan failed: start state is invalid");
            return Err(PlanningError::InvalidStart);
        }
        if !self.environment.state_valid(&goal_state) {
            warn!("plan failed: goal state is invalid");
            return Err(PlanningError::InvalidGoal);
        }

        let start_id = self.environment.add_state(start_state);
        let goal_id = self.environment.add_state(goal_state);

        // Per-plan scratch. Nodes persist across calls; their per-search
        // fields must not.
        self.closed.clear();
        self.explored.clear();
        self.state_expansions = 0;
        self.stop.store(false, Ordering::Relaxed);
        self.environment.states_mut().reset_search();

        let timer = Timer::start();
        let found = self.search(start_id, goal_id);
        info!(
            "a* search terminated after {} state expansions in {} us",
            self.state_expansions,
            timer.elapsed_micros()
        );

        if !found {
            return if self.stop.load(Ordering::Relaxed) {
                Err(PlanningError::Cancelled)
            } else {
                Err(PlanningError::NoPath)
            };
        }

        // Walk parent pointers goal -> start, inclusive at both ends.
        let mut ids = Vec::new();
        let mut cursor = goal_id;
        loop {
            ids.push(cursor);
            if cursor == start_id {
                break;
            }
            match self.environment.states().node(cursor).parent() {
                Some(parent) => cursor = parent,
                None => break,
            }
        }
        ids.reverse();

        let mut path: Vec<E::World> = ids
            .iter()
            .map(|&id| {
                self.environment
                    .planner_to_world(self.environment.states().node(id).value())
            })
            .collect();

        // The goal may have snapped to a lattice cell; finish at the exact
        // requested pose.
        let snapped_goal = self
            .environment
            .planner_to_world(self.environment.states().node(goal_id).value());
        if snapped_goal != requested_goal {
            path.push(requested_goal);
        }

        info!("a* planner succeeded with {} states", path.len());
        Ok(path)
    }

    fn search(&mut self, start_id: NodeId, goal_id: NodeId) -> bool {
        let goal_value = self.environment.states().node(goal_id).value().clone();
        let start_value = self.environment.states().node(start_id).value().clone();

        let mut open = IndexedHeap::new();
        self.environment.states_mut().node_mut(start_id).set_g(0.0);
        let start_key = self.config.weight * self.heuristic.estimate(&start_value, &goal_value);
        open.push(self.environment.states_mut(), start_id, start_key);

        let mut neighbors: Vec<NodeId> = Vec::new();
        // Generation-time costs are advisory; relaxation re-queries the
        // environment edge by edge.
        let mut costs: Vec<f64> = Vec::new();

        while !open.is_empty() && !self.stop.load(Ordering::Relaxed) {
            let current_id = match open.pop(self.environment.states_mut()) {
                Some((id, _)) => id,
                None => break,
            };
            // Nodes generated over a no-edge keep an infinite path cost.
            // Once one pops, nothing reachable is left on the frontier.
            if !self.environment.states().node(current_id).g().is_finite() {
                break;
            }
            if current_id == goal_id {
                return true;
            }
            self.mark_closed(current_id);

            // States are generated unfiltered; stale invalid entries are
            // dropped here instead of being expanded.
            let current_value = self.environment.states().node(current_id).value().clone();
            if !self.environment.state_valid(&current_value) {
                continue;
            }

            self.explored.push(current_value.clone());
            self.state_expansions += 1;
            if let Some(observer) = self.observer.as_mut() {
                observer.on_expansion(&current_value, self.state_expansions);
            }
            if self.config.delay_micros > 0 {
                thread::sleep(Duration::from_micros(self.config.delay_micros));
            }

            neighbors.clear();
            costs.clear();
            self.environment
                .successors(current_id, &mut neighbors, &mut costs);
            let current_g = self.environment.states().node(current_id).g();

            for &neighbor_id in &neighbors {
                if self.is_closed(neighbor_id) {
                    continue;
                }

                let fresh = self.environment.states().node(neighbor_id).heap_slot() == NO_SLOT;
                if fresh {
                    let node = self.environment.states_mut().node_mut(neighbor_id);
                    node.set_g(INFINITE_COST);
                    node.set_parent(None);
                }

                let cost = self
                    .environment
                    .cost(
                        self.environment.states().node(current_id).value(),
                        self.environment.states().node(neighbor_id).value(),
                    )
                    .unwrap_or(INFINITE_COST);
                debug_assert!(cost >= 0.0, "negative edge cost");

                let improved = current_g + cost < self.environment.states().node(neighbor_id).g();
                if improved {
                    let node = self.environment.states_mut().node_mut(neighbor_id);
                    node.set_g(current_g + cost);
                    node.set_parent(Some(current_id));
                }

                let neighbor_g = self.environment.states().node(neighbor_id).g();
                let key = neighbor_g
                    + self.config.weight
                        * self
                            .heuristic
                            .estimate(self.environment.states().node(neighbor_id).value(), &goal_value);
                if fresh {
                    open.push(self.environment.states_mut(), neighbor_id, key);
                } else if improved {
                    open.decrease_key(self.environment.states_mut(), neighbor_id, key);
                }
            }
        }

        false
    }

    fn mark_closed(&mut self, id: NodeId) {
        let index = id as usize;
        if index >= self.closed.len() {
            self.closed.resize(index + 1, false);
        }
        self.closed[index] = true;
    }

    fn is_closed(&self, id: NodeId) -> bool {
        self.closed.get(id as usize).copied().unwrap_or(false)
    }
}
