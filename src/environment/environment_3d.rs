//! Bounded 3D lattice environment
//!
//! Discretizes SE(3) into integer cells: positions at `step_size`
//! granularity, rotations at `rotation_step_size` granularity on the
//! pitch (x), yaw (y), roll (z) axes, composed roll ∘ yaw ∘ pitch. A state
//! is admissible when the active model's six extremal mesh points stay
//! inside the bounding box and the model clears every obstacle.
//!
//! Successor generation is driven by the active model's motion primitives,
//! with translations applied in the body frame: a "forward" primitive moves
//! along wherever the current rotation points.

use log::warn;
use nalgebra::{UnitQuaternion, Vector3};
use std::f32::consts::{FRAC_PI_2, PI};

use crate::common::traits::Environment;
use crate::common::types::{lattice_hash, Aabb, LatticePose, Transform3D};
use crate::environment::model::Model;
use crate::planning::state_table::{NodeId, StateTable};

/// A motion primitive discretized onto the lattice
#[derive(Debug, Clone, Copy, PartialEq)]
struct LatticeAction {
    delta_position: Vector3<i32>,
    delta_rotation: Vector3<i32>,
    cost: f64,
}

/// Lattice environment over a bounded axis-aligned region
///
/// Interned states persist for the environment's lifetime, so repeated
/// planning queries reuse earlier discoveries; invalid states are interned
/// separately both as a memo and as a diagnostics readout.
pub struct Environment3D {
    origin: Vector3<f32>,
    size: Vector3<f32>,
    step_size: f32,
    rotation_step_size: f32,
    num_rotations: i32,
    bounding_box: Aabb,
    active_object: Option<Model>,
    obstacles: Vec<Model>,
    states: StateTable<LatticePose>,
    invalid_states: StateTable<LatticePose>,
    action_set: Vec<LatticeAction>,
}

impl Environment3D {
    /// Environment centered on `origin` spanning `size` in each dimension
    pub fn new(origin: Vector3<f32>, size: Vector3<f32>) -> Self {
        let mut env = Self {
            origin,
            size,
            step_size: 1.0,
            rotation_step_size: FRAC_PI_2,
            num_rotations: 4,
            bounding_box: Aabb::new(origin, origin),
            active_object: None,
            obstacles: Vec::new(),
            states: StateTable::new(lattice_hash),
            invalid_states: StateTable::new(lattice_hash),
            action_set: Vec::new(),
        };
        env.update_bounding_box();
        env
    }

    pub fn set_origin(&mut self, origin: Vector3<f32>) {
        self.origin = origin;
        self.update_bounding_box();
    }

    pub fn origin(&self) -> Vector3<f32> {
        self.origin
    }

    pub fn set_size(&mut self, size: Vector3<f32>) {
        self.size = size;
        self.update_bounding_box();
    }

    pub fn size(&self) -> Vector3<f32> {
        self.size
    }

    /// World length of one lattice cell; invalidates the cached action set
    pub fn set_step_size(&mut self, step_size: f32) {
        self.step_size = step_size;
        self.action_set.clear();
    }

    pub fn step_size(&self) -> f32 {
        self.step_size
    }

    /// Radians per rotation index; invalidates the cached action set
    ///
    /// A step above 2π would make zero rotation bins; the count is clamped
    /// to one, which degenerates rotation to the identity.
    pub fn set_rotation_step_size(&mut self, rotation_step_size: f32) {
        self.rotation_step_size = rotation_step_size;
        self.num_rotations = ((2.0 * PI / rotation_step_size).floor() as i32).max(1);
        self.action_set.clear();
    }

    pub fn rotation_step_size(&self) -> f32 {
        self.rotation_step_size
    }

    pub fn num_rotations(&self) -> i32 {
        self.num_rotations
    }

    pub fn set_active_object(&mut self, model: &Model) {
        self.active_object = Some(model.clone());
        self.action_set.clear();
    }

    pub fn active_object(&self) -> Option<&Model> {
        self.active_object.as_ref()
    }

    pub fn add_obstacle(&mut self, obstacle: &Model) {
        self.obstacles.push(obstacle.clone());
    }

    pub fn obstacles(&self) -> &[Model] {
        &self.obstacles
    }

    pub fn bounding_box(&self) -> &Aabb {
        &self.bounding_box
    }

    /// States found inadmissible so far, for diagnostics
    pub fn invalid_states(&self) -> &StateTable<LatticePose> {
        &self.invalid_states
    }

    fn update_bounding_box(&mut self) {
        let half = self.size * 0.5;
        self.bounding_box = Aabb::new(self.origin - half, self.origin + half);
    }

    /// World rotation a lattice pose denotes
    ///
    /// nalgebra's euler order (x, then y, then z) matches the pitch/yaw/roll
    /// axis naming here, so the composition comes out roll ∘ yaw ∘ pitch.
    fn lattice_rotation(&self, pose: &LatticePose) -> UnitQuaternion<f32> {
        UnitQuaternion::from_euler_angles(
            pose.pitch as f32 * self.rotation_step_size,
            pose.yaw as f32 * self.rotation_step_size,
            pose.roll as f32 * self.rotation_step_size,
        )
    }

    fn discretize_angle(&self, angle: f32) -> i32 {
        ((angle / self.rotation_step_size).round() as i32).rem_euclid(self.num_rotations)
    }

    /// Full admissibility check on a world pose
    fn is_valid(&self, world: &Transform3D) -> bool {
        let Some(active) = self.active_object.as_ref() else {
            warn!("environment has no active object; every state is invalid");
            return false;
        };
        if !self.in_bounds(active, world) {
            return false;
        }
        self.obstacles
            .iter()
            .all(|obstacle| !active.would_collide_with(world, obstacle))
    }

    /// All six extremal mesh points inside the bounding box (closed)
    fn in_bounds(&self, model: &Model, world: &Transform3D) -> bool {
        model
            .mesh()
            .extreme_points()
            .iter()
            .all(|p| self.bounding_box.contains(&world.transform_point(p)))
    }

    fn rebuild_action_set(&mut self) {
        let Some(active) = self.active_object.as_ref() else {
            warn!("no active object; successor generation has no action set");
            return;
        };
        let n = self.num_rotations;
        let step = self.step_size;
        let rotation_step = self.rotation_step_size;
        self.action_set = active
            .primitives()
            .iter()
            .map(|p| LatticeAction {
                delta_position: Vector3::new(
                    (p.translation.x / step).round() as i32,
                    (p.translation.y / step).round() as i32,
                    (p.translation.z / step).round() as i32,
                ),
                delta_rotation: Vector3::new(
                    ((p.rotation.x / rotation_step).round() as i32).rem_euclid(n),
                    ((p.rotation.y / rotation_step).round() as i32).rem_euclid(n),
                    ((p.rotation.z / rotation_step).round() as i32).rem_euclid(n),
                ),
                cost: p.cost,
            })
            .collect();
    }
}

impl Environment for Environment3D {
    type State = LatticePose;
    type World = Transform3D;

    fn world_to_planner(&self, world: &Transform3D) -> LatticePose {
        let (pitch, yaw, roll) = world.rotation.euler_angles();
        LatticePose {
            x: (world.position.x / self.step_size).round() as i32,
            y: (world.position.y / self.step_size).round() as i32,
            z: (world.position.z / self.step_size).round() as i32,
            pitch: self.discretize_angle(pitch),
            yaw: self.discretize_angle(yaw),
            roll: self.discretize_angle(roll),
        }
    }

    fn planner_to_world(&self, state: &LatticePose) -> Transform3D {
        Transform3D {
            position: Vector3::new(
                state.x as f32 * self.step_size,
                state.y as f32 * self.step_size,
                state.z as f32 * self.step_size,
            ),
            scale: Vector3::new(1.0, 1.0, 1.0),
            rotation: self.lattice_rotation(state),
        }
    }

    fn state_valid(&mut self, state: &LatticePose) -> bool {
        // Memoized verdict first; invalid states are interned exactly once.
        if self.invalid_states.get(state).is_some() {
            return false;
        }
        let world = self.planner_to_world(state);
        if !self.is_valid(&world) {
            self.invalid_states.intern(*state);
            return false;
        }
        true
    }

    fn add_state(&mut self, state: LatticePose) -> NodeId {
        self.states.intern(state)
    }

    fn successors(&mut self, node: NodeId, neighbors: &mut Vec<NodeId>, costs: &mut Vec<f64>) {
        if self.action_set.is_empty() {
            self.rebuild_action_set();
        }

        let current = *self.states.node(node).value();
        let rotation = self.lattice_rotation(&current);
        let n = self.num_rotations;
        let step = self.step_size;

        for action in &self.action_set {
            // Express the translation in the body frame, then re-round onto
            // the lattice: rotated steps rarely land on exact cell centers.
            let world_translation = Vector3::new(
                action.delta_position.x as f32 * step,
                action.delta_position.y as f32 * step,
                action.delta_position.z as f32 * step,
            );
            let rotated = rotation * world_translation;

            let successor = LatticePose {
                x: current.x + (rotated.x / step).round() as i32,
                y: current.y + (rotated.y / step).round() as i32,
                z: current.z + (rotated.z / step).round() as i32,
                pitch: (current.pitch + action.delta_rotation.x).rem_euclid(n),
                yaw: (current.yaw + action.delta_rotation.y).rem_euclid(n),
                roll: (current.roll + action.delta_rotation.z).rem_euclid(n),
            };

            // Unfiltered by validity: the planner rejects at expansion time,
            // so the table sees every reachable state and the validity memo
            // can do its job.
            neighbors.push(self.states.intern(successor));
            costs.push(action.cost);
        }
    }

    fn cost(&self, from: &LatticePose, to: &LatticePose) -> Option<f64> {
        // L1 on the combined lattice. Rotation indices do not wrap here;
        // the stored index distance is the cost.
        Some(
            ((from.x - to.x).abs()
                + (from.y - to.y).abs()
                + (from.z - to.z).abs()
                + (from.pitch - to.pitch).abs()
                + (from.yaw - to.yaw).abs()
                + (from.roll - to.roll).abs()) as f64,
        )
    }

    fn states(&self) -> &StateTable<LatticePose> {
        &self.states
    }

    fn states_mut(&mut self) -> &mut StateTable<LatticePose> {
        &mut self.states
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::environment::model::{Mesh, MotionPrimitive};
    use std::f32::consts::{FRAC_PI_2, TAU};

    fn unit_cube_model() -> Model {
        Model::with_primitives(
            Mesh::cuboid(Vector3::new(0.5, 0.5, 0.5)),
            MotionPrimitive::axis_aligned(1.0, FRAC_PI_2),
        )
    }

    fn test_env() -> Environment3D {
        let mut env = Environment3D::new(Vector3::zeros(), Vector3::new(10.0, 10.0, 10.0));
        env.set_step_size(1.0);
        env.set_rotation_step_size(FRAC_PI_2);
        env.set_active_object(&unit_cube_model());
        env
    }

    fn successor_values(env: &mut Environment3D, pose: LatticePose) -> Vec<LatticePose> {
        let id = env.add_state(pose);
        let mut neighbors = Vec::new();
        let mut costs = Vec::new();
        env.successors(id, &mut neighbors, &mut costs);
        neighbors
            .iter()
            .map(|&n| *env.states().node(n).value())
            .collect()
    }

    #[test]
    fn test_round_trip_on_integer_projection() {
        let env = test_env();
        let poses = [
            LatticePose::from_position(0, 0, 0),
            LatticePose::from_position(3, -2, 5),
            LatticePose::new(2, 1, 0, 1, 0, 0),
            LatticePose::new(0, 0, 0, 0, 1, 0),
            LatticePose::new(4, 4, 4, 0, 0, 3),
            LatticePose::new(1, 1, 1, 3, 0, 0),
            LatticePose::new(0, 0, 0, 2, 0, 2),
            LatticePose::new(0, 0, 0, 1, 0, 1),
        ];
        for pose in poses {
            let world = env.planner_to_world(&pose);
            assert_eq!(env.world_to_planner(&world), pose, "pose {:?}", pose);
        }
    }

    #[test]
    fn test_world_to_planner_is_idempotent_after_first_pass() {
        let env = test_env();
        let world = Transform3D::new(
            Vector3::new(2.4, -1.6, 0.2),
            Vector3::new(1.0, 1.0, 1.0),
            UnitQuaternion::from_euler_angles(0.3, 0.4, 0.5),
        );
        let first = env.world_to_planner(&world);
        let second = env.world_to_planner(&env.planner_to_world(&first));
        assert_eq!(first, second);
    }

    #[test]
    fn test_rotation_extracted_from_input_quaternion() {
        let env = test_env();
        let world = Transform3D::new(
            Vector3::zeros(),
            Vector3::new(1.0, 1.0, 1.0),
            UnitQuaternion::from_euler_angles(0.0, FRAC_PI_2, 0.0),
        );
        let pose = env.world_to_planner(&world);
        assert_eq!(pose, LatticePose::new(0, 0, 0, 0, 1, 0));
    }

    #[test]
    fn test_negative_angles_wrap_into_range() {
        let env = test_env();
        let world = Transform3D::new(
            Vector3::zeros(),
            Vector3::new(1.0, 1.0, 1.0),
            UnitQuaternion::from_euler_angles(-FRAC_PI_2, 0.0, 0.0),
        );
        let pose = env.world_to_planner(&world);
        assert_eq!(pose.pitch, 3);
        assert!(pose.pitch >= 0 && pose.pitch < env.num_rotations());
    }

    #[test]
    fn test_num_rotations_one_degenerates_to_translation() {
        let mut env = test_env();
        env.set_rotation_step_size(TAU);
        assert_eq!(env.num_rotations(), 1);

        let model = Model::with_primitives(
            Mesh::cuboid(Vector3::new(0.5, 0.5, 0.5)),
            MotionPrimitive::axis_aligned(1.0, TAU),
        );
        env.set_active_object(&model);

        let values = successor_values(&mut env, LatticePose::from_position(0, 0, 0));
        assert!(values
            .iter()
            .all(|v| v.pitch == 0 && v.yaw == 0 && v.roll == 0));
    }

    #[test]
    fn test_bounding_box_follows_origin_and_size() {
        let mut env = test_env();
        env.set_origin(Vector3::new(1.0, 0.0, 0.0));
        env.set_size(Vector3::new(4.0, 4.0, 4.0));
        assert_eq!(env.origin(), Vector3::new(1.0, 0.0, 0.0));
        assert_eq!(env.size(), Vector3::new(4.0, 4.0, 4.0));
        let bb = env.bounding_box();
        assert_eq!(bb.min, Vector3::new(-1.0, -2.0, -2.0));
        assert_eq!(bb.max, Vector3::new(3.0, 2.0, 2.0));
    }

    #[test]
    fn test_state_on_boundary_is_valid() {
        let mut env = test_env();
        env.set_step_size(0.5);
        // Cell 9 puts the cube's +x face exactly on the +x boundary.
        assert!(env.state_valid(&LatticePose::from_position(9, 0, 0)));
        assert!(!env.state_valid(&LatticePose::from_position(11, 0, 0)));
    }

    #[test]
    fn test_invalid_states_are_memoized() {
        let mut env = test_env();
        let outside = LatticePose::from_position(100, 0, 0);
        assert!(!env.state_valid(&outside));
        assert_eq!(env.invalid_states().len(), 1);
        // Second query hits the memo, not a second intern.
        assert!(!env.state_valid(&outside));
        assert_eq!(env.invalid_states().len(), 1);
    }

    #[test]
    fn test_collision_with_obstacle_invalidates_state() {
        let mut env = test_env();
        let mut obstacle = Model::new(Mesh::cuboid(Vector3::new(0.45, 0.45, 0.45)));
        obstacle.set_pose(Transform3D::from_position(Vector3::new(1.0, 0.0, 0.0)));
        env.add_obstacle(&obstacle);

        assert!(!env.state_valid(&LatticePose::from_position(1, 0, 0)));
        assert!(env.state_valid(&LatticePose::from_position(1, 1, 0)));
        assert!(env.state_valid(&LatticePose::from_position(0, 0, 0)));
    }

    #[test]
    fn test_successors_translate_in_body_frame() {
        let mut env = test_env();
        // Yaw of pi/2 turns the +x primitive into -z motion.
        let values = successor_values(&mut env, LatticePose::new(0, 0, 0, 0, 1, 0));
        assert!(values.contains(&LatticePose::new(0, 0, -1, 0, 1, 0)));
        assert!(values.contains(&LatticePose::new(0, 0, 1, 0, 1, 0)));
        // +y stays +y under a yaw rotation, and the +z primitive lands on +x.
        assert!(values.contains(&LatticePose::new(0, 1, 0, 0, 1, 0)));
        assert!(values.contains(&LatticePose::new(1, 0, 0, 0, 1, 0)));
    }

    #[test]
    fn test_successor_rotations_wrap_mod_num_rotations() {
        let mut env = test_env();
        let values = successor_values(&mut env, LatticePose::new(0, 0, 0, 3, 0, 0));
        assert!(values.contains(&LatticePose::new(0, 0, 0, 0, 0, 0)));
        assert!(values.contains(&LatticePose::new(0, 0, 0, 2, 0, 0)));
    }

    #[test]
    fn test_action_set_is_deterministic() {
        let mut a = test_env();
        let mut b = test_env();
        let pose = LatticePose::from_position(2, 2, 2);
        assert_eq!(successor_values(&mut a, pose), successor_values(&mut b, pose));
    }

    #[test]
    fn test_action_set_rebuilds_after_step_change() {
        let mut env = test_env();
        let before = successor_values(&mut env, LatticePose::from_position(0, 0, 0));
        // Halving the step doubles the lattice reach of the same primitives.
        env.set_step_size(0.5);
        let after = successor_values(&mut env, LatticePose::from_position(0, 0, 0));
        assert!(before.contains(&LatticePose::from_position(1, 0, 0)));
        assert!(after.contains(&LatticePose::from_position(2, 0, 0)));
    }

    #[test]
    fn test_cost_is_l1_without_rotation_wrap() {
        let env = test_env();
        let a = LatticePose::new(0, 0, 0, 0, 3, 0);
        let b = LatticePose::new(1, 0, 0, 0, 0, 0);
        assert_eq!(env.cost(&a, &b), Some(4.0));
        assert_eq!(env.cost(&a, &a), Some(0.0));
    }

    #[test]
    fn test_successors_do_not_touch_path_cost_or_parent() {
        let mut env = test_env();
        let id = env.add_state(LatticePose::from_position(0, 0, 0));
        env.states_mut().node_mut(id).set_g(7.0);
        let mut neighbors = Vec::new();
        let mut costs = Vec::new();
        env.successors(id, &mut neighbors, &mut costs);
        assert_eq!(env.states().node(id).g(), 7.0);
        assert!(neighbors
            .iter()
            .all(|&n| n == id || env.states().node(n).parent().is_none()));
        assert_eq!(neighbors.len(), costs.len());
    }
}
