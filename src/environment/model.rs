//! Models the planner moves and collides
//!
//! A [`Model`] bundles the three things the search core consumes: a mesh
//! with precomputed axis-extremal points (the cheap in-bounds probe), a
//! world pose, and the model's own motion primitives. Collision checking is
//! the inexpensive world-AABB overlap of two posed meshes.

use itertools::iproduct;
use nalgebra::Vector3;

use crate::common::types::{Aabb, Transform3D};

/// Vertex cloud with cached axis-extremal points
#[derive(Debug, Clone)]
pub struct Mesh {
    vertices: Vec<Vector3<f32>>,
    extreme_points: [Vector3<f32>; 6],
}

impl Mesh {
    /// Build a mesh and cache its six extremal vertices
    ///
    /// Panics on an empty vertex list; a mesh with no extent cannot be
    /// bounded or collided.
    pub fn new(vertices: Vec<Vector3<f32>>) -> Self {
        assert!(!vertices.is_empty(), "mesh needs at least one vertex");

        let mut extreme_points = [vertices[0]; 6];
        for v in &vertices {
            if v.x < extreme_points[0].x {
                extreme_points[0] = *v;
            }
            if v.x > extreme_points[1].x {
                extreme_points[1] = *v;
            }
            if v.y < extreme_points[2].y {
                extreme_points[2] = *v;
            }
            if v.y > extreme_points[3].y {
                extreme_points[3] = *v;
            }
            if v.z < extreme_points[4].z {
                extreme_points[4] = *v;
            }
            if v.z > extreme_points[5].z {
                extreme_points[5] = *v;
            }
        }

        Self {
            vertices,
            extreme_points,
        }
    }

    /// Axis-aligned box mesh centered at the local origin
    pub fn cuboid(half_extents: Vector3<f32>) -> Self {
        let corners = iproduct!([-1.0f32, 1.0], [-1.0f32, 1.0], [-1.0f32, 1.0])
            .map(|(sx, sy, sz)| {
                Vector3::new(
                    sx * half_extents.x,
                    sy * half_extents.y,
                    sz * half_extents.z,
                )
            })
            .collect();
        Self::new(corners)
    }

    pub fn vertices(&self) -> &[Vector3<f32>] {
        &self.vertices
    }

    /// The six axis-extremal vertices: -x, +x, -y, +y, -z, +z
    pub fn extreme_points(&self) -> &[Vector3<f32>; 6] {
        &self.extreme_points
    }

    /// Bounds of every vertex under the given pose
    pub fn world_bounds(&self, pose: &Transform3D) -> Aabb {
        let transformed: Vec<Vector3<f32>> = self
            .vertices
            .iter()
            .map(|v| pose.transform_point(v))
            .collect();
        // Non-empty by construction, so the bounds always exist.
        Aabb::from_points(transformed.iter()).unwrap_or(Aabb::new(pose.position, pose.position))
    }
}

/// One primitive motion in the moving body's frame
///
/// Translation is in world units, rotation in radians on the pitch (x),
/// yaw (y), roll (z) axes. The environment discretizes both against its
/// step sizes when it builds the lattice action set.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MotionPrimitive {
    pub translation: Vector3<f32>,
    pub rotation: Vector3<f32>,
    pub cost: f64,
}

impl MotionPrimitive {
    pub fn translate(translation: Vector3<f32>, cost: f64) -> Self {
        Self {
            translation,
            rotation: Vector3::zeros(),
            cost,
        }
    }

    pub fn rotate(rotation: Vector3<f32>, cost: f64) -> Self {
        Self {
            translation: Vector3::zeros(),
            rotation,
            cost,
        }
    }

    /// Unit-cost single-axis primitives: one step forward and back on each
    /// translation axis, one rotation step either way on each rotation axis
    pub fn axis_aligned(step: f32, rotation_step: f32) -> Vec<MotionPrimitive> {
        let mut primitives = Vec::with_capacity(12);
        for axis in 0..3 {
            for sign in [-1.0f32, 1.0] {
                let mut translation = Vector3::zeros();
                translation[axis] = sign * step;
                primitives.push(Self::translate(translation, 1.0));
            }
        }
        for axis in 0..3 {
            for sign in [-1.0f32, 1.0] {
                let mut rotation = Vector3::zeros();
                rotation[axis] = sign * rotation_step;
                primitives.push(Self::rotate(rotation, 1.0));
            }
        }
        primitives
    }

    /// All 26 translation neighbors of the step cube, costed by L1 distance
    pub fn translation_neighborhood(step: f32) -> Vec<MotionPrimitive> {
        iproduct!(-1i32..=1, -1i32..=1, -1i32..=1)
            .filter(|&(i, j, k)| !(i == 0 && j == 0 && k == 0))
            .map(|(i, j, k)| {
                let translation = Vector3::new(i as f32, j as f32, k as f32) * step;
                Self::translate(translation, (i.abs() + j.abs() + k.abs()) as f64)
            })
            .collect()
    }
}

/// A rigid body in the environment: mesh, pose, and motion primitives
///
/// Obstacles only need a mesh and a pose; the primitive set matters for the
/// active object the planner steers.
#[derive(Debug, Clone)]
pub struct Model {
    mesh: Mesh,
    pose: Transform3D,
    primitives: Vec<MotionPrimitive>,
}

impl Model {
    pub fn new(mesh: Mesh) -> Self {
        Self {
            mesh,
            pose: Transform3D::identity(),
            primitives: Vec::new(),
        }
    }

    pub fn with_primitives(mesh: Mesh, primitives: Vec<MotionPrimitive>) -> Self {
        Self {
            mesh,
            pose: Transform3D::identity(),
            primitives,
        }
    }

    pub fn mesh(&self) -> &Mesh {
        &self.mesh
    }

    pub fn pose(&self) -> &Transform3D {
        &self.pose
    }

    pub fn set_pose(&mut self, pose: Transform3D) {
        self.pose = pose;
    }

    pub fn primitives(&self) -> &[MotionPrimitive] {
        &self.primitives
    }

    /// Whether this model at `pose` would overlap `other` at its own pose
    pub fn would_collide_with(&self, pose: &Transform3D, other: &Model) -> bool {
        self.mesh
            .world_bounds(pose)
            .intersects(&other.mesh.world_bounds(other.pose()))
    }
}
