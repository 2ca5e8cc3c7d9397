//! Common types used throughout motion_planning

use nalgebra::{UnitQuaternion, Vector3};

/// Rigid-body pose in continuous world space
///
/// Position and scale are plain vectors; rotation is a unit quaternion.
/// World poses carry no notion of equality beyond exact componentwise
/// comparison; discretized identity lives on [`LatticePose`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform3D {
    pub position: Vector3<f32>,
    pub scale: Vector3<f32>,
    pub rotation: UnitQuaternion<f32>,
}

impl Transform3D {
    pub fn new(position: Vector3<f32>, scale: Vector3<f32>, rotation: UnitQuaternion<f32>) -> Self {
        Self { position, scale, rotation }
    }

    /// Pose at the given position with unit scale and identity rotation
    pub fn from_position(position: Vector3<f32>) -> Self {
        Self {
            position,
            scale: Vector3::new(1.0, 1.0, 1.0),
            rotation: UnitQuaternion::identity(),
        }
    }

    pub fn identity() -> Self {
        Self::from_position(Vector3::zeros())
    }

    /// Apply scale, then rotation, then translation to a local-space point
    pub fn transform_point(&self, point: &Vector3<f32>) -> Vector3<f32> {
        self.rotation * point.component_mul(&self.scale) + self.position
    }
}

impl Default for Transform3D {
    fn default() -> Self {
        Self::identity()
    }
}

/// Discretized 6-DOF pose in planner space
///
/// `x`, `y`, `z` index translation cells; `pitch`, `yaw`, `roll` index
/// rotation steps. Rotation indices stay in `[0, num_rotations)`. Two
/// lattice poses denote the same search state exactly when all six
/// integers are equal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LatticePose {
    pub x: i32,
    pub y: i32,
    pub z: i32,
    pub pitch: i32,
    pub yaw: i32,
    pub roll: i32,
}

impl LatticePose {
    pub fn new(x: i32, y: i32, z: i32, pitch: i32, yaw: i32, roll: i32) -> Self {
        Self { x, y, z, pitch, yaw, roll }
    }

    /// Pose at the given cell with zero rotation indices
    pub fn from_position(x: i32, y: i32, z: i32) -> Self {
        Self::new(x, y, z, 0, 0, 0)
    }
}

/// Hash of a lattice pose: XOR of the six coordinates, each spread by a
/// fixed large prime. Used to key every [`StateTable`](crate::planning::StateTable)
/// in the 3D environment.
pub fn lattice_hash(pose: &LatticePose) -> i64 {
    const P1: i64 = 73_856_093;
    const P2: i64 = 19_349_663;
    const P3: i64 = 83_492_791;
    const P4: i64 = 3_331_333;
    const P5: i64 = 393_919;
    const P6: i64 = 39_916_801;

    (pose.x as i64 * P1)
        ^ (pose.y as i64 * P2)
        ^ (pose.z as i64 * P3)
        ^ (pose.pitch as i64 * P4)
        ^ (pose.yaw as i64 * P5)
        ^ (pose.roll as i64 * P6)
}

/// Axis-aligned box with closed-interval containment
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Vector3<f32>,
    pub max: Vector3<f32>,
}

impl Aabb {
    pub fn new(min: Vector3<f32>, max: Vector3<f32>) -> Self {
        Self { min, max }
    }

    pub fn from_center_half_extents(center: Vector3<f32>, half_extents: Vector3<f32>) -> Self {
        Self::new(center - half_extents, center + half_extents)
    }

    /// Smallest box covering all points; `None` for an empty iterator
    pub fn from_points<'a, I>(points: I) -> Option<Self>
    where
        I: IntoIterator<Item = &'a Vector3<f32>>,
    {
        let mut iter = points.into_iter();
        let first = *iter.next()?;
        let mut bounds = Self::new(first, first);
        for p in iter {
            bounds.min = bounds.min.inf(p);
            bounds.max = bounds.max.sup(p);
        }
        Some(bounds)
    }

    /// Containment on closed intervals: boundary points are inside
    pub fn contains(&self, point: &Vector3<f32>) -> bool {
        point.x >= self.min.x
            && point.x <= self.max.x
            && point.y >= self.min.y
            && point.y <= self.max.y
            && point.z >= self.min.z
            && point.z <= self.max.z
    }

    /// Overlap test on closed intervals: touching boxes intersect
    pub fn intersects(&self, other: &Aabb) -> bool {
        self.min.x <= other.max.x
            && self.max.x >= other.min.x
            && self.min.y <= other.max.y
            && self.max.y >= other.min.y
            && self.min.z <= other.max.z
            && self.max.z >= other.min.z
    }
}
