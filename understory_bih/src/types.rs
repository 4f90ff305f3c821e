// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Primitive geometry types and helpers.

use core::cmp::Ordering;

use crate::arena::ArenaKey;

/// A point or extent in 3D, indexed by [`Axis`].
pub type Point3 = [f32; 3];

/// One of the three coordinate axes.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Axis {
    /// The x axis.
    X = 0,
    /// The y axis.
    Y = 1,
    /// The z axis.
    Z = 2,
}

impl Axis {
    /// All axes in evaluation order.
    pub const ALL: [Self; 3] = [Self::X, Self::Y, Self::Z];

    /// Component index of this axis into a [`Point3`].
    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }
}

/// A closed interval `[min, max]` along one axis.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Interval {
    /// Lower end.
    pub min: f32,
    /// Upper end.
    pub max: f32,
}

impl Interval {
    /// Create a new interval.
    pub const fn new(min: f32, max: f32) -> Self {
        Self { min, max }
    }

    /// Whether `other` lies completely inside this interval.
    pub fn contains(&self, other: &Self) -> bool {
        le(self.min, other.min) && le(other.max, self.max)
    }

    /// Whether the value lies inside this interval.
    pub fn contains_value(&self, v: f32) -> bool {
        le(self.min, v) && le(v, self.max)
    }
}

/// Axis-aligned bounding box in 3D.
///
/// Callers must keep `min[i] <= max[i]` on every axis. The tree checks this only
/// in debug builds and never repairs a malformed box.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Aabb3D {
    /// Minimum corner.
    pub min: Point3,
    /// Maximum corner.
    pub max: Point3,
}

impl Aabb3D {
    /// The whole representable space. This is the region covered by a root node.
    pub const EVERYTHING: Self = Self {
        min: [-f32::MAX; 3],
        max: [f32::MAX; 3],
    };

    /// Create a new AABB from min/max corners.
    pub const fn new(min: Point3, max: Point3) -> Self {
        Self { min, max }
    }

    /// Create an AABB from a center and half extents.
    pub fn from_center(center: Point3, half: Point3) -> Self {
        Self {
            min: [
                center[0] - half[0],
                center[1] - half[1],
                center[2] - half[2],
            ],
            max: [
                center[0] + half[0],
                center[1] + half[1],
                center[2] + half[2],
            ],
        }
    }

    /// A degenerate box covering a single point.
    pub const fn from_point(p: Point3) -> Self {
        Self { min: p, max: p }
    }

    /// Extent of this box along `axis`.
    #[inline]
    pub fn interval(&self, axis: Axis) -> Interval {
        Interval::new(self.min[axis.index()], self.max[axis.index()])
    }

    /// This box with its extent along `axis` replaced by `interval`.
    pub fn with_interval(mut self, axis: Axis, interval: Interval) -> Self {
        self.min[axis.index()] = interval.min;
        self.max[axis.index()] = interval.max;
        self
    }

    /// Center point.
    pub fn center(&self) -> Point3 {
        [
            mid(self.min[0], self.max[0]),
            mid(self.min[1], self.max[1]),
            mid(self.min[2], self.max[2]),
        ]
    }

    /// Size along each axis. Never negative.
    pub fn size(&self) -> Point3 {
        [
            (self.max[0] - self.min[0]).max(0.0),
            (self.max[1] - self.min[1]).max(0.0),
            (self.max[2] - self.min[2]).max(0.0),
        ]
    }

    /// The axis along which this box is largest. Ties prefer the earlier axis.
    pub fn longest_axis(&self) -> Axis {
        let s = self.size();
        if s[0] >= s[1] && s[0] >= s[2] {
            Axis::X
        } else if s[1] >= s[2] {
            Axis::Y
        } else {
            Axis::Z
        }
    }

    /// Whether `other` lies completely inside this box.
    pub fn contains(&self, other: &Self) -> bool {
        (0..3).all(|i| le(self.min[i], other.min[i]) && le(other.max[i], self.max[i]))
    }

    /// Whether this box contains the point.
    pub fn contains_point(&self, p: Point3) -> bool {
        (0..3).all(|i| le(self.min[i], p[i]) && le(p[i], self.max[i]))
    }

    /// Whether the two boxes overlap (touching counts).
    pub fn intersects(&self, other: &Self) -> bool {
        (0..3).all(|i| le(self.min[i], other.max[i]) && le(other.min[i], self.max[i]))
    }

    /// Smallest box containing both.
    pub fn union(&self, other: &Self) -> Self {
        Self {
            min: [
                min_t(self.min[0], other.min[0]),
                min_t(self.min[1], other.min[1]),
                min_t(self.min[2], other.min[2]),
            ],
            max: [
                max_t(self.max[0], other.max[0]),
                max_t(self.max[1], other.max[1]),
                max_t(self.max[2], other.max[2]),
            ],
        }
    }

    /// Return true if every bound is finite and `min <= max` on every axis.
    pub fn is_valid(&self) -> bool {
        (0..3).all(|i| {
            self.min[i].is_finite() && self.max[i].is_finite() && le(self.min[i], self.max[i])
        })
    }
}

/// Handle of an object stored in a [`Tree`](crate::Tree).
///
/// A small, copyable handle that stays valid while the object moves between nodes and
/// becomes stale once the object is removed. It consists of a slot index and a
/// generation counter.
///
/// ## Semantics
///
/// - On insert, a fresh slot is allocated with generation `1`.
/// - On remove (or [`Tree::clear`](crate::Tree::clear)), the slot is freed; any existing
///   `ObjectId` that pointed to it is now stale.
/// - On reuse of a freed slot, its generation is incremented, producing a new, distinct `ObjectId`.
///
/// Stale handles never alias a different live object because the generation must match.
/// Use [`Tree::contains`](crate::Tree::contains) to check liveness.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct ObjectId(u32, u32);

/// Handle of a node of a [`Tree`](crate::Tree).
///
/// Nodes are created when a leaf is split and released when their parent is flattened,
/// so a `NodeId` obtained during one traversal may be stale after the next structural
/// change. The root keeps its handle for the lifetime of the tree.
/// Use [`Tree::is_alive`](crate::Tree::is_alive) to check liveness.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct NodeId(u32, u32);

impl ArenaKey for ObjectId {
    fn from_parts(idx: u32, generation: u32) -> Self {
        Self(idx, generation)
    }

    fn idx(self) -> usize {
        self.0 as usize
    }

    fn generation(self) -> u32 {
        self.1
    }
}

impl ArenaKey for NodeId {
    fn from_parts(idx: u32, generation: u32) -> Self {
        Self(idx, generation)
    }

    fn idx(self) -> usize {
        self.0 as usize
    }

    fn generation(self) -> u32 {
        self.1
    }
}

/// Volume of an AABB, widened to `f64`.
///
/// The root covers `±f32::MAX`, whose volume only fits in the widened type.
#[inline]
pub fn volume(a: &Aabb3D) -> f64 {
    (0..3)
        .map(|i| (f64::from(a.max[i]) - f64::from(a.min[i])).max(0.0))
        .product()
}

/// Union of a non-empty sequence of boxes; `None` for an empty one.
pub fn union_all<'a>(boxes: impl IntoIterator<Item = &'a Aabb3D>) -> Option<Aabb3D> {
    let mut it = boxes.into_iter();
    let first = *it.next()?;
    Some(it.fold(first, |acc, b| acc.union(b)))
}

#[inline]
fn mid(a: f32, b: f32) -> f32 {
    0.5 * a + 0.5 * b
}

pub(crate) fn min_t<T: PartialOrd + Copy>(a: T, b: T) -> T {
    match a.partial_cmp(&b) {
        Some(Ordering::Greater) => b,
        _ => a,
    }
}

pub(crate) fn max_t<T: PartialOrd + Copy>(a: T, b: T) -> T {
    match a.partial_cmp(&b) {
        Some(Ordering::Less) => b,
        _ => a,
    }
}

pub(crate) fn le<T: PartialOrd>(a: T, b: T) -> bool {
    a.partial_cmp(&b)
        .map(|o| o != Ordering::Greater)
        .unwrap_or(false)
}
