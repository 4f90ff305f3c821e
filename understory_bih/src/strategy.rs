// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Split strategy trait used by [`Tree`](crate::Tree) when a leaf is distributed.

use core::fmt::Debug;

use crate::types::{Aabb3D, Axis, Interval, Point3};

/// Split descriptor of an internal node.
///
/// The two intervals describe the extents of the first and second child along
/// `axis`. They may overlap.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Split {
    /// Axis the node was split along.
    pub axis: Axis,
    /// Extents of the first and second child along `axis`.
    pub intervals: [Interval; 2],
    /// Score the split was accepted with. Higher is better.
    pub quality: f64,
}

/// A candidate split together with the regions the two children would cover.
///
/// Both child regions must lie within the node being split.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct SplitPlan {
    /// The split descriptor stored on the node if the plan is committed.
    pub split: Split,
    /// Regions of the first and second child.
    pub child_bounds: [Aabb3D; 2],
}

/// Split policy abstraction.
///
/// The tree owns its strategy and consults it only at structural-change time.
/// Objects are routed into a child when that child's region fully contains them,
/// first child first, so a plan should leave every object inside at least one
/// of the two child regions.
pub trait SplitStrategy: Debug {
    /// Find the best split for `objects` stored in a node covering `node_bounds`.
    ///
    /// Returns `None` if no split can be formed (for example fewer than two objects).
    /// The tree decides whether the plan's quality is good enough.
    fn plan(&mut self, node_bounds: &Aabb3D, objects: &[Aabb3D]) -> Option<SplitPlan>;

    /// Whether the first child should be visited before the second when looking
    /// from `viewpoint`.
    ///
    /// The default cuts the split axis at the middle of the gap between the two
    /// intervals. When they overlap (or the second encloses the first) it cuts at the
    /// lower end of the second interval instead, so a viewpoint inside the second child
    /// visits it first.
    fn first_is_near(&self, split: &Split, children: [&Aabb3D; 2], viewpoint: Point3) -> bool {
        let _ = children;
        let [first, second] = split.intervals;
        let second_min = f64::from(second.min);
        let cut = (0.5 * (f64::from(first.max) + second_min)).min(second_min);
        f64::from(viewpoint[split.axis.index()]) <= cut
    }
}
