// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Bounding volume hierarchy split search.

use alloc::vec::Vec;

use crate::strategy::{Split, SplitPlan, SplitStrategy};
use crate::types::{Aabb3D, Point3, union_all, volume};

/// Longest-axis median split with tight child bounds.
///
/// Objects are ordered by their center along the longest axis of their union and split
/// in half. Each child is bounded by exactly its half. Quality is the volume of the union
/// minus the volumes of both halves, in widened `f64`: positive when the split cuts away
/// empty space, zero or negative when the halves overlap heavily.
#[derive(Clone, Debug, Default)]
pub struct MedianSplit {
    scratch: Vec<(f32, Aabb3D)>,
}

impl MedianSplit {
    /// Create a strategy with empty scratch storage.
    pub fn new() -> Self {
        Self::default()
    }
}

impl SplitStrategy for MedianSplit {
    fn plan(&mut self, _node_bounds: &Aabb3D, objects: &[Aabb3D]) -> Option<SplitPlan> {
        if objects.len() < 2 {
            return None;
        }
        let all = union_all(objects)?;
        let axis = all.longest_axis();

        let set = &mut self.scratch;
        set.clear();
        set.extend(objects.iter().map(|o| (o.center()[axis.index()], *o)));
        set.sort_unstable_by(|a, b| a.0.total_cmp(&b.0));

        let half = set.len() >> 1;
        let left = union_all(set[..half].iter().map(|(_, b)| b))?;
        let right = union_all(set[half..].iter().map(|(_, b)| b))?;
        let quality = volume(&all) - volume(&left) - volume(&right);

        Some(SplitPlan {
            split: Split {
                axis,
                intervals: [left.interval(axis), right.interval(axis)],
                quality,
            },
            child_bounds: [left, right],
        })
    }

    /// Visit first the child whose center lies on the viewpoint's side of the midpoint
    /// between both child centers.
    fn first_is_near(&self, _split: &Split, children: [&Aabb3D; 2], viewpoint: Point3) -> bool {
        let c0 = children[0].center();
        let c1 = children[1].center();
        let mut dot = 0.0_f64;
        for i in 0..3 {
            let dir = f64::from(c1[i]) - f64::from(c0[i]);
            let mid = 0.5 * (f64::from(c0[i]) + f64::from(c1[i]));
            dot += dir * (f64::from(viewpoint[i]) - mid);
        }
        dot <= 0.0
    }
}
