// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Bounding interval hierarchy split search.

use alloc::vec::Vec;

use crate::strategy::{Split, SplitPlan, SplitStrategy};
use crate::types::{Aabb3D, Axis, Interval, max_t, min_t};

/// Six-candidate BIH split search.
///
/// For every axis the objects are split at the median twice: once ordered by their
/// lower bounds and once by their upper bounds. Each candidate yields the interval
/// covering the lower half and the interval covering the upper half, and is scored by
/// the gap between them (see the [module docs](crate::strategies)). The best of the
/// six wins; ties keep the earlier candidate (x before y before z, lower bounds first).
///
/// Children cover the parent's region clipped to their interval.
#[derive(Clone, Debug, Default)]
pub struct IntervalSplit {
    scratch: Vec<Interval>,
}

impl IntervalSplit {
    /// Create a strategy with empty scratch storage.
    pub fn new() -> Self {
        Self::default()
    }

    fn candidate(&mut self, objects: &[Aabb3D], axis: Axis, by_min: bool) -> Split {
        let set = &mut self.scratch;
        set.clear();
        set.extend(objects.iter().map(|o| o.interval(axis)));

        let n = set.len();
        let half = n >> 1;
        let (first, second) = if by_min {
            set.sort_unstable_by(|a, b| a.min.total_cmp(&b.min));
            (
                Interval::new(set[0].min, upper_end(&set[..half])),
                Interval::new(set[half].min, upper_end(&set[half..])),
            )
        } else {
            set.sort_unstable_by(|a, b| a.max.total_cmp(&b.max));
            (
                Interval::new(lower_end(&set[..half]), set[half - 1].max),
                Interval::new(lower_end(&set[half..]), set[n - 1].max),
            )
        };

        // Scored in median order, before any reordering below.
        let quality = f64::from(second.min) - f64::from(first.max);

        // A contained interval goes first so routing tries the tighter child first.
        let intervals = if first.contains(&second) {
            [second, first]
        } else {
            [first, second]
        };

        Split {
            axis,
            intervals,
            quality,
        }
    }
}

impl SplitStrategy for IntervalSplit {
    fn plan(&mut self, node_bounds: &Aabb3D, objects: &[Aabb3D]) -> Option<SplitPlan> {
        if objects.len() < 2 {
            return None;
        }
        let mut best: Option<Split> = None;
        for axis in Axis::ALL {
            for by_min in [true, false] {
                let candidate = self.candidate(objects, axis, by_min);
                if best.is_none_or(|b| candidate.quality > b.quality) {
                    best = Some(candidate);
                }
            }
        }
        let split = best?;
        Some(SplitPlan {
            split,
            child_bounds: [
                node_bounds.with_interval(split.axis, split.intervals[0]),
                node_bounds.with_interval(split.axis, split.intervals[1]),
            ],
        })
    }
}

fn upper_end(set: &[Interval]) -> f32 {
    set.iter().fold(-f32::MAX, |acc, i| max_t(acc, i.max))
}

fn lower_end(set: &[Interval]) -> f32 {
    set.iter().fold(f32::MAX, |acc, i| min_t(acc, i.min))
}
