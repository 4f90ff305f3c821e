// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Depth-first traversal in arbitrary and approximate front-to-back order.
//!
//! Both walks hand the visitor the tree itself, so the visitor may call
//! [`Tree::distribute`] on the node it is looking at and have the walk descend into
//! children created by that call. The walk never distributes on its own.

use alloc::vec;
use core::fmt::Debug;

use crate::strategy::SplitStrategy;
use crate::tree::{Kind, Tree};
use crate::types::{NodeId, Point3};

bitflags::bitflags! {
    /// Frustum planes a subtree still has to be tested against.
    ///
    /// A visitor that finds a node completely inside a plane clears that plane's bit;
    /// the narrowed mask is handed to the node's children only. Unnamed bits are
    /// preserved for callers with extra clip planes.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct PlaneMask: u32 {
        /// Left clip plane.
        const LEFT   = 0b0000_0001;
        /// Right clip plane.
        const RIGHT  = 0b0000_0010;
        /// Bottom clip plane.
        const BOTTOM = 0b0000_0100;
        /// Top clip plane.
        const TOP    = 0b0000_1000;
        /// Near clip plane.
        const NEAR   = 0b0001_0000;
        /// Far clip plane.
        const FAR    = 0b0010_0000;
        /// All six frustum planes.
        const FRUSTUM = Self::LEFT.bits()
            | Self::RIGHT.bits()
            | Self::BOTTOM.bits()
            | Self::TOP.bits()
            | Self::NEAR.bits()
            | Self::FAR.bits();

        const _ = !0;
    }
}

impl Default for PlaneMask {
    fn default() -> Self {
        Self::FRUSTUM
    }
}

impl<P: Copy + Debug, S: SplitStrategy> Tree<P, S> {
    /// Visit nodes depth first, in no particular order.
    ///
    /// `visit` is called for every reached node with the mask inherited from its parent.
    /// Returning `false` skips the node's subtree. Otherwise the walk continues into the
    /// node's children, as they are after `visit` returns.
    pub fn traverse_random<F>(&mut self, mask: PlaneMask, mut visit: F)
    where
        F: FnMut(&mut Self, NodeId, &mut PlaneMask) -> bool,
    {
        let mut stack = vec![(self.root, mask)];
        while let Some((id, mut mask)) = stack.pop() {
            if !self.is_alive(id) || !visit(self, id, &mut mask) {
                continue;
            }
            if let Some([first, second]) = self.children(id) {
                stack.push((second, mask));
                stack.push((first, mask));
            }
        }
    }

    /// Visit nodes depth first, nearer child first as seen from `viewpoint`.
    ///
    /// Same contract as [`traverse_random`](Self::traverse_random). At every internal
    /// node the whole subtree of the near child is visited before the far child. Which
    /// child is near is decided by the tree's [`SplitStrategy`]. Children of a BIH node
    /// may overlap, so the order is only approximately front to back.
    pub fn front_to_back<F>(&mut self, viewpoint: Point3, mask: PlaneMask, mut visit: F)
    where
        F: FnMut(&mut Self, NodeId, &mut PlaneMask) -> bool,
    {
        let mut stack = vec![(self.root, mask)];
        while let Some((id, mut mask)) = stack.pop() {
            if !self.is_alive(id) || !visit(self, id, &mut mask) {
                continue;
            }
            let Kind::Internal { split, children } = self.node(id).kind else {
                continue;
            };
            let bounds = children.map(|c| &self.node(c).bounds);
            let [near, far] = if self.strategy.first_is_near(&split, bounds, viewpoint) {
                children
            } else {
                [children[1], children[0]]
            };
            stack.push((far, mask));
            stack.push((near, mask));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::tree::{Bih, Bvh};
    use crate::types::Aabb3D;
    use alloc::vec::Vec;

    fn unit_at(x: f32, y: f32, z: f32) -> Aabb3D {
        Aabb3D::from_center([x, y, z], [0.5; 3])
    }

    fn spread<S: SplitStrategy>(tree: &mut Tree<u16, S>, n: u16) {
        for i in 0..n {
            let y = f32::from(i * 7 % 13);
            tree.insert(unit_at(f32::from(i) * 10.0, y, 0.0), i);
        }
        tree.full_distribute();
        tree.assert_invariants();
    }

    /// X extents of the objects of every leaf, in visit order.
    fn leaf_spans<S: SplitStrategy>(tree: &mut Tree<u16, S>, viewpoint: Point3) -> Vec<(f32, f32)> {
        let mut spans = Vec::new();
        tree.front_to_back(viewpoint, PlaneMask::default(), |t, id, _| {
            if t.is_leaf(id) {
                let xs = t
                    .node_objects(id)
                    .iter()
                    .filter_map(|o| t.object_bounds(*o))
                    .map(|b| b.center()[0]);
                let span = xs.fold((f32::MAX, f32::MIN), |(lo, hi), x| (lo.min(x), hi.max(x)));
                spans.push(span);
            }
            true
        });
        spans
    }

    #[test]
    fn front_to_back_visits_near_subtree_first() {
        let mut tree: Bih<u16> = Bih::new();
        spread(&mut tree, 120);
        assert!(tree.node_count() > 3);

        let spans = leaf_spans(&mut tree, [-1000.0, 0.0, 0.0]);
        assert!(spans.len() > 2);
        assert!(spans.windows(2).all(|w| w[0].1 < w[1].0), "{spans:?}");

        let spans = leaf_spans(&mut tree, [1.0e6, 0.0, 0.0]);
        assert!(spans.windows(2).all(|w| w[0].0 > w[1].1), "{spans:?}");
    }

    #[test]
    fn front_to_back_with_tight_children() {
        let mut tree: Bvh<u16> = Bvh::new();
        spread(&mut tree, 120);
        assert!(tree.node_count() > 3);

        let spans = leaf_spans(&mut tree, [-1000.0, 0.0, 0.0]);
        assert!(spans.windows(2).all(|w| w[0].1 < w[1].0), "{spans:?}");
        let spans = leaf_spans(&mut tree, [5000.0, 0.0, 0.0]);
        assert!(spans.windows(2).all(|w| w[0].0 > w[1].1), "{spans:?}");
    }

    #[test]
    fn viewpoint_between_children_visits_closer_one_first() {
        let mut tree: Bih<u16> = Tree::with_config(Config {
            min_split_objects: 2,
            ..Config::default()
        });
        tree.insert(unit_at(0.0, 0.0, 0.0), 0);
        tree.insert(unit_at(100.0, 0.0, 0.0), 1);
        tree.full_distribute();
        assert!(tree.children(tree.root()).is_some());

        let order = |tree: &mut Bih<u16>, viewpoint: Point3| {
            let mut out = Vec::new();
            tree.front_to_back(viewpoint, PlaneMask::default(), |t, id, _| {
                out.extend(t.node_objects(id).iter().filter_map(|o| t.payload(*o)));
                true
            });
            out
        };
        assert_eq!(order(&mut tree, [2.0, 0.0, 0.0]), [0, 1]);
        assert_eq!(order(&mut tree, [98.0, 0.0, 0.0]), [1, 0]);
    }

    #[test]
    fn rejecting_a_node_prunes_its_subtree() {
        let mut tree: Bih<u16> = Bih::new();
        spread(&mut tree, 60);
        let mut visited = 0;
        tree.traverse_random(PlaneMask::default(), |_, _, _| {
            visited += 1;
            false
        });
        assert_eq!(visited, 1);

        let mut visited = 0;
        tree.traverse_random(PlaneMask::default(), |_, _, _| {
            visited += 1;
            true
        });
        assert_eq!(visited, tree.node_count());
    }

    #[test]
    fn narrowed_mask_reaches_only_descendants() {
        let mut tree: Bih<u16> = Bih::new();
        spread(&mut tree, 60);
        let root = tree.root();
        let [first, second] = tree.children(root).expect("root is split");

        let mut seen = Vec::new();
        tree.traverse_random(PlaneMask::FRUSTUM, |_, id, mask| {
            seen.push((id, *mask));
            if id == root {
                mask.remove(PlaneMask::LEFT);
            } else if id == first {
                mask.remove(PlaneMask::NEAR);
            }
            true
        });

        let mask_of = |id| seen.iter().find(|(n, _)| *n == id).map(|(_, m)| *m);
        assert_eq!(mask_of(root), Some(PlaneMask::FRUSTUM));
        assert_eq!(mask_of(first), Some(PlaneMask::FRUSTUM - PlaneMask::LEFT));
        assert_eq!(mask_of(second), Some(PlaneMask::FRUSTUM - PlaneMask::LEFT));
        let [inner, _] = tree.children(first).expect("thirty objects split");
        assert_eq!(
            mask_of(inner),
            Some(PlaneMask::FRUSTUM - PlaneMask::LEFT - PlaneMask::NEAR)
        );
    }

    #[test]
    fn visitor_can_distribute_lazily() {
        let mut tree: Bih<u16> = Tree::with_config(Config {
            min_split_objects: 2,
            ..Config::default()
        });
        for i in 0..3 {
            tree.insert(unit_at(f32::from(i) * 100.0, 0.0, 0.0), i);
        }
        assert_eq!(tree.node_count(), 1);

        let mut visited = 0;
        tree.traverse_random(PlaneMask::default(), |t, id, _| {
            t.distribute(id);
            visited += 1;
            true
        });
        tree.assert_invariants();
        assert_eq!(tree.node_count(), 5);
        assert_eq!(visited, 5);
    }

    #[test]
    fn unnamed_mask_bits_survive() {
        let extra = PlaneMask::from_bits_retain(1 << 8);
        let mask = PlaneMask::FRUSTUM | extra;
        assert!(mask.contains(extra));
        assert_eq!(PlaneMask::default(), PlaneMask::FRUSTUM);
    }
}
