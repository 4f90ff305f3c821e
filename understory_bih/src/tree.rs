// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Core tree implementation: structure, delayed insertion, distribution, queries.

use alloc::boxed::Box;
use alloc::vec;
use alloc::vec::Vec;
use core::any::Any;
use core::fmt::Debug;

use crate::arena::Arena;
use crate::config::Config;
use crate::strategies::{IntervalSplit, MedianSplit};
use crate::strategy::{Split, SplitStrategy};
use crate::types::{Aabb3D, NodeId, ObjectId, Point3};

#[derive(Copy, Clone, Debug)]
pub(crate) enum Kind {
    Leaf,
    Internal { split: Split, children: [NodeId; 2] },
}

pub(crate) struct Node {
    pub(crate) bounds: Aabb3D,
    pub(crate) parent: Option<NodeId>,
    pub(crate) kind: Kind,
    // Objects stored directly here. On an internal node these are pending distribution.
    pub(crate) objects: Vec<ObjectId>,
    pub(crate) block: u32,
    pub(crate) estimate: usize,
    pub(crate) user_data: Option<Box<dyn Any>>,
}

impl Node {
    fn new(bounds: Aabb3D, parent: Option<NodeId>) -> Self {
        Self {
            bounds,
            parent,
            kind: Kind::Leaf,
            objects: Vec::new(),
            block: 0,
            estimate: 0,
            user_data: None,
        }
    }

    fn is_leaf(&self) -> bool {
        matches!(self.kind, Kind::Leaf)
    }
}

#[derive(Clone, Debug)]
struct Object<P> {
    bounds: Aabb3D,
    payload: P,
    node: NodeId,
}

/// A dynamic bounding interval hierarchy over 3D boxes with user payloads.
///
/// Insertion is delayed: new objects are parked in the root and only pushed down when
/// [`distribute`](Self::distribute) (or [`full_distribute`](Self::full_distribute)) runs.
/// The split heuristic is pluggable through [`SplitStrategy`].
pub struct Tree<P: Copy + Debug, S: SplitStrategy = IntervalSplit> {
    pub(crate) nodes: Arena<NodeId, Node>,
    objects: Arena<ObjectId, Object<P>>,
    pub(crate) root: NodeId,
    config: Config,
    pub(crate) strategy: S,
}

/// Bounding interval hierarchy: six-candidate interval splits.
pub type Bih<P> = Tree<P, IntervalSplit>;

/// Bounding volume hierarchy: longest-axis median splits with tight child bounds.
pub type Bvh<P> = Tree<P, MedianSplit>;

impl<P: Copy + Debug, S: SplitStrategy + Default> Default for Tree<P, S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P: Copy + Debug, S: SplitStrategy> Debug for Tree<P, S> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Tree")
            .field("objects", &self.objects.len())
            .field("nodes", &self.nodes.len())
            .field("root_leaf", &self.is_leaf(self.root))
            .field("config", &self.config)
            .field("strategy", &self.strategy)
            .finish_non_exhaustive()
    }
}

impl<P: Copy + Debug, S: SplitStrategy + Default> Tree<P, S> {
    /// Create an empty tree with the default [`Config`].
    pub fn new() -> Self {
        Self::with_strategy(S::default(), Config::default())
    }

    /// Create an empty tree with the given configuration.
    pub fn with_config(config: Config) -> Self {
        Self::with_strategy(S::default(), config)
    }
}

impl<P: Copy + Debug, S: SplitStrategy> Tree<P, S> {
    /// Create an empty tree using `strategy` to evaluate splits.
    pub fn with_strategy(strategy: S, config: Config) -> Self {
        let mut nodes = Arena::default();
        let root = nodes.alloc(Node::new(Aabb3D::EVERYTHING, None));
        Self {
            nodes,
            objects: Arena::default(),
            root,
            config,
            strategy,
        }
    }

    /// Current configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Set the leaf size below which no split is attempted. Defaults to 10.
    pub fn set_min_split_objects(&mut self, n: usize) {
        self.config.min_split_objects = n;
    }

    /// Set the minimum quality a split must exceed to be committed.
    pub fn set_block_threshold(&mut self, threshold: f64) {
        self.config.block_threshold = threshold;
    }

    /// Set the cooldown, in mutations, after a rejected split. Defaults to 20.
    pub fn set_block_time(&mut self, mutations: u32) {
        self.config.block_time = mutations;
    }

    /// The split strategy.
    pub fn strategy(&self) -> &S {
        &self.strategy
    }

    // --- objects ---

    /// Add an object. Returns a stable handle.
    ///
    /// The object is parked in the root; the tree structure does not change until the
    /// next distribution. `bounds` must be finite with `min <= max` on every axis
    /// (checked in debug builds only).
    pub fn insert(&mut self, bounds: Aabb3D, payload: P) -> ObjectId {
        debug_assert!(
            bounds.is_valid(),
            "object bounds must be finite and ordered: {bounds:?}"
        );
        let root = self.root;
        let id = self.objects.alloc(Object {
            bounds,
            payload,
            node: root,
        });
        self.add_pending(root, id);
        id
    }

    /// Remove an object and return its payload.
    ///
    /// If this empties a leaf other than the root, the leaf's parent is flattened so no
    /// empty leaves linger. Stale handles are a caller error (debug assertion) and are
    /// otherwise ignored.
    pub fn remove(&mut self, id: ObjectId) -> Option<P> {
        debug_assert!(self.objects.contains(id), "remove of stale {id:?}");
        let obj = self.objects.free(id)?;
        self.detach(obj.node, id);
        self.collapse_if_empty(obj.node);
        Some(obj.payload)
    }

    /// Give an object new bounds.
    ///
    /// If the node holding the object still contains the new bounds nothing moves.
    /// Otherwise the object climbs to the first ancestor that contains it (the root at
    /// worst) and is parked there until that ancestor is distributed again.
    pub fn update(&mut self, id: ObjectId, bounds: Aabb3D) {
        debug_assert!(
            bounds.is_valid(),
            "object bounds must be finite and ordered: {bounds:?}"
        );
        debug_assert!(self.objects.contains(id), "update of stale {id:?}");
        let Some(obj) = self.objects.get_mut(id) else {
            return;
        };
        if obj.bounds == bounds {
            return;
        }
        obj.bounds = bounds;
        let node = obj.node;

        if self.node(node).bounds.contains(&bounds) {
            let n = self.node_mut(node);
            n.block = n.block.saturating_sub(1);
            return;
        }

        let mut target = node;
        while let Some(parent) = self.node(target).parent {
            target = parent;
            if self.node(target).bounds.contains(&bounds) {
                break;
            }
        }
        log::trace!("{id:?} left {node:?}, parked in {target:?}");
        self.detach(node, id);
        self.collapse_if_empty(node);
        self.add_pending(target, id);
    }

    /// Whether `id` refers to a live object.
    pub fn contains(&self, id: ObjectId) -> bool {
        self.objects.contains(id)
    }

    /// Number of objects in the tree.
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    /// Whether the tree holds no objects.
    pub fn is_empty(&self) -> bool {
        self.objects.len() == 0
    }

    /// Payload of an object.
    pub fn payload(&self, id: ObjectId) -> Option<P> {
        self.objects.get(id).map(|o| o.payload)
    }

    /// Bounds of an object.
    pub fn object_bounds(&self, id: ObjectId) -> Option<Aabb3D> {
        self.objects.get(id).map(|o| o.bounds)
    }

    /// The node currently storing an object.
    pub fn object_node(&self, id: ObjectId) -> Option<NodeId> {
        self.objects.get(id).map(|o| o.node)
    }

    /// Iterate all live objects as `(handle, bounds, payload)`.
    pub fn iter(&self) -> impl Iterator<Item = (ObjectId, Aabb3D, P)> + '_ {
        self.objects.iter().map(|(id, o)| (id, o.bounds, o.payload))
    }

    /// Remove every object and node. All handles except the root's become stale.
    pub fn clear(&mut self) {
        self.nodes.retain_only(Some(self.root));
        self.objects.retain_only(None);
        *self.node_mut(self.root) = Node::new(Aabb3D::EVERYTHING, None);
    }

    // --- structure ---

    /// Distribute the objects parked in `node` one level down.
    ///
    /// - Blocked nodes and leaves with fewer than
    ///   [`min_split_objects`](Config::min_split_objects) objects are left alone.
    /// - A leaf asks the strategy for a split. If its quality exceeds
    ///   [`block_threshold`](Config::block_threshold), two children are created and every
    ///   object that fits one of them moves down. Otherwise the node is blocked for
    ///   [`block_time`](Config::block_time) mutations.
    /// - An internal node pushes its parked objects into the child that contains them.
    ///   If any object fits neither child, the node is flattened and split afresh.
    ///
    /// This never recurses into the children; see [`full_distribute`](Self::full_distribute).
    pub fn distribute(&mut self, node: NodeId) {
        debug_assert!(self.is_alive(node), "distribute of stale {node:?}");
        let Some(n) = self.nodes.get(node) else {
            return;
        };
        if n.block > 0 {
            return;
        }
        if n.objects.is_empty() {
            debug_assert!(
                !n.is_leaf() || n.parent.is_none(),
                "non-root leaf {node:?} holds no objects"
            );
            return;
        }
        if n.is_leaf() {
            if n.objects.len() >= self.config.min_split_objects {
                self.split_leaf(node);
            }
            return;
        }

        self.push_down(node);
        let left = self.node(node).objects.len();
        if left != 0 {
            log::debug!("{node:?}: {left} objects fit neither child, rebuilding");
            self.flatten(node);
            // A fresh leaf split routes every object, so this does not recurse again.
            self.distribute(node);
        }
    }

    /// Distribute the whole tree, top down.
    ///
    /// Call this after a batch of inserts, updates and removals rather than after each.
    pub fn full_distribute(&mut self) {
        self.distribute_subtree(self.root);
    }

    /// Distribute `node` and then, recursively, every child it ends up with.
    pub fn distribute_subtree(&mut self, node: NodeId) {
        let mut stack = vec![node];
        while let Some(id) = stack.pop() {
            self.distribute(id);
            if let Some([first, second]) = self.children(id) {
                stack.push(second);
                stack.push(first);
            }
        }
    }

    /// Collapse the subtree below `node` back into it.
    ///
    /// Every object stored anywhere below `node` is moved into `node`, the descendant
    /// nodes are released, and `node` becomes a leaf again. Calling this on a leaf is a
    /// caller error (debug assertion) and otherwise does nothing.
    pub fn flatten(&mut self, node: NodeId) {
        debug_assert!(
            self.children(node).is_some(),
            "flatten of leaf or stale {node:?}"
        );
        let Some(children) = self.children(node) else {
            return;
        };

        let mut gathered = Vec::new();
        let mut stack = children.to_vec();
        while let Some(id) = stack.pop() {
            let Some(child) = self.nodes.free(id) else {
                continue;
            };
            if let Kind::Internal { children, .. } = child.kind {
                stack.extend(children);
            }
            gathered.extend(child.objects);
        }
        for id in &gathered {
            if let Some(o) = self.objects.get_mut(*id) {
                o.node = node;
            }
        }

        let n = self.node_mut(node);
        n.objects.extend(gathered);
        n.kind = Kind::Leaf;
        n.estimate = n.objects.len();
    }

    // --- nodes ---

    /// The root node. Its handle never changes.
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Returns true if `id` refers to a live node.
    pub fn is_alive(&self, id: NodeId) -> bool {
        self.nodes.contains(id)
    }

    /// Number of live nodes, including the root.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the node is a leaf. Stale handles report `false`.
    pub fn is_leaf(&self, id: NodeId) -> bool {
        self.nodes.get(id).is_some_and(Node::is_leaf)
    }

    /// First and second child of an internal node.
    pub fn children(&self, id: NodeId) -> Option<[NodeId; 2]> {
        match self.nodes.get(id)?.kind {
            Kind::Internal { children, .. } => Some(children),
            Kind::Leaf => None,
        }
    }

    /// Split descriptor of an internal node.
    pub fn split(&self, id: NodeId) -> Option<Split> {
        match self.nodes.get(id)?.kind {
            Kind::Internal { split, .. } => Some(split),
            Kind::Leaf => None,
        }
    }

    /// Parent of a node; `None` for the root.
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes.get(id)?.parent
    }

    /// The region a node is responsible for.
    ///
    /// This contains the bounds of every object stored in the node's subtree.
    pub fn node_bounds(&self, id: NodeId) -> Option<Aabb3D> {
        self.nodes.get(id).map(|n| n.bounds)
    }

    /// Objects stored directly in a node.
    pub fn node_objects(&self, id: NodeId) -> &[ObjectId] {
        self.nodes.get(id).map(|n| n.objects.as_slice()).unwrap_or(&[])
    }

    /// Number of objects stored directly in a node.
    pub fn object_count(&self, id: NodeId) -> usize {
        self.node_objects(id).len()
    }

    /// Approximate number of objects in a node's whole subtree.
    ///
    /// Refreshed only when the node is distributed or flattened.
    pub fn estimated_object_count(&self, id: NodeId) -> usize {
        self.nodes.get(id).map(|n| n.estimate).unwrap_or(0)
    }

    /// Remaining split cooldown of a node, in mutations.
    pub fn block(&self, id: NodeId) -> u32 {
        self.nodes.get(id).map(|n| n.block).unwrap_or(0)
    }

    /// Attach user data to a node, returning the previous value.
    ///
    /// The data is dropped when the node is released by a flatten or [`clear`](Self::clear).
    pub fn set_user_data(
        &mut self,
        id: NodeId,
        data: Option<Box<dyn Any>>,
    ) -> Option<Box<dyn Any>> {
        let n = self.nodes.get_mut(id)?;
        core::mem::replace(&mut n.user_data, data)
    }

    /// User data attached to a node.
    pub fn user_data(&self, id: NodeId) -> Option<&dyn Any> {
        self.nodes.get(id)?.user_data.as_deref()
    }

    /// User data attached to a node, mutably.
    pub fn user_data_mut(&mut self, id: NodeId) -> Option<&mut dyn Any> {
        let data = self.nodes.get_mut(id)?.user_data.as_mut()?;
        Some(&mut **data)
    }

    // --- queries ---

    /// Objects whose bounds contain the point.
    pub fn query_point(&self, p: Point3) -> impl Iterator<Item = (ObjectId, P)> + '_ {
        self.collect_where(|b| b.contains_point(p)).into_iter()
    }

    /// Objects whose bounds intersect `query`.
    pub fn query_box(&self, query: Aabb3D) -> impl Iterator<Item = (ObjectId, P)> + '_ {
        self.collect_where(|b| b.intersects(&query)).into_iter()
    }

    // --- internals ---

    /// Access a node; panics if `id` is stale.
    pub(crate) fn node(&self, id: NodeId) -> &Node {
        self.nodes.get(id).expect("dangling NodeId")
    }

    /// Access a node mutably; panics if `id` is stale.
    pub(crate) fn node_mut(&mut self, id: NodeId) -> &mut Node {
        self.nodes.get_mut(id).expect("dangling NodeId")
    }

    fn object_bounds_of(&self, id: ObjectId) -> Aabb3D {
        self.objects.get(id).expect("dangling ObjectId").bounds
    }

    /// Park an object in `node` as a mutation of that node (counts down its cooldown).
    fn add_pending(&mut self, node: NodeId, id: ObjectId) {
        let n = self.node_mut(node);
        n.block = n.block.saturating_sub(1);
        self.attach(node, id);
    }

    /// Physically store an object in `node`.
    fn attach(&mut self, node: NodeId, id: ObjectId) {
        let n = self.node_mut(node);
        n.objects.push(id);
        n.estimate += 1;
        if let Some(o) = self.objects.get_mut(id) {
            o.node = node;
        }
    }

    /// Unlink an object from the node storing it.
    fn detach(&mut self, node: NodeId, id: ObjectId) {
        let n = self.node_mut(node);
        let pos = n.objects.iter().position(|o| *o == id);
        debug_assert!(pos.is_some(), "{id:?} missing from its node {node:?}");
        if let Some(pos) = pos {
            n.objects.swap_remove(pos);
            n.estimate = n.estimate.saturating_sub(1);
        }
    }

    fn collapse_if_empty(&mut self, node: NodeId) {
        let n = self.node(node);
        if n.objects.is_empty()
            && n.is_leaf()
            && let Some(parent) = n.parent
        {
            self.flatten(parent);
        }
    }

    fn split_leaf(&mut self, node: NodeId) {
        let node_bounds = self.node(node).bounds;
        let boxes: Vec<Aabb3D> = self
            .node(node)
            .objects
            .iter()
            .map(|id| self.object_bounds_of(*id))
            .collect();
        let threshold = self.config.block_threshold;
        let plan = self
            .strategy
            .plan(&node_bounds, &boxes)
            .filter(|p| p.split.quality > threshold);
        let Some(plan) = plan else {
            log::debug!(
                "{node:?}: no split of {} objects beats {threshold}, blocking",
                boxes.len()
            );
            self.node_mut(node).block = self.config.block_time;
            return;
        };

        let children = plan
            .child_bounds
            .map(|bounds| self.nodes.alloc(Node::new(bounds, Some(node))));
        self.node_mut(node).kind = Kind::Internal {
            split: plan.split,
            children,
        };
        self.push_down(node);

        if children.iter().any(|c| self.node(*c).objects.is_empty()) {
            log::debug!("{node:?}: split left a child empty, blocking");
            self.flatten(node);
            self.node_mut(node).block = self.config.block_time;
            return;
        }
        log::debug!(
            "{node:?}: split {} objects along {:?} with quality {}",
            boxes.len(),
            plan.split.axis,
            plan.split.quality
        );
    }

    /// Move parked objects into the first child that fully contains them.
    fn push_down(&mut self, node: NodeId) {
        let Kind::Internal { children, .. } = self.node(node).kind else {
            return;
        };
        let child_bounds = children.map(|c| self.node(c).bounds);
        let pending = core::mem::take(&mut self.node_mut(node).objects);
        let mut kept = Vec::new();
        for id in pending {
            let bounds = self.object_bounds_of(id);
            match child_bounds.iter().position(|b| b.contains(&bounds)) {
                Some(side) => self.attach(children[side], id),
                None => kept.push(id),
            }
        }
        let below: usize = children.iter().map(|c| self.node(*c).estimate).sum();
        let n = self.node_mut(node);
        n.estimate = kept.len() + below;
        n.objects = kept;
    }

    fn collect_where(&self, hit: impl Fn(&Aabb3D) -> bool) -> Vec<(ObjectId, P)> {
        let mut out = Vec::new();
        let mut stack = vec![self.root];
        while let Some(id) = stack.pop() {
            let n = self.node(id);
            if !hit(&n.bounds) {
                continue;
            }
            for oid in &n.objects {
                if let Some(o) = self.objects.get(*oid)
                    && hit(&o.bounds)
                {
                    out.push((*oid, o.payload));
                }
            }
            if let Kind::Internal { children, .. } = n.kind {
                stack.extend(children);
            }
        }
        out
    }
}

#[cfg(test)]
impl<P: Copy + Debug, S: SplitStrategy> Tree<P, S> {
    /// Check every structural invariant; panics on the first violation.
    pub(crate) fn assert_invariants(&self) {
        let mut seen_nodes: Vec<NodeId> = Vec::new();
        let mut seen_objects: Vec<ObjectId> = Vec::new();
        assert!(self.node(self.root).parent.is_none(), "root has a parent");

        let mut stack = vec![self.root];
        while let Some(id) = stack.pop() {
            assert!(!seen_nodes.contains(&id), "{id:?} reachable twice");
            seen_nodes.push(id);
            let n = self.node(id);
            if let Some(parent) = n.parent
                && n.is_leaf()
            {
                assert!(!n.objects.is_empty(), "non-root leaf {id:?} is empty");
                assert!(
                    self.node(parent).bounds.contains(&n.bounds),
                    "{id:?} escapes its parent {parent:?}"
                );
            }
            for oid in &n.objects {
                let o = self.objects.get(*oid).expect("node lists a dead object");
                assert_eq!(o.node, id, "back-reference of {oid:?} is stale");
                assert!(
                    n.bounds.contains(&o.bounds),
                    "{oid:?} stored in {id:?} which does not contain it"
                );
                assert!(!seen_objects.contains(oid), "{oid:?} stored twice");
                seen_objects.push(*oid);
            }
            if let Kind::Internal { children, .. } = n.kind {
                for c in children {
                    let child = self.node(c);
                    assert_eq!(child.parent, Some(id), "{c:?} has the wrong parent");
                    assert!(n.bounds.contains(&child.bounds), "{c:?} escapes {id:?}");
                    stack.push(c);
                }
            }
        }
        assert_eq!(seen_nodes.len(), self.nodes.len(), "unreachable nodes leaked");
        assert_eq!(seen_objects.len(), self.objects.len(), "objects lost");
    }
}
