// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

// After you edit the crate's doc comment, run this command, then check README.md for any missing links
// cargo rdme --workspace-project=understory_bih --heading-base-level=0

//! Understory BIH: a dynamic 3D bounding interval hierarchy.
//!
//! Understory BIH organizes axis-aligned 3D boxes with user payloads for approximate
//! visibility ordering, as a renderer's culling pass wants them.
//!
//! - Insert, update, and remove boxes. Handles stay valid while objects move around.
//! - Insertion is delayed: objects pile up in a node until [`Tree::distribute`] or
//!   [`Tree::full_distribute`] pays for a split, once per batch instead of once per object.
//! - A moved object only climbs as far as the first ancestor that still contains it.
//! - Failed split attempts put a node on a cooldown instead of being retried every time.
//! - Walk the tree in arbitrary or approximate front-to-back order, threading a
//!   [`PlaneMask`] of frustum planes down the hierarchy.
//!
//! # Example
//!
//! ```rust
//! use understory_bih::{Aabb3D, Bih, Config, PlaneMask, Tree};
//!
//! // Split as soon as two objects share a node.
//! let mut tree: Bih<u32> = Tree::with_config(Config {
//!     min_split_objects: 2,
//!     ..Config::default()
//! });
//! let a = tree.insert(Aabb3D::from_center([0.0, 0.0, 0.0], [0.5; 3]), 1);
//! let _b = tree.insert(Aabb3D::from_center([100.0, 0.0, 0.0], [0.5; 3]), 2);
//! tree.full_distribute();
//! assert!(tree.children(tree.root()).is_some());
//!
//! // Move the first box; it is still found immediately.
//! tree.update(a, Aabb3D::from_center([50.0, 0.0, 0.0], [0.5; 3]));
//! let hits: Vec<_> = tree.query_point([50.0, 0.0, 0.0]).collect();
//! assert_eq!(hits, [(a, 1)]);
//!
//! // Visit leaves nearest to a viewpoint first.
//! let mut order = Vec::new();
//! tree.front_to_back([200.0, 0.0, 0.0], PlaneMask::default(), |t, node, _mask| {
//!     t.distribute(node);
//!     order.extend(t.node_objects(node).iter().filter_map(|o| t.payload(*o)));
//!     true
//! });
//! assert_eq!(order.first(), Some(&2));
//! ```
//!
//! ## Choosing a strategy
//!
//! - [`IntervalSplit`] (default, [`Bih`]): every split stores two possibly overlapping
//!   intervals along one axis. Six median candidates are scored by the empty gap they
//!   leave between the two children. Clustered scenes with empty space between clusters
//!   split well; uniformly dense, overlapping scenes tend to stay flat.
//! - [`MedianSplit`] ([`Bvh`]): median by center along the longest axis with children
//!   bounded tightly, scored by the volume the split cuts away.
//!
//! Implement [`SplitStrategy`] to plug in another heuristic.
//!
//! ### Float semantics
//!
//! Bounds must be finite with `min <= max` on every axis. Debug builds assert this;
//! release builds trust the caller. Volumes are accumulated in `f64`.

#![no_std]

extern crate alloc;

mod arena;
pub mod config;
pub mod strategies;
pub mod strategy;
pub mod traverse;
pub mod tree;
pub mod types;

pub use config::Config;
pub use strategies::{IntervalSplit, MedianSplit};
pub use strategy::{Split, SplitPlan, SplitStrategy};
pub use traverse::PlaneMask;
pub use tree::{Bih, Bvh, Tree};
pub use types::{Aabb3D, Axis, Interval, NodeId, ObjectId, Point3};
