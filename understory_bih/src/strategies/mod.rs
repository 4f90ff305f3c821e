// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Split strategies.
//!
//! - `interval`: bounding interval hierarchy (BIH). Six median candidates, scored by the
//!   empty gap they leave between the two children. Children keep the parent's region
//!   clipped to their interval, so they may overlap.
//! - `median`: bounding volume hierarchy (BVH). Median by center along the longest axis,
//!   scored by the volume the two children cut away. Children are bounded tightly.
//!
//! Gap note
//! --------
//! For a candidate with intervals `A` (first) and `B` (second) along one axis,
//! `quality = B.min - A.max`, where `A` holds the lower half of the median order.
//! The score is taken before a contained interval is moved to the front.
//! A positive value means the two groups are separated by empty space, which is what
//! makes front-to-back traversal effective later. A negative value is the overlap.

pub mod interval;
pub mod median;

pub use interval::IntervalSplit;
pub use median::MedianSplit;
