// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tuning knobs shared by every node of a tree.

/// Split and cooldown thresholds.
///
/// The same values apply to every node of a [`Tree`](crate::Tree).
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Config {
    /// A leaf holding fewer objects than this is never split.
    pub min_split_objects: usize,
    /// Minimum split quality. Candidates scoring at or below this are rejected.
    pub block_threshold: f64,
    /// Number of mutations a node waits after a rejected split before trying again.
    pub block_time: u32,
}

impl Config {
    /// Default leaf size below which no split is attempted.
    pub const DEFAULT_MIN_SPLIT_OBJECTS: usize = 10;
    /// Default cooldown after a rejected split.
    pub const DEFAULT_BLOCK_TIME: u32 = 20;
}

impl Default for Config {
    fn default() -> Self {
        Self {
            min_split_objects: Self::DEFAULT_MIN_SPLIT_OBJECTS,
            block_threshold: 0.0,
            block_time: Self::DEFAULT_BLOCK_TIME,
        }
    }
}
