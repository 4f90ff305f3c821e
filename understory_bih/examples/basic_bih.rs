// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Basic usage of Understory BIH: insert, distribute, move, and query.

use understory_bih::{Aabb3D, Bih, Config, Tree};

fn main() {
    let mut tree: Bih<u32> = Tree::with_config(Config {
        min_split_objects: 2,
        ..Config::default()
    });
    let a = tree.insert(Aabb3D::from_center([0.0, 0.0, 0.0], [0.5; 3]), 1);
    let _b = tree.insert(Aabb3D::from_center([100.0, 0.0, 0.0], [0.5; 3]), 2);
    let _c = tree.insert(Aabb3D::from_center([200.0, 0.0, 0.0], [0.5; 3]), 3);
    tree.full_distribute();
    println!(
        "nodes={} root split={:?}",
        tree.node_count(),
        tree.split(tree.root())
    );

    // Move box 1 next to box 2
    tree.update(a, Aabb3D::from_center([110.0, 0.0, 0.0], [0.5; 3]));
    println!("box 1 now parked in {:?}", tree.object_node(a));

    // Query a box
    let hits: Vec<_> = tree
        .query_box(Aabb3D::new([90.0, -1.0, -1.0], [120.0, 1.0, 1.0]))
        .collect();
    println!("hits in [90, 120]: {:?}", hits);
}
