// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Delayed insertion, lazy splitting, and cooldowns in a small BIH.
//!
//! Run:
//! - `RUST_LOG=debug cargo run -p understory_demos --example bih_basics`

use understory_bih::{Aabb3D, Bih, NodeId, Tree};

fn dump(tree: &Bih<usize>, node: NodeId, depth: usize) {
    let pad = "  ".repeat(depth);
    match tree.split(node) {
        Some(split) => println!(
            "{pad}{node:?} split {:?} {:?} q={:.1} pending={}",
            split.axis,
            split.intervals,
            split.quality,
            tree.object_count(node)
        ),
        None => println!(
            "{pad}{node:?} leaf objects={} block={}",
            tree.object_count(node),
            tree.block(node)
        ),
    }
    if let Some(children) = tree.children(node) {
        for c in children {
            dump(tree, c, depth + 1);
        }
    }
}

fn main() {
    env_logger::init();

    let mut tree: Bih<usize> = Tree::new();

    // Three clusters along x, ten boxes each.
    let mut ids = Vec::new();
    for cluster in 0..3 {
        for i in 0..10 {
            let c = [
                cluster as f32 * 500.0 + i as f32 * 3.0,
                (i % 3) as f32 * 3.0,
                0.0,
            ];
            ids.push(tree.insert(Aabb3D::from_center(c, [1.0; 3]), ids.len()));
        }
    }
    println!("before distribution: {} nodes", tree.node_count());
    tree.full_distribute();
    println!("after distribution:");
    dump(&tree, tree.root(), 1);

    // Ten boxes stacked on one spot cannot be split; the leaf goes on cooldown.
    let mut stacked = Tree::<usize>::new();
    for i in 0..10 {
        stacked.insert(Aabb3D::from_center([7.0, 7.0, 7.0], [1.0; 3]), i);
    }
    stacked.full_distribute();
    println!("stacked:");
    dump(&stacked, stacked.root(), 1);

    // Move one box far away: it climbs to the root and waits there.
    tree.update(ids[0], Aabb3D::from_center([-900.0, 0.0, 0.0], [1.0; 3]));
    println!("moved box parked in {:?}", tree.object_node(ids[0]));
    tree.full_distribute();
    println!("after redistribution:");
    dump(&tree, tree.root(), 1);
}
