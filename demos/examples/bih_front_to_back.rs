// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Approximate front-to-back culling walk with a shrinking plane mask.
//!
//! The "camera" looks down +x from `eye` and sees everything with `x` in
//! `[eye.x + near, eye.x + far]`. Only two planes are tested; nodes fully inside a plane
//! drop that plane from the mask handed to their children. Leaves are distributed on
//! first visit, so the tree refines only where the camera looks.
//!
//! Run:
//! - `RUST_LOG=debug cargo run -p understory_demos --example bih_front_to_back`

use understory_bih::{Aabb3D, Bih, Bvh, PlaneMask, SplitStrategy, Tree};

const NEAR: f32 = 10.0;
const FAR: f32 = 400.0;

fn walk<S: SplitStrategy>(tree: &mut Tree<u32, S>, eye: [f32; 3]) -> (Vec<u32>, usize) {
    let mut drawn = Vec::new();
    let mut tested = 0;
    tree.front_to_back(eye, PlaneMask::NEAR | PlaneMask::FAR, |t, node, mask| {
        let Some(b) = t.node_bounds(node) else {
            return false;
        };
        if mask.contains(PlaneMask::NEAR) {
            tested += 1;
            if b.max[0] < eye[0] + NEAR {
                return false;
            }
            if b.min[0] >= eye[0] + NEAR {
                mask.remove(PlaneMask::NEAR);
            }
        }
        if mask.contains(PlaneMask::FAR) {
            tested += 1;
            if b.min[0] > eye[0] + FAR {
                return false;
            }
            if b.max[0] <= eye[0] + FAR {
                mask.remove(PlaneMask::FAR);
            }
        }
        t.distribute(node);
        for id in t.node_objects(node) {
            if let (Some(o), Some(p)) = (t.object_bounds(*id), t.payload(*id))
                && o.max[0] >= eye[0] + NEAR
                && o.min[0] <= eye[0] + FAR
            {
                drawn.push(p);
            }
        }
        true
    });
    (drawn, tested)
}

fn fill<S: SplitStrategy>(tree: &mut Tree<u32, S>) {
    for i in 0..1000_u32 {
        let x = (i * 37 % 1000) as f32;
        let y = (i * 11 % 50) as f32;
        let z = (i * 7 % 30) as f32;
        tree.insert(Aabb3D::from_center([x, y, z], [0.4; 3]), i);
    }
}

fn main() {
    env_logger::init();

    let mut bih: Bih<u32> = Bih::new();
    let mut bvh: Bvh<u32> = Bvh::new();
    fill(&mut bih);
    fill(&mut bvh);

    for eye in [[-50.0, 25.0, 15.0], [300.0, 25.0, 15.0]] {
        let (drawn, tested) = walk(&mut bih, eye);
        println!(
            "bih eye.x={:>6.1}: drew {} objects, first {:?}, {} plane tests, {} nodes",
            eye[0],
            drawn.len(),
            &drawn[..drawn.len().min(5)],
            tested,
            bih.node_count()
        );
        let (drawn, tested) = walk(&mut bvh, eye);
        println!(
            "bvh eye.x={:>6.1}: drew {} objects, first {:?}, {} plane tests, {} nodes",
            eye[0],
            drawn.len(),
            &drawn[..drawn.len().min(5)],
            tested,
            bvh.node_count()
        );
    }
}
