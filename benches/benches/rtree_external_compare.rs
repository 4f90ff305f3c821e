// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

#![cfg(feature = "compare_rstar")]

use criterion::{BatchSize, Criterion, Throughput, black_box, criterion_group, criterion_main};
use understory_bih::{Aabb3D, Bih, Bvh};

use rstar::primitives::Rectangle;
use rstar::{AABB, RTree};

fn gen_grid_boxes(n: usize, cell: f32) -> Vec<Aabb3D> {
    let mut out = Vec::with_capacity(n * n * n);
    for z in 0..n {
        for y in 0..n {
            for x in 0..n {
                let c = [x as f32 * cell, y as f32 * cell, z as f32 * cell];
                out.push(Aabb3D::from_center(c, [cell * 0.25; 3]));
            }
        }
    }
    out
}

fn to_rstar_boxes(v: &[Aabb3D]) -> Vec<Rectangle<[f32; 3]>> {
    v.iter()
        .map(|b| Rectangle::from_corners(b.min, b.max))
        .collect()
}

fn bench_rtree_external_compare_f32(c: &mut Criterion) {
    let mut group = c.benchmark_group("rtree_external_compare_3d");
    for &n in &[16usize, 24] {
        let boxes = gen_grid_boxes(n, 10.0);
        let query = Aabb3D::new([20.0; 3], [80.0; 3]);
        group.throughput(Throughput::Elements((n * n * n) as u64));

        group.bench_function(format!("bih_build_query_n{}", n), |b| {
            b.iter_batched(
                Bih::<u32>::new,
                |mut tree| {
                    for (i, r) in boxes.iter().copied().enumerate() {
                        let _ = tree.insert(r, i as u32);
                    }
                    tree.full_distribute();
                    let hits: usize = tree.query_box(query).count();
                    black_box(hits);
                },
                BatchSize::SmallInput,
            )
        });

        group.bench_function(format!("bvh_build_query_n{}", n), |b| {
            b.iter_batched(
                Bvh::<u32>::new,
                |mut tree| {
                    for (i, r) in boxes.iter().copied().enumerate() {
                        let _ = tree.insert(r, i as u32);
                    }
                    tree.full_distribute();
                    let hits: usize = tree.query_box(query).count();
                    black_box(hits);
                },
                BatchSize::SmallInput,
            )
        });

        group.bench_function(format!("rstar_build_query_bulk_n{}", n), |b| {
            b.iter_batched(
                || to_rstar_boxes(&boxes),
                |rectangles| {
                    let tree = RTree::bulk_load(rectangles);
                    let aabb = AABB::from_corners(query.min, query.max);
                    let hits: usize = tree.locate_in_envelope_intersecting(&aabb).count();
                    black_box(hits);
                },
                BatchSize::SmallInput,
            )
        });
    }
    group.finish();
}

criterion_group!(benches, bench_rtree_external_compare_f32);
criterion_main!(benches);
