// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use criterion::{BatchSize, Criterion, Throughput, black_box, criterion_group, criterion_main};
use understory_bih::{Aabb3D, Bih, Bvh, ObjectId, PlaneMask, SplitStrategy, Tree};

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

#[derive(Clone)]
struct Rng(u64);

impl Rng {
    fn new(seed: u64) -> Self {
        Self(seed)
    }
    fn next_u64(&mut self) -> u64 {
        let mut x = self.0;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.0 = x;
        x
    }
    fn next_f32(&mut self) -> f32 {
        let v = self.next_u64() >> 40;
        (v as f32) / ((1u64 << 24) as f32)
    }
}

fn gen_clustered_boxes(n_clusters: usize, per_cluster: usize, spread: f32) -> Vec<Aabb3D> {
    let mut out = Vec::with_capacity(n_clusters * per_cluster);
    let mut rng = Rng::new(0xC1A5_7E55_9999_ABCD);
    let mut centers = Vec::with_capacity(n_clusters);
    for _ in 0..n_clusters {
        centers.push([
            rng.next_f32() * 4000.0,
            rng.next_f32() * 4000.0,
            rng.next_f32() * 4000.0,
        ]);
    }
    for c in centers {
        for _ in 0..per_cluster {
            let p = [
                c[0] + (rng.next_f32() - 0.5) * spread,
                c[1] + (rng.next_f32() - 0.5) * spread,
                c[2] + (rng.next_f32() - 0.5) * spread,
            ];
            out.push(Aabb3D::from_center(p, [1.0; 3]));
        }
    }
    out
}

fn build<S: SplitStrategy + Default>(boxes: &[Aabb3D]) -> (Tree<u32, S>, Vec<ObjectId>) {
    let mut tree = Tree::<u32, S>::new();
    let ids = boxes
        .iter()
        .enumerate()
        .map(|(i, b)| tree.insert(*b, i as u32))
        .collect();
    tree.full_distribute();
    (tree, ids)
}

fn bench_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("build");
    for &n in &[8usize, 16, 24] {
        let boxes = gen_grid_boxes(n, 10.0);
        group.throughput(Throughput::Elements((n * n * n) as u64));
        group.bench_function(format!("bih_insert_distribute_n{}", n), |b| {
            b.iter(|| black_box(build::<understory_bih::IntervalSplit>(&boxes).0.node_count()));
        });
        group.bench_function(format!("bvh_insert_distribute_n{}", n), |b| {
            b.iter(|| black_box(build::<understory_bih::MedianSplit>(&boxes).0.node_count()));
        });
    }
    let boxes = gen_clustered_boxes(32, 128, 60.0);
    group.bench_function("bih_insert_distribute_clustered", |b| {
        b.iter(|| black_box(build::<understory_bih::IntervalSplit>(&boxes).0.node_count()));
    });
    group.bench_function("bvh_insert_distribute_clustered", |b| {
        b.iter(|| black_box(build::<understory_bih::MedianSplit>(&boxes).0.node_count()));
    });
    group.finish();
}

fn bench_churn(c: &mut Criterion) {
    let mut group = c.benchmark_group("churn");
    let boxes = gen_grid_boxes(16, 10.0);
    group.bench_function("bih_small_moves_then_distribute", |b| {
        b.iter_batched(
            || build::<understory_bih::IntervalSplit>(&boxes),
            |(mut tree, ids): (Bih<u32>, _)| {
                for (j, (id, r)) in ids.iter().zip(&boxes).enumerate() {
                    let d = ((j % 5) as f32 - 2.0) * 0.5;
                    let moved = Aabb3D::new(
                        [r.min[0] + d, r.min[1], r.min[2] - d],
                        [r.max[0] + d, r.max[1], r.max[2] - d],
                    );
                    tree.update(*id, moved);
                }
                tree.full_distribute();
                black_box(tree.node_count());
            },
            BatchSize::SmallInput,
        );
    });
    group.bench_function("bih_remove_reinsert", |b| {
        b.iter_batched(
            || build::<understory_bih::IntervalSplit>(&boxes),
            |(mut tree, ids): (Bih<u32>, _)| {
                for (i, id) in ids.into_iter().enumerate().step_by(3) {
                    tree.remove(id);
                    tree.insert(boxes[i], i as u32);
                }
                tree.full_distribute();
                black_box(tree.len());
            },
            BatchSize::SmallInput,
        );
    });
    group.finish();
}

fn bench_traverse(c: &mut Criterion) {
    let mut group = c.benchmark_group("traverse");
    let boxes = gen_clustered_boxes(32, 128, 60.0);
    let (mut bih, _) = build::<understory_bih::IntervalSplit>(&boxes);
    let (mut bvh, _): (Bvh<u32>, _) = build(&boxes);
    let viewpoint = [2000.0, 2000.0, -500.0];
    group.bench_function("bih_front_to_back_all", |b| {
        b.iter(|| {
            let mut n = 0usize;
            bih.front_to_back(viewpoint, PlaneMask::default(), |t, id, _| {
                n += t.object_count(id);
                true
            });
            black_box(n)
        });
    });
    group.bench_function("bvh_front_to_back_all", |b| {
        b.iter(|| {
            let mut n = 0usize;
            bvh.front_to_back(viewpoint, PlaneMask::default(), |t, id, _| {
                n += t.object_count(id);
                true
            });
            black_box(n)
        });
    });
    group.bench_function("bih_query_box", |b| {
        let q = Aabb3D::new([1000.0; 3], [2000.0; 3]);
        b.iter(|| black_box(bih.query_box(q).count()));
    });
    group.finish();
}

criterion_group!(benches, bench_build, bench_churn, bench_traverse);
criterion_main!(benches);
