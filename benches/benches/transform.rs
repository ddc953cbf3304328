// Copyright 2025 the Registra Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use criterion::{Criterion, black_box, criterion_group, criterion_main};
use kurbo::{Affine, Point, Rect, Size};
use registra_view::{AnchorMode, CellIndex, CellViewportState, ViewportTransformEngine, affine};

#[derive(Clone)]
struct Lcg(u64);

impl Lcg {
    fn new(seed: u64) -> Self {
        Self(seed)
    }

    fn next_f64(&mut self) -> f64 {
        // Numerical Recipes LCG parameters.
        self.0 = self.0.wrapping_mul(6364136223846793005).wrapping_add(1);
        f64::from((self.0 >> 32) as u32) / f64::from(u32::MAX)
    }

    fn range(&mut self, lo: f64, hi: f64) -> f64 {
        lo + (hi - lo) * self.next_f64()
    }
}

fn random_states(n: usize, seed: u64) -> Vec<CellViewportState> {
    let mut rng = Lcg::new(seed);
    (0..n)
        .map(|_| {
            CellViewportState::new(
                CellIndex(0),
                Size::new(40_000.0, 30_000.0),
                Size::new(rng.range(200.0, 1600.0), rng.range(200.0, 1200.0)),
            )
            .with_zoom(rng.range(0.01, 40.0))
            .with_pan_offset(Point::new(rng.range(0.0, 40_000.0), rng.range(0.0, 30_000.0)))
        })
        .collect()
}

fn bench_transform(c: &mut Criterion) {
    let mut group = c.benchmark_group("registra_view");

    let states = random_states(1_024, 0x5EED_0000_0000_0001);
    for anchor in [AnchorMode::Center, AnchorMode::TopLeft] {
        group.bench_function(format!("recompute({anchor:?},n=1024)"), |b| {
            let mut engine = ViewportTransformEngine::new(anchor);
            b.iter(|| {
                for state in &states {
                    black_box(engine.recompute(black_box(state)).ok());
                }
            });
        });
    }

    let t = Affine::translate((250.0, 200.0))
        * Affine::scale(2.0)
        * Affine::translate((-100.0, -50.0));
    group.bench_function("invert", |b| {
        b.iter(|| black_box(affine::invert(black_box(t)).ok()));
    });

    let mut rng = Lcg::new(0x5EED_0000_0000_0002);
    let points: Vec<Point> = (0..4_096)
        .map(|_| Point::new(rng.range(-1e4, 1e4), rng.range(-1e4, 1e4)))
        .collect();
    group.bench_function("inverse_map_point(n=4096)", |b| {
        b.iter(|| {
            for &p in &points {
                black_box(affine::inverse_map_point(t, p).ok());
            }
        });
    });
    group.bench_function("map_rect", |b| {
        let rect = Rect::new(10.0, 20.0, 300.0, 400.0);
        b.iter(|| black_box(affine::map_rect(black_box(t), rect)));
    });

    group.finish();
}

criterion_group!(benches, bench_transform);
criterion_main!(benches);
