// Copyright 2025 the Registra Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use criterion::{BatchSize, Criterion, black_box, criterion_group, criterion_main};
use kurbo::{Affine, Point, Size};
use registra_overlay::{CellSync, DrawingSurface, GridSize, ImageId, SyncConfig};
use registra_view::{CellIndex, CellViewportState, NavigationEvent, NavigationKind};

/// A surface that only remembers its transform.
#[derive(Default)]
struct Sink(Affine);

impl DrawingSurface for Sink {
    type DisposeError = core::convert::Infallible;

    fn set_transform(&mut self, transform: Affine) {
        self.0 = transform;
    }

    fn dispose(&mut self) -> Result<(), Self::DisposeError> {
        Ok(())
    }
}

fn bound_grid(grid: GridSize) -> CellSync<Sink> {
    let mut sync = CellSync::new(grid, SyncConfig::default());
    for cell in grid.cells() {
        let image = ImageId::new(format!("slide-{}", cell.0));
        let _ = sync
            .on_assignment(cell, &image, |_| Sink::default())
            .expect("cell is inside the grid");
    }
    sync
}

fn zoom_burst(cell: CellIndex, steps: u32) -> Vec<NavigationEvent> {
    (0..steps)
        .map(|i| {
            let state = CellViewportState::new(
                cell,
                Size::new(40_000.0, 30_000.0),
                Size::new(480.0, 360.0),
            )
            .with_zoom(0.05 * f64::from(i + 1))
            .with_pan_offset(Point::new(20_000.0 + f64::from(i), 15_000.0));
            NavigationEvent::new(NavigationKind::Zoom, state)
        })
        .collect()
}

fn bench_sync(c: &mut Criterion) {
    let mut group = c.benchmark_group("registra_overlay");
    group.sample_size(50);

    let grid = GridSize::new(4, 4);
    let events: Vec<NavigationEvent> = grid
        .cells()
        .flat_map(|cell| zoom_burst(cell, 64))
        .collect();

    group.bench_function("on_navigation(4x4,64 steps)", |b| {
        let mut sync = bound_grid(grid);
        b.iter(|| {
            for event in &events {
                black_box(sync.on_navigation(event).ok());
            }
        });
    });

    group.bench_function("screen_to_image(4x4)", |b| {
        let mut sync = bound_grid(grid);
        for cell in grid.cells() {
            let _ = sync.on_navigation(&zoom_burst(cell, 1)[0]);
        }
        b.iter(|| {
            let bridge = sync.bridge();
            for cell in grid.cells() {
                black_box(bridge.screen_to_image(cell, Point::new(240.0, 180.0)).ok());
            }
        });
    });

    group.bench_function("resize_grid(4x4->2x2->4x4)", |b| {
        b.iter_batched(
            || bound_grid(grid),
            |mut sync| {
                black_box(sync.on_grid_resized(GridSize::new(2, 2)));
                black_box(sync.on_grid_resized(grid));
                sync
            },
            BatchSize::SmallInput,
        );
    });

    group.finish();
}

criterion_group!(benches, bench_sync);
criterion_main!(benches);
