use criterion::{black_box, criterion_group, criterion_main, Criterion};
use glam::DVec2;
use std::sync::Arc;
use std::time::Duration;
use world_map::geo::{Extent, GeoPoint};
use world_map::map::{
    hit_test, hit_test_linear, BrailleRenderer, CoordinateTransform, CountryEntry, CountryIndex,
    DisplaySize, Highlight, Polygon, RenderPipeline, Shape,
};

/// Grid of jagged 8x8 degree countries covering most of the world
fn synthetic_index() -> CountryIndex {
    let mut entries = Vec::new();
    for row in 0..20 {
        for col in 0..44 {
            let x0 = -176.0 + col as f64 * 8.0;
            let y0 = -80.0 + row as f64 * 8.0;
            let mut ring = Vec::with_capacity(65);
            for i in 0..16 {
                let t = i as f64 / 16.0 * 7.0;
                let wobble = if i % 2 == 0 { 0.0 } else { 0.3 };
                ring.push(GeoPoint::new(x0 + t, y0 - wobble));
            }
            for i in 0..16 {
                let t = i as f64 / 16.0 * 7.0;
                ring.push(GeoPoint::new(x0 + 7.0, y0 + t));
            }
            for i in 0..16 {
                let t = i as f64 / 16.0 * 7.0;
                ring.push(GeoPoint::new(x0 + 7.0 - t, y0 + 7.0));
            }
            for i in 0..16 {
                let t = i as f64 / 16.0 * 7.0;
                ring.push(GeoPoint::new(x0, y0 + 7.0 - t));
            }
            ring.push(ring[0]);
            entries.push(CountryEntry {
                code: format!("C{row:02}{col:02}"),
                name: format!("Country {row}-{col}"),
                shape: Shape::new(vec![Polygon::new(ring, vec![])]),
            });
        }
    }
    CountryIndex::new(entries)
}

fn bench_transform(c: &mut Criterion) {
    let transform = CoordinateTransform::default();
    let display = DisplaySize::new(1280.0, 896.0).unwrap();
    let extent = Extent::new(-144.0, 144.0, -64.0, 64.0);
    c.bench_function("client_to_geo", |b| {
        b.iter(|| {
            let pixel = black_box(DVec2::new(640.0, 448.0));
            transform.client_to_geo(pixel, display, black_box(&extent))
        })
    });
}

fn bench_hit_test(c: &mut Criterion) {
    let index = synthetic_index();
    let p = GeoPoint::new(101.5, 42.5);
    c.bench_function("hit_test_grid", |b| b.iter(|| hit_test(&index, black_box(p))));
    c.bench_function("hit_test_linear", |b| b.iter(|| hit_test_linear(&index, black_box(p))));
}

fn bench_render(c: &mut Criterion) {
    let index = Arc::new(synthetic_index());
    // Cache of one frame with a fresh extent each iteration forces a full rasterization
    let renderer = BrailleRenderer::new(Arc::clone(&index), 1, Duration::from_secs(10));
    renderer.set_target(200, 60);
    let highlight = Highlight {
        selected: "C1022".into(),
        allies: vec!["C1021".into(), "C1023".into()],
        enemies: vec!["C0922".into()],
    };
    let mut shift = 0.0;
    c.bench_function("render_world_highlighted", |b| {
        b.iter(|| {
            shift = (shift + 0.001) % 1.0;
            let extent = Extent::new(-180.0 + shift, 180.0, -90.0, 90.0);
            renderer.render(black_box(&extent), Some(&highlight))
        })
    });
}

criterion_group!(benches, bench_transform, bench_hit_test, bench_render);
criterion_main!(benches);
