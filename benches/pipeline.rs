use criterion::{black_box, criterion_group, criterion_main, Criterion};
use selection_bias::{BlockFontSource, GlyphMaskGenerator, IntensityField, SelectionMasker};

fn bench_generate(c: &mut Criterion) {
    let system = GlyphMaskGenerator::new();
    let block = GlyphMaskGenerator::with_sources(vec![Box::new(BlockFontSource)]);
    let geometric = GlyphMaskGenerator::with_sources(Vec::new());

    let mut group = c.benchmark_group("generate_400");
    group.bench_function("default_chain", |b| {
        b.iter(|| system.generate(black_box(400), black_box(400), 'S', 0.9))
    });
    group.bench_function("block_font", |b| {
        b.iter(|| block.generate(black_box(400), black_box(400), 'S', 0.9))
    });
    group.bench_function("geometric", |b| {
        b.iter(|| geometric.generate(black_box(400), black_box(400), 'S', 0.9))
    });
    group.finish();
}

fn bench_apply(c: &mut Criterion) {
    let mask = GlyphMaskGenerator::with_sources(vec![Box::new(BlockFontSource)])
        .generate(400, 400, 'S', 0.9)
        .unwrap();
    let sample = IntensityField::from_fn(400, 400, |i, j| {
        if (i * 7 + j * 13) % 11 == 0 {
            0.0
        } else {
            1.0
        }
    })
    .unwrap();
    let masker = SelectionMasker::default();

    c.bench_function("apply_400", |b| {
        b.iter(|| masker.apply(black_box(&sample), black_box(&mask)))
    });
    c.bench_function("apply_with_stats_400", |b| {
        b.iter(|| masker.apply_with_stats(black_box(&sample), black_box(&mask)))
    });
}

criterion_group!(benches, bench_generate, bench_apply);
criterion_main!(benches);
