use criterion::{Criterion, black_box, criterion_group, criterion_main};
use qr_term::decoder::{decode_bmp, decode_pbm};
use qr_term::render::render;
use qr_term::{CharGrid, detector};

const PBM: &[u8] = include_bytes!("../tests/fixtures/qr_raster.pbm");
const BMP24: &[u8] = include_bytes!("../tests/fixtures/qr_raster_24.bmp");
const BMP32: &[u8] = include_bytes!("../tests/fixtures/qr_raster_32.bmp");

/// The fixture QR scaled up to phone-camera sizes
fn large_raster(scale: usize) -> CharGrid {
    let modules = detector::trim(&decode_pbm(PBM).unwrap()).unwrap();
    let rows = modules.rows().iter().flat_map(|row| {
        let wide: String = row.chars().flat_map(|c| std::iter::repeat_n(c, scale)).collect();
        std::iter::repeat_n(wide, scale)
    });
    rows.collect()
}

fn bench_decode_bmp(c: &mut Criterion) {
    c.bench_function("decode_bmp_24bpp_94x76", |b| {
        b.iter(|| decode_bmp(black_box(BMP24)).unwrap())
    });
    c.bench_function("decode_bmp_32bpp_94x76", |b| {
        b.iter(|| decode_bmp(black_box(BMP32)).unwrap())
    });
}

fn bench_decode_pbm(c: &mut Criterion) {
    c.bench_function("decode_pbm_94x76", |b| {
        b.iter(|| decode_pbm(black_box(PBM)).unwrap())
    });
}

fn bench_trim(c: &mut Criterion) {
    let small = decode_pbm(PBM).unwrap();
    c.bench_function("trim_94x76", |b| {
        b.iter(|| detector::trim(black_box(&small)).unwrap())
    });

    let large = large_raster(16);
    c.bench_function("trim_464x464", |b| {
        b.iter(|| detector::trim(black_box(&large)).unwrap())
    });
}

fn bench_render(c: &mut Criterion) {
    let grid = detector::trim(&decode_pbm(PBM).unwrap()).unwrap();
    c.bench_function("render_29x29", |b| b.iter(|| render(black_box(&grid))));
}

criterion_group!(
    benches,
    bench_decode_bmp,
    bench_decode_pbm,
    bench_trim,
    bench_render
);
criterion_main!(benches);
