// SPDX-License-Identifier: MPL-2.0
use criterion::{criterion_group, criterion_main, Criterion};
use roadlens::domain::metadata::GpsCoordinates;
use roadlens::media::exif::embed_gps;
use roadlens::media::frame_export::CapturedFrame;
use std::hint::black_box;
use std::sync::Arc;

fn frame_jpeg(width: u32, height: u32) -> Vec<u8> {
    let rgba: Vec<u8> = (0..width * height)
        .flat_map(|i| [(i % 251) as u8, (i % 241) as u8, 128, 255])
        .collect();
    CapturedFrame::new(Arc::new(rgba), width, height)
        .encode_jpeg(90)
        .expect("benchmark frame encodes")
}

fn exif_embedding_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("exif_embedding");
    let coordinate = GpsCoordinates::new(48.8584, 2.2945);

    let small = frame_jpeg(320, 240);
    group.bench_function("embed_gps_320x240", |b| {
        b.iter(|| black_box(embed_gps(black_box(&small), coordinate).unwrap()));
    });

    let hd = frame_jpeg(1280, 720);
    group.bench_function("embed_gps_1280x720", |b| {
        b.iter(|| black_box(embed_gps(black_box(&hd), coordinate).unwrap()));
    });

    // Replacing an existing EXIF segment walks the same header twice.
    let tagged = embed_gps(&hd, coordinate).unwrap();
    group.bench_function("reembed_gps_1280x720", |b| {
        b.iter(|| black_box(embed_gps(black_box(&tagged), coordinate).unwrap()));
    });

    group.finish();
}

criterion_group!(benches, exif_embedding_benchmark);
criterion_main!(benches);
