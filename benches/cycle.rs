use chrono::Local;
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use rgbd_hud::frame::ImageView;
use rgbd_hud::frame::PixelLayout;
use rgbd_hud::input::{FetchError, FrameSource};
use rgbd_hud::processing::{center_distance, convert_color};
use rgbd_hud::{
    ChannelOrder, DepthColorizer, DepthPalette, HudPainter, ImagePool, Orchestrator, UnifiedFrame,
};
use std::time::Duration;

const WIDTH: u32 = 640;
const HEIGHT: u32 = 480;

struct NoSource;

impl FrameSource for NoSource {
    fn fetch(&mut self, timeout: Duration) -> Result<UnifiedFrame, FetchError> {
        Err(FetchError::Timeout(timeout))
    }
}

fn test_frame() -> UnifiedFrame {
    let pixels = (WIDTH * HEIGHT) as usize;
    let raw_color = (0..pixels * 3).map(|i| (i % 251) as u8).collect();
    let raw_depth = (0..pixels)
        .flat_map(|i| (((i % WIDTH as usize) * 6) as u16).to_le_bytes())
        .collect();
    UnifiedFrame::new(raw_color, raw_depth, WIDTH, HEIGHT, Local::now())
}

fn bench_stages(c: &mut Criterion) {
    let frame = test_frame();
    let pool = ImagePool::new();
    let colorizer = DepthColorizer::new(4000, DepthPalette::Jet);
    let color_view = ImageView::new(&frame.raw_color, WIDTH, HEIGHT, PixelLayout::Rgb8).unwrap();
    let depth_view = ImageView::new(&frame.raw_depth, WIDTH, HEIGHT, PixelLayout::Depth16).unwrap();

    c.bench_function("convert_color 640x480", |b| {
        b.iter(|| convert_color(black_box(&color_view), ChannelOrder::Rgb, ChannelOrder::Bgr, &pool).unwrap())
    });

    c.bench_function("colorize 640x480", |b| {
        b.iter(|| colorizer.colorize(black_box(&depth_view), ChannelOrder::Bgr, &pool).unwrap())
    });

    c.bench_function("center_distance", |b| {
        b.iter(|| center_distance(black_box(&frame.raw_depth), WIDTH, HEIGHT))
    });
}

fn bench_process(c: &mut Criterion) {
    let mut frame = test_frame();
    let mut orchestrator = Orchestrator::new(
        NoSource,
        ChannelOrder::Rgb,
        DepthColorizer::default(),
        HudPainter::default(),
    );

    c.bench_function("process 640x480", |b| {
        b.iter(|| {
            let processed = orchestrator.process(&mut frame, ChannelOrder::Bgr).unwrap();
            black_box(processed.distance_m)
        })
    });
}

criterion_group!(benches, bench_stages, bench_process);
criterion_main!(benches);
