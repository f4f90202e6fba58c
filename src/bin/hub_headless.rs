/// 无窗口运行 (Headless Hub)
///
/// 模拟相机 → 流水线 → 呈现统计, 适合在无显示环境下验证吞吐。
use anyhow::{Context, Result};
use clap::Parser;
use rgbd_hud::telemetry::init_logging;
use rgbd_hud::pipeline::CancelFlag;
use rgbd_hud::{build_orchestrator, Args, HeadlessSink};
use tracing::{info, warn};

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    info!("🚀 RGB-D HUD 启动 (无窗口)");
    info!("📐 分辨率: {}x{} @ {}fps", args.width, args.height, args.fps);
    info!("🎨 颜色表: {:?}, 最大深度 {}mm", args.palette, args.max_depth_mm);

    let mut orchestrator = build_orchestrator(&args).context("failed to start synthetic camera")?;
    let mut sink = HeadlessSink::new().with_limit(args.max_frames);

    let cancel = CancelFlag::on_interrupt().unwrap_or_else(|e| {
        warn!("⚠️  无法安装 Ctrl-C 处理器: {}", e);
        CancelFlag::new()
    });
    info!("⌨️  按 Ctrl-C 结束");

    let summary = orchestrator
        .run(&mut sink, &cancel)
        .context("main loop aborted")?;

    info!(
        "✅ 结束: 呈现 {} 帧, 最后帧号 {}, FPS {:.1}",
        summary.presented, summary.last_frame_index, summary.last_fps
    );
    Ok(())
}
