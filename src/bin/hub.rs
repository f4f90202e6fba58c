/// RGB-D 实时HUD (窗口版)
///
/// 主线程同时运行 macroquad 事件循环和处理周期; 按 Esc 退出。
use clap::Parser;
use macroquad::prelude::*;
use macroquad::window::Conf;
use rgbd_hud::display::MacroquadScreen;
use rgbd_hud::telemetry::init_logging;
use rgbd_hud::{build_orchestrator, Args, CycleOutcome};

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

fn window_conf() -> Conf {
    Conf {
        window_title: "RGB-D Vision Hub".to_owned(),
        window_width: 1280,
        window_height: 480,
        high_dpi: true,
        ..Default::default()
    }
}

#[macroquad::main(window_conf)]
async fn main() {
    let args = Args::parse();
    init_logging(args.verbose);

    tracing::info!("🚀 RGB-D HUD 启动");
    tracing::info!("📐 分辨率: {}x{} @ {}fps", args.width, args.height, args.fps);

    let mut orchestrator = match build_orchestrator(&args) {
        Ok(orchestrator) => orchestrator,
        Err(e) => {
            tracing::error!("❌ 模拟相机启动失败: {}", e);
            return;
        }
    };
    let mut screen = MacroquadScreen::new();

    loop {
        if is_key_pressed(KeyCode::Escape) {
            screen.close();
        }

        match orchestrator.run_cycle(&mut screen) {
            Ok(CycleOutcome::SinkClosed) => break,
            Ok(_) => {}
            Err(e) => {
                tracing::error!("❌ 主循环中止: {}", e);
                break;
            }
        }

        screen.draw();
        next_frame().await;
    }

    tracing::info!("👋 已退出, 共处理 {} 帧", orchestrator.frames_processed());
}
