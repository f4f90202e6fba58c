pub mod config; // 命令行参数与HUD样式
pub mod display; // 显示输出
pub mod frame; // 帧数据模型
pub mod hud; // HUD合成
pub mod input; // 帧源
pub mod pipeline; // 周期编排
pub mod processing; // 彩色转换/深度伪彩色/测距
pub mod telemetry; // 日志

pub use crate::config::{Args, HudStyle};
pub use crate::display::{DisplaySink, HeadlessSink, SinkError};
pub use crate::frame::{ChannelOrder, FrameError, FrameMeta, ImagePool, ImageView, UnifiedFrame, WorkingImage};
pub use crate::hud::HudPainter;
pub use crate::input::{FetchError, FrameSource, SyntheticCamera, SyntheticConfig};
pub use crate::pipeline::{CancelFlag, CancelToken, CycleOutcome, HubError, Orchestrator, RunSummary};
pub use crate::processing::{DepthColorizer, DepthPalette, DEFAULT_MAX_DEPTH_MM};

/// 按命令行参数构建模拟相机 + 编排器
pub fn build_orchestrator(args: &Args) -> Result<Orchestrator<SyntheticCamera>, FetchError> {
    let camera = SyntheticCamera::start(SyntheticConfig {
        width: args.width,
        height: args.height,
        fps: args.fps,
        noise_mm: args.noise_mm,
        seed: args.seed,
        order: ChannelOrder::Rgb,
    })?;
    let order = camera.channel_order();

    let style = args.load_hud_style();
    Ok(Orchestrator::new(
        camera,
        order,
        DepthColorizer::new(args.max_depth_mm, args.palette),
        HudPainter::new(&style),
    )
    .with_fetch_timeout(args.fetch_timeout()))
}
