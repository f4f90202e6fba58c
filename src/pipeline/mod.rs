/// 帧处理流水线 (Frame Processing Pipeline)
///
/// 单线程周期: Fetch → Process → Present → Cleanup
/// - Fetch:   从帧源取一帧 (唯一的阻塞点, 带超时)
/// - Process: 校验 → 彩色转换 → 深度伪彩色 → 中心测距 → 帧号/FPS → HUD
/// - Present: 交给显示端
/// - Cleanup: 工作图像随作用域结束归还缓冲池
pub mod cancel;
pub mod fps;

use crate::display::{DisplaySink, SinkError};
use crate::frame::{
    ChannelOrder, FrameError, FrameMeta, ImagePool, ImageView, PixelLayout, PoolStats,
    UnifiedFrame, WorkingImage,
};
use crate::hud::HudPainter;
use crate::input::{FetchError, FrameSource};
use crate::processing::{center_distance, convert_color, DepthColorizer};
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::{debug, error, info, warn};

pub use cancel::{CancelFlag, CancelToken, NeverCancel};
pub use fps::FpsTracker;

pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_millis(1000);

/// 致命错误, 结束主循环
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HubError {
    #[error("frame source failed: {0}")]
    Device(String),
}

/// 单个周期的结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CycleOutcome {
    Presented { frame_index: u64 },
    /// 取帧超时, 本周期跳过
    Dropped,
    /// 畸形帧, 不消耗帧号
    Rejected(FrameError),
    RenderFailed(SinkError),
    SinkClosed,
}

/// 主循环统计
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunSummary {
    pub presented: u64,
    pub dropped: u64,
    pub rejected: u64,
    pub render_failures: u64,
    pub last_frame_index: u64,
    pub last_fps: f64,
}

/// 处理完成、等待呈现的一帧
#[derive(Debug)]
pub struct ProcessedFrame {
    pub color: WorkingImage,
    pub depth: WorkingImage,
    pub meta: FrameMeta,
    pub distance_m: f64,
    pub fps: f64,
}

pub struct Orchestrator<S: FrameSource> {
    source: S,
    source_order: ChannelOrder,
    colorizer: DepthColorizer,
    painter: HudPainter,
    pool: ImagePool,
    fetch_timeout: Duration,
    fps: FpsTracker,
}

impl<S: FrameSource> Orchestrator<S> {
    pub fn new(
        source: S,
        source_order: ChannelOrder,
        colorizer: DepthColorizer,
        painter: HudPainter,
    ) -> Self {
        Self {
            source,
            source_order,
            colorizer,
            painter,
            pool: ImagePool::new(),
            fetch_timeout: DEFAULT_FETCH_TIMEOUT,
            fps: FpsTracker::new(Instant::now()),
        }
    }

    pub fn with_fetch_timeout(mut self, timeout: Duration) -> Self {
        self.fetch_timeout = timeout;
        self
    }

    pub fn fps(&self) -> f64 {
        self.fps.fps()
    }

    pub fn frames_processed(&self) -> u64 {
        self.fps.count()
    }

    pub fn pool_stats(&self) -> PoolStats {
        self.pool.stats()
    }

    pub fn painter(&self) -> &HudPainter {
        &self.painter
    }

    pub fn colorizer(&self) -> &DepthColorizer {
        &self.colorizer
    }

    /// 处理一帧; 校验失败时不消耗帧号, 也不更新 FPS
    pub fn process(
        &mut self,
        frame: &mut UnifiedFrame,
        target_order: ChannelOrder,
    ) -> Result<ProcessedFrame, FrameError> {
        frame.validate()?;

        let color_view = ImageView::new(&frame.raw_color, frame.width, frame.height, PixelLayout::Rgb8)?;
        let depth_view = ImageView::new(&frame.raw_depth, frame.width, frame.height, PixelLayout::Depth16)?;

        let mut color = convert_color(&color_view, self.source_order, target_order, &self.pool)?;
        let mut depth = self.colorizer.colorize(&depth_view, target_order, &self.pool)?;
        let distance_m = center_distance(&frame.raw_depth, frame.width, frame.height);

        frame.frame_index = self.fps.record(Instant::now());
        let meta = frame.meta();
        let fps = self.fps.fps();

        for image in [&mut color, &mut depth] {
            self.painter.overlay_hud(image, &meta, fps);
            self.painter.draw_center_distance(image, &meta, distance_m);
        }

        Ok(ProcessedFrame {
            color,
            depth,
            meta,
            distance_m,
            fps,
        })
    }

    /// 执行一个完整周期; 只有设备错误返回 Err
    pub fn run_cycle<D: DisplaySink + ?Sized>(&mut self, sink: &mut D) -> Result<CycleOutcome, HubError> {
        let mut frame = match self.source.fetch(self.fetch_timeout) {
            Ok(frame) => frame,
            Err(FetchError::Timeout(timeout)) => {
                warn!("⏱️ 取帧超时 ({:?}), 跳过本周期", timeout);
                return Ok(CycleOutcome::Dropped);
            }
            Err(FetchError::Device(reason)) => {
                error!("❌ 帧源故障: {}", reason);
                return Err(HubError::Device(reason));
            }
        };

        let processed = match self.process(&mut frame, sink.channel_order()) {
            Ok(processed) => processed,
            Err(e) => {
                warn!("⚠️ 丢弃畸形帧: {}", e);
                return Ok(CycleOutcome::Rejected(e));
            }
        };

        let frame_index = processed.meta.frame_index;
        debug!(
            frame = frame_index,
            distance_m = processed.distance_m,
            fps = processed.fps,
            "帧处理完成"
        );

        // processed 在此作用域结束时归还全部缓冲区
        match sink.render(&processed.color, &processed.depth) {
            Ok(()) => Ok(CycleOutcome::Presented { frame_index }),
            Err(SinkError::Closed) => Ok(CycleOutcome::SinkClosed),
            Err(e) => {
                warn!("⚠️ 呈现失败 (帧 {}): {}", frame_index, e);
                Ok(CycleOutcome::RenderFailed(e))
            }
        }
    }

    /// 循环执行周期, 直到取消、显示端关闭或帧源故障
    pub fn run<D, C>(&mut self, sink: &mut D, cancel: &C) -> Result<RunSummary, HubError>
    where
        D: DisplaySink + ?Sized,
        C: CancelToken + ?Sized,
    {
        info!("🚀 主循环启动 (取帧超时 {:?})", self.fetch_timeout);
        let mut summary = RunSummary::default();

        while !cancel.is_cancelled() {
            match self.run_cycle(sink)? {
                CycleOutcome::Presented { frame_index } => {
                    summary.presented += 1;
                    summary.last_frame_index = frame_index;
                }
                CycleOutcome::Dropped => summary.dropped += 1,
                CycleOutcome::Rejected(_) => summary.rejected += 1,
                CycleOutcome::RenderFailed(_) => summary.render_failures += 1,
                CycleOutcome::SinkClosed => {
                    info!("🛑 显示端已关闭");
                    break;
                }
            }
        }

        summary.last_fps = self.fps.fps();
        let pool = self.pool.stats();
        info!(
            "📊 呈现 {} 帧, 超时 {} 次, 畸形帧 {} 个, 呈现失败 {} 次, FPS {:.1}",
            summary.presented, summary.dropped, summary.rejected, summary.render_failures, summary.last_fps
        );
        debug!(
            "缓冲池: 分配 {} 次, 复用 {} 次, 未归还 {}",
            pool.allocations, pool.reuses, pool.outstanding
        );
        Ok(summary)
    }
}
