/// 显示输出 (Display Sink)
///
/// - DisplaySink:     呈现接口, 声明所需的通道顺序
/// - HeadlessSink:    无窗口, 只记录呈现统计
/// - MacroquadScreen: 双画面窗口 (feature = "gui")
#[cfg(feature = "gui")]
pub mod window;

#[cfg(feature = "gui")]
pub use window::MacroquadScreen;

use crate::frame::{ChannelOrder, WorkingImage};
use std::time::Instant;
use thiserror::Error;
use tracing::{debug, info};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SinkError {
    /// 窗口已关闭, 正常结束主循环
    #[error("display sink closed")]
    Closed,
    #[error("color {color:?} and depth {depth:?} images differ in size")]
    DimensionMismatch { color: (u32, u32), depth: (u32, u32) },
    #[error("render failed: {0}")]
    Render(String),
}

pub trait DisplaySink {
    /// 期望的通道顺序 (窗口系统通常为 BGR)
    fn channel_order(&self) -> ChannelOrder {
        ChannelOrder::Bgr
    }

    fn render(&mut self, color: &WorkingImage, depth: &WorkingImage) -> Result<(), SinkError>;
}

impl<S: DisplaySink + ?Sized> DisplaySink for Box<S> {
    fn channel_order(&self) -> ChannelOrder {
        (**self).channel_order()
    }

    fn render(&mut self, color: &WorkingImage, depth: &WorkingImage) -> Result<(), SinkError> {
        (**self).render(color, depth)
    }
}

pub(crate) fn check_dimensions(color: &WorkingImage, depth: &WorkingImage) -> Result<(), SinkError> {
    let c = (color.width(), color.height());
    let d = (depth.width(), depth.height());
    if c != d {
        return Err(SinkError::DimensionMismatch { color: c, depth: d });
    }
    Ok(())
}

/// 3 通道图像 → RGBA8 (纹理上传用), 复用 out 的容量
pub fn to_rgba(image: &WorkingImage, out: &mut Vec<u8>) {
    out.clear();
    out.reserve(image.as_raw().len() / 3 * 4);
    let order = image.order();
    for px in image.as_raw().chunks_exact(3) {
        let [r, g, b] = order.to_rgb([px[0], px[1], px[2]]);
        out.extend_from_slice(&[r, g, b, 255]);
    }
}

/// 无窗口输出
///
/// 每 report_every 帧输出一次呈现帧率; 设置上限后, 达到上限的下一次呈现返回 Closed。
pub struct HeadlessSink {
    presented: u64,
    limit: Option<u64>,
    report_every: u64,
    window_start: Instant,
    last_center: Option<[u8; 3]>,
}

impl Default for HeadlessSink {
    fn default() -> Self {
        Self::new()
    }
}

impl HeadlessSink {
    pub fn new() -> Self {
        Self {
            presented: 0,
            limit: None,
            report_every: 30,
            window_start: Instant::now(),
            last_center: None,
        }
    }

    pub fn with_limit(mut self, limit: Option<u64>) -> Self {
        self.limit = limit;
        self
    }

    pub fn presented(&self) -> u64 {
        self.presented
    }

    /// 最近一帧深度图中心像素 (RGB)
    pub fn last_center(&self) -> Option<[u8; 3]> {
        self.last_center
    }
}

impl DisplaySink for HeadlessSink {
    fn render(&mut self, color: &WorkingImage, depth: &WorkingImage) -> Result<(), SinkError> {
        if self.limit.is_some_and(|limit| self.presented >= limit) {
            return Err(SinkError::Closed);
        }
        check_dimensions(color, depth)?;

        self.presented += 1;
        self.last_center = depth.rgb_at(depth.width() / 2, depth.height() / 2);
        debug!(frame = self.presented, "🖥️ 呈现 {}x{}", color.width(), color.height());

        if self.presented % self.report_every == 0 {
            let now = Instant::now();
            let elapsed = now.duration_since(self.window_start).as_secs_f64();
            if elapsed > 0.0 {
                info!(
                    "🖥️ 已呈现 {} 帧, 呈现帧率 {:.1} FPS",
                    self.presented,
                    self.report_every as f64 / elapsed
                );
            }
            self.window_start = now;
        }
        Ok(())
    }
}
