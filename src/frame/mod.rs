/// 帧数据模型 (Frame Data Model)
///
/// - UnifiedFrame: 彩色流与深度流对齐后的原子数据单元
/// - ImageView:    原始字节流上的零拷贝只读视图
/// - WorkingImage: 单个周期内使用的可写图像 (由 ImagePool 回收)
pub mod working;
pub mod view;

use chrono::{DateTime, Local};
use thiserror::Error;

pub use self::working::{ChannelOrder, ImagePool, PoolStats, WorkingImage};
pub use self::view::{ImageView, PixelLayout};

/// 帧处理错误 (畸形输入,不会中断实时循环)
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FrameError {
    #[error("invalid buffer size for {layout:?} {width}x{height}: expected {expected} bytes, got {actual}")]
    InvalidBufferSize {
        layout: PixelLayout,
        width: u32,
        height: u32,
        expected: usize,
        actual: usize,
    },
    #[error("frame dimensions {width}x{height} exceed addressable memory")]
    TooLarge { width: u32, height: u32 },
    #[error("frame has zero area ({width}x{height})")]
    EmptyFrame { width: u32, height: u32 },
    #[error("expected a {expected:?} view, got {actual:?}")]
    LayoutMismatch {
        expected: PixelLayout,
        actual: PixelLayout,
    },
}

/// 同步帧 (帧源 → 流水线)
///
/// 彩色与深度已由帧源对齐到同一像素网格,因此共用 width/height。
#[derive(Clone, Debug)]
pub struct UnifiedFrame {
    pub raw_color: Vec<u8>, // 3通道 8bit, 通道顺序由帧源决定
    pub raw_depth: Vec<u8>, // 小端 u16, 单位毫米
    pub width: u32,
    pub height: u32,
    pub timestamp: DateTime<Local>, // 捕获时刻
    pub frame_index: u64,           // 由编排器填写, 帧源保持 0
}

impl UnifiedFrame {
    pub fn new(
        raw_color: Vec<u8>,
        raw_depth: Vec<u8>,
        width: u32,
        height: u32,
        timestamp: DateTime<Local>,
    ) -> Self {
        Self {
            raw_color,
            raw_depth,
            width,
            height,
            timestamp,
            frame_index: 0,
        }
    }

    /// 检查缓冲区长度与分辨率是否一致
    pub fn validate(&self) -> Result<(), FrameError> {
        check_buffer(&self.raw_color, self.width, self.height, PixelLayout::Rgb8)?;
        check_buffer(&self.raw_depth, self.width, self.height, PixelLayout::Depth16)
    }

    pub fn meta(&self) -> FrameMeta {
        FrameMeta {
            width: self.width,
            height: self.height,
            timestamp: self.timestamp,
            frame_index: self.frame_index,
        }
    }
}

/// HUD 所需的帧元数据
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FrameMeta {
    pub width: u32,
    pub height: u32,
    pub timestamp: DateTime<Local>,
    pub frame_index: u64,
}

pub(crate) fn check_buffer(
    data: &[u8],
    width: u32,
    height: u32,
    layout: PixelLayout,
) -> Result<(), FrameError> {
    if width == 0 || height == 0 {
        return Err(FrameError::EmptyFrame { width, height });
    }

    let expected = layout
        .buffer_len(width, height)
        .ok_or(FrameError::TooLarge { width, height })?;
    if data.len() != expected {
        return Err(FrameError::InvalidBufferSize {
            layout,
            width,
            height,
            expected,
            actual: data.len(),
        });
    }
    Ok(())
}
