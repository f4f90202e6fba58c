/// 深度伪彩色 (Depth Colorizer)
///
/// 16bit 毫米深度 → 8bit 归一化 → 256 项颜色表。
/// 归一化范围固定为 [0, max_depth_mm],不做自动量程。
use crate::frame::{ChannelOrder, FrameError, ImagePool, ImageView, PixelLayout, WorkingImage};
use once_cell::sync::Lazy;

/// 默认最大深度 (毫米), 超过该值的采样全部映射到表尾
pub const DEFAULT_MAX_DEPTH_MM: u16 = 4000;

/// Jet 颜色表 (RGB): 0 → 深蓝, 中段 → 绿/黄, 255 → 深红
static JET_TABLE: Lazy<[[u8; 3]; 256]> = Lazy::new(|| {
    let mut table = [[0u8; 3]; 256];
    for (i, entry) in table.iter_mut().enumerate() {
        let v = i as f32 / 255.0;
        let channel = |center: f32| {
            let c = (1.5 - (4.0 * v - center).abs()).clamp(0.0, 1.0);
            (c * 255.0).round() as u8
        };
        *entry = [channel(3.0), channel(2.0), channel(1.0)];
    }
    table
});

static GRAYSCALE_TABLE: Lazy<[[u8; 3]; 256]> = Lazy::new(|| {
    let mut table = [[0u8; 3]; 256];
    for (i, entry) in table.iter_mut().enumerate() {
        *entry = [i as u8; 3];
    }
    table
});

/// 颜色表
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum DepthPalette {
    #[default]
    Jet,
    Grayscale,
}

impl DepthPalette {
    /// 256 项 RGB 颜色表
    pub fn table(&self) -> &'static [[u8; 3]; 256] {
        match self {
            DepthPalette::Jet => &JET_TABLE,
            DepthPalette::Grayscale => &GRAYSCALE_TABLE,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct DepthColorizer {
    max_depth_mm: u16,
    palette: DepthPalette,
}

impl Default for DepthColorizer {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_DEPTH_MM, DepthPalette::default())
    }
}

impl DepthColorizer {
    /// max_depth_mm 为 0 时按 1 处理
    pub fn new(max_depth_mm: u16, palette: DepthPalette) -> Self {
        Self {
            max_depth_mm: max_depth_mm.max(1),
            palette,
        }
    }

    pub fn max_depth_mm(&self) -> u16 {
        self.max_depth_mm
    }

    pub fn palette(&self) -> DepthPalette {
        self.palette
    }

    /// round(mm * 255 / max_depth_mm), 截断到 [0, 255]
    pub fn normalize(&self, mm: u16) -> u8 {
        let scaled = (mm as f32 * 255.0 / self.max_depth_mm as f32).round();
        scaled.min(255.0) as u8
    }

    /// 单个深度采样对应的 RGB 颜色
    pub fn color_of(&self, mm: u16) -> [u8; 3] {
        self.palette.table()[self.normalize(mm) as usize]
    }

    /// 深度视图 → 伪彩色工作图像 (target_order 通道顺序)
    pub fn colorize(
        &self,
        view: &ImageView<'_>,
        target_order: ChannelOrder,
        pool: &ImagePool,
    ) -> Result<WorkingImage, FrameError> {
        view.expect_layout(PixelLayout::Depth16)?;

        // 按目标通道顺序预先排好颜色表
        let mut ordered = [[0u8; 3]; 256];
        for (dst, rgb) in ordered.iter_mut().zip(self.palette.table().iter()) {
            *dst = target_order.pixel(*rgb).0;
        }

        let mut out = pool.acquire(view.width(), view.height(), target_order)?;
        for (dst, mm) in out.as_raw_mut().chunks_exact_mut(3).zip(view.depth_samples()) {
            dst.copy_from_slice(&ordered[self.normalize(mm) as usize]);
        }
        Ok(out)
    }
}
