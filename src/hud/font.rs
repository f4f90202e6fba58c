/// HUD 字体 (HUD Font)
///
/// - TrueType: ab_glyph 解析字体文件, imageproc 负责光栅化
/// - Bitmap:   内置 5x7 点阵字体, 按整数倍放大
use super::glyphs::{glyph_bits, GLYPH_ADVANCE, GLYPH_HEIGHT, GLYPH_WIDTH};
use crate::frame::working::PixelBuffer;
use ab_glyph::{FontVec, PxScale};
use image::Rgb;
use std::fmt;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{info, warn};

#[derive(Debug, Error)]
pub enum FontError {
    #[error("failed to read font file {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid font data in {}", path.display())]
    Invalid { path: PathBuf },
}

pub enum HudFont {
    TrueType { font: FontVec, scale: PxScale },
    Bitmap { scale: u32 },
}

impl HudFont {
    /// 点阵字体, 放大倍数由目标字号换算
    pub fn bitmap(size_px: f32) -> Self {
        let scale = (size_px / GLYPH_HEIGHT as f32).round().max(1.0) as u32;
        HudFont::Bitmap { scale }
    }

    pub fn from_file(path: &Path, size_px: f32) -> Result<Self, FontError> {
        let data = std::fs::read(path).map_err(|source| FontError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let font = FontVec::try_from_vec(data).map_err(|_| FontError::Invalid {
            path: path.to_path_buf(),
        })?;
        Ok(HudFont::TrueType {
            font,
            scale: PxScale::from(size_px),
        })
    }

    /// 优先加载字体文件, 失败时回退到点阵字体
    pub fn load(path: Option<&Path>, size_px: f32) -> Self {
        let Some(path) = path else {
            return Self::bitmap(size_px);
        };
        match Self::from_file(path, size_px) {
            Ok(font) => {
                info!("✅ 字体已加载: {}", path.display());
                font
            }
            Err(e) => {
                warn!("⚠️  字体加载失败: {}, 使用内置点阵字体", e);
                Self::bitmap(size_px)
            }
        }
    }

    pub fn is_bitmap(&self) -> bool {
        matches!(self, HudFont::Bitmap { .. })
    }

    /// 文本包围盒 (宽, 高)
    pub fn text_size(&self, text: &str) -> (u32, u32) {
        match self {
            HudFont::TrueType { font, scale } => imageproc::drawing::text_size(*scale, font, text),
            HudFont::Bitmap { scale } => {
                let count = text.chars().count() as u32;
                if count == 0 {
                    return (0, 0);
                }
                let width = (count * GLYPH_ADVANCE - (GLYPH_ADVANCE - GLYPH_WIDTH)) * scale;
                (width, GLYPH_HEIGHT * scale)
            }
        }
    }

    /// 以 (x, y) 为左上角绘制文本, 超出画布的部分被裁剪
    pub fn draw_text(&self, canvas: &mut PixelBuffer, color: Rgb<u8>, x: i32, y: i32, text: &str) {
        match self {
            HudFont::TrueType { font, scale } => {
                imageproc::drawing::draw_text_mut(canvas, color, x, y, *scale, font, text);
            }
            HudFont::Bitmap { scale } => draw_bitmap_text(canvas, color, x, y, *scale, text),
        }
    }
}

impl fmt::Debug for HudFont {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HudFont::TrueType { scale, .. } => f
                .debug_struct("TrueType")
                .field("scale", &(scale.x, scale.y))
                .finish(),
            HudFont::Bitmap { scale } => f.debug_struct("Bitmap").field("scale", scale).finish(),
        }
    }
}

fn draw_bitmap_text(canvas: &mut PixelBuffer, color: Rgb<u8>, x: i32, y: i32, scale: u32, text: &str) {
    let (width, height) = (canvas.width() as i32, canvas.height() as i32);
    let step = scale as i32;
    let mut pen_x = x;

    for ch in text.chars() {
        if let Some(rows) = glyph_bits(ch) {
            for (row, pattern) in rows.iter().enumerate() {
                for col in 0..GLYPH_WIDTH {
                    if (pattern >> (GLYPH_WIDTH - 1 - col)) & 1 == 0 {
                        continue;
                    }
                    let left = pen_x + col as i32 * step;
                    let top = y + row as i32 * step;
                    for py in top.max(0)..(top + step).min(height) {
                        for px in left.max(0)..(left + step).min(width) {
                            canvas.put_pixel(px as u32, py as u32, color);
                        }
                    }
                }
            }
        }
        pen_x += GLYPH_ADVANCE as i32 * step;
    }
}
