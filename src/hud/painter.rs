use super::font::HudFont;
use crate::config::HudStyle;
use crate::frame::{FrameMeta, WorkingImage};
use image::Rgb;
use imageproc::drawing::{draw_filled_rect_mut, draw_line_segment_mut};
use imageproc::rect::Rect;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.3f";

const BLACK: [u8; 3] = [0, 0, 0];
const WHITE: [u8; 3] = [255, 255, 255];
const GREEN: [u8; 3] = [0, 255, 0];

/// 面板矩形, 半开区间 [left, right) x [top, bottom)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PanelRect {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

impl PanelRect {
    pub fn contains(&self, x: i32, y: i32) -> bool {
        x >= self.left && x < self.right && y >= self.top && y < self.bottom
    }

    fn to_rect(self) -> Option<Rect> {
        if self.right <= self.left || self.bottom <= self.top {
            return None;
        }
        Some(
            Rect::at(self.left, self.top)
                .of_size((self.right - self.left) as u32, (self.bottom - self.top) as u32),
        )
    }
}

/// HUD 面板布局 (右上角时间, 左下角状态)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HudLayout {
    pub time_text: String,
    pub info_text: String,
    pub time_panel: PanelRect,
    pub info_panel: PanelRect,
    pub text_height: (i32, i32),
}

/// HUD 合成器
///
/// 状态只有字体与样式; 每次调用的内容都由帧元数据和 FPS 推导。
#[derive(Debug)]
pub struct HudPainter {
    font: HudFont,
    text_thickness: u32,
    label_outline_thickness: u32,
    label_fill_thickness: u32,
    panel_alpha: u8,
    crosshair_len: u32,
}

impl Default for HudPainter {
    fn default() -> Self {
        Self::new(&HudStyle::default())
    }
}

impl HudPainter {
    pub fn new(style: &HudStyle) -> Self {
        let style = style.clone().sanitized();
        Self::with_font(
            HudFont::load(style.font_path.as_deref(), style.font_size_px),
            &style,
        )
    }

    /// 样式先经过 sanitized 限幅
    pub fn with_font(font: HudFont, style: &HudStyle) -> Self {
        let style = style.clone().sanitized();
        Self {
            font,
            text_thickness: style.text_thickness,
            label_outline_thickness: style.label_outline_thickness,
            label_fill_thickness: style.label_fill_thickness,
            panel_alpha: style.panel_alpha,
            crosshair_len: style.crosshair_len,
        }
    }

    /// 按粗细修正后的文本尺寸
    fn measure(&self, text: &str, thickness: u32) -> (i32, i32) {
        let (w, h) = self.font.text_size(text);
        let grow = thickness.saturating_sub(1);
        let clamp = |v: u32| i32::try_from(v.saturating_add(grow)).unwrap_or(i32::MAX);
        (clamp(w), clamp(h))
    }

    /// 计算 W x H 图像上的面板布局
    pub fn layout(&self, width: u32, height: u32, meta: &FrameMeta, fps: f64) -> HudLayout {
        let (w, h) = (width as i32, height as i32);

        let time_text = meta.timestamp.format(TIMESTAMP_FORMAT).to_string();
        let info_text = format!(
            "FPS: {:.1} | Res: {}x{} | Frame: {}",
            fps, meta.width, meta.height, meta.frame_index
        );

        let (tw, th) = self.measure(&time_text, self.text_thickness);
        let (iw, ih) = self.measure(&info_text, self.text_thickness);

        HudLayout {
            time_panel: PanelRect {
                left: w - tw - 20,
                top: 10,
                right: w - 10,
                bottom: 10 + th + 15,
            },
            info_panel: PanelRect {
                left: 10,
                top: h - ih - 20,
                right: 10 + iw + 10,
                bottom: h - 10,
            },
            time_text,
            info_text,
            text_height: (th, ih),
        }
    }

    /// 叠加半透明状态面板: 时间戳 (右上) + FPS/分辨率/帧号 (左下)
    pub fn overlay_hud(&self, image: &mut WorkingImage, meta: &FrameMeta, fps: f64) {
        if image.is_empty() {
            return;
        }

        let layout = self.layout(image.width(), image.height(), meta, fps);
        let order = image.order();

        // 1. 在副本上画黑色底衬
        let mut scratch = image.duplicate();
        for panel in [layout.time_panel, layout.info_panel] {
            if let Some(rect) = panel.to_rect() {
                draw_filled_rect_mut(scratch.pixels_mut(), rect, order.pixel(BLACK));
            }
        }

        // 2. alpha 混合: out = a*scratch + (1-a)*orig
        blend(image.as_raw_mut(), scratch.as_raw(), self.panel_alpha);
        drop(scratch);

        // 3. 文字直接画在结果上, 不参与混合
        let white = order.pixel(WHITE);
        let (th, ih) = layout.text_height;
        self.draw_text(
            image,
            &layout.time_text,
            layout.time_panel.left + 5,
            layout.time_panel.bottom - 8 - th,
            white,
            self.text_thickness,
        );
        self.draw_text(
            image,
            &layout.info_text,
            layout.info_panel.left + 5,
            layout.info_panel.bottom - 8 - ih,
            white,
            self.text_thickness,
        );
    }

    /// 中心准星 + 距离标签
    pub fn draw_center_distance(&self, image: &mut WorkingImage, meta: &FrameMeta, distance_m: f64) {
        if image.is_empty() {
            return;
        }

        let order = image.order();
        let green = order.pixel(GREEN);
        let (cx, cy) = ((image.width() / 2) as f32, (image.height() / 2) as f32);
        let half = (self.crosshair_len / 2) as f32;

        draw_line_segment_mut(image.pixels_mut(), (cx - half, cy), (cx + half, cy), green);
        draw_line_segment_mut(image.pixels_mut(), (cx, cy - half), (cx, cy + half), green);

        let label = format!("Dist: {:.2}m", distance_m);
        let (lw, _) = self.measure(&label, self.label_outline_thickness);
        let x = cx as i32 - lw / 2;
        let y = (cy + half) as i32 + 10;

        // 先画粗黑描边, 再画绿色
        self.draw_text(image, &label, x, y, order.pixel(BLACK), self.label_outline_thickness);
        self.draw_text(image, &label, x, y, green, self.label_fill_thickness);

        tracing::trace!(frame = meta.frame_index, distance_m, "准星已绘制");
    }

    /// 通过多次偏移绘制模拟笔画粗细
    fn draw_text(
        &self,
        image: &mut WorkingImage,
        text: &str,
        x: i32,
        y: i32,
        color: Rgb<u8>,
        thickness: u32,
    ) {
        let t = thickness.max(1) as i32;
        for dy in 0..t {
            for dx in 0..t {
                self.font
                    .draw_text(image.pixels_mut(), color, x + dx, y + dy, text);
            }
        }
    }
}

/// 逐字节混合, alpha 为 0-255 的整数权重 (结果四舍五入)
fn blend(base: &mut [u8], overlay: &[u8], alpha: u8) {
    let a = alpha as u32;
    let b = 255 - a;
    for (dst, &src) in base.iter_mut().zip(overlay) {
        *dst = ((a * src as u32 + b * *dst as u32 + 127) / 255) as u8;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::{ChannelOrder, ImagePool};
    use chrono::{Local, TimeZone};

    fn meta(width: u32, height: u32, frame_index: u64) -> FrameMeta {
        FrameMeta {
            width,
            height,
            timestamp: Local.with_ymd_and_hms(2024, 5, 1, 12, 34, 56).unwrap(),
            frame_index,
        }
    }

    #[test]
    fn test_blend_rounds() {
        let mut base = vec![255u8, 0, 100];
        blend(&mut base, &[0, 0, 100], 120);
        // 135/255*255 = 135, 0, 100
        assert_eq!(base, vec![135, 0, 100]);
    }

    #[test]
    fn test_layout_strings_and_geometry() {
        let painter = HudPainter::default();
        let m = meta(640, 480, 7);
        let layout = painter.layout(640, 480, &m, 29.96);

        assert_eq!(layout.time_text, "2024-05-01 12:34:56.000");
        assert_eq!(layout.info_text, "FPS: 30.0 | Res: 640x480 | Frame: 7");
        assert_eq!(layout.time_panel.right, 630);
        assert_eq!(layout.time_panel.top, 10);
        assert_eq!(layout.info_panel.left, 10);
        assert_eq!(layout.info_panel.bottom, 470);

        let (tw, th) = painter.measure(&layout.time_text, 2);
        assert_eq!(layout.time_panel.left, 640 - tw - 20);
        assert_eq!(layout.time_panel.bottom, 10 + th + 15);
    }

    #[test]
    fn test_overlay_keeps_size_and_changes_pixels() {
        let painter = HudPainter::default();
        let mut image = WorkingImage::new(640, 480, ChannelOrder::Bgr);
        painter.overlay_hud(&mut image, &meta(640, 480, 1), 0.0);

        assert_eq!((image.width(), image.height()), (640, 480));
        assert_eq!(image.as_raw().len(), 640 * 480 * 3);
        // 黑底上只有白色文字会改变像素
        assert!(image.as_raw().iter().any(|&b| b != 0));
    }

    #[test]
    fn test_overlay_is_deterministic() {
        let painter = HudPainter::default();
        let pool = ImagePool::new();
        let m = meta(320, 240, 3);

        let mut a = pool.acquire(320, 240, ChannelOrder::Rgb).unwrap();
        let mut b = pool.acquire(320, 240, ChannelOrder::Rgb).unwrap();
        painter.overlay_hud(&mut a, &m, 15.0);
        painter.overlay_hud(&mut b, &m, 15.0);
        painter.draw_center_distance(&mut a, &m, 1.5);
        painter.draw_center_distance(&mut b, &m, 1.5);

        assert_eq!(a.as_raw(), b.as_raw());
    }

    #[test]
    fn test_panels_are_translucent() {
        let painter = HudPainter::default();
        let mut image = WorkingImage::filled(640, 480, ChannelOrder::Rgb, WHITE);
        let m = meta(640, 480, 1);
        painter.overlay_hud(&mut image, &m, 0.0);

        let layout = painter.layout(640, 480, &m, 0.0);
        let (x, y) = (layout.time_panel.left + 1, layout.time_panel.top + 1);
        assert_eq!(image.rgb_at(x as u32, y as u32), Some([135, 135, 135]));
        // 面板外保持原样
        assert_eq!(image.rgb_at(320, 200), Some(WHITE));
    }

    #[test]
    fn test_scratch_returns_to_pool() {
        let painter = HudPainter::default();
        let pool = ImagePool::new();
        let mut image = pool.acquire(160, 120, ChannelOrder::Bgr).unwrap();
        painter.overlay_hud(&mut image, &meta(160, 120, 1), 0.0);

        assert_eq!(pool.stats().outstanding, 1);
    }

    #[test]
    fn test_crosshair_is_green() {
        let painter = HudPainter::default();
        let mut image = WorkingImage::new(640, 480, ChannelOrder::Bgr);
        painter.draw_center_distance(&mut image, &meta(640, 480, 1), 1.0);

        assert_eq!(image.rgb_at(320, 240), Some(GREEN));
        assert_eq!(image.rgb_at(315, 240), Some(GREEN));
        assert_eq!(image.rgb_at(320, 235), Some(GREEN));
        assert_eq!(image.rgb_at(320, 200), Some(BLACK));
    }

    #[test]
    fn test_oversized_style_is_clamped() {
        let style = HudStyle {
            text_thickness: u32::MAX,
            crosshair_len: u32::MAX,
            ..HudStyle::default()
        };
        let painter = HudPainter::with_font(HudFont::bitmap(14.0), &style);

        assert_eq!(painter.text_thickness, HudStyle::MAX_THICKNESS);
        assert_eq!(painter.crosshair_len, HudStyle::MAX_CROSSHAIR_LEN);
        let (w, _) = painter.measure("AB", u32::MAX);
        assert_eq!(w, i32::MAX);

        let mut image = WorkingImage::new(64, 48, ChannelOrder::Rgb);
        painter.draw_center_distance(&mut image, &meta(64, 48, 1), 1.0);
        assert_eq!(image.rgb_at(32, 24), Some(GREEN));
    }

    #[test]
    fn test_empty_image_is_untouched() {
        let painter = HudPainter::default();
        let mut image = WorkingImage::new(0, 0, ChannelOrder::Rgb);
        painter.overlay_hud(&mut image, &meta(0, 0, 1), 30.0);
        painter.draw_center_distance(&mut image, &meta(0, 0, 1), 2.0);

        assert!(image.is_empty());
        assert!(image.as_raw().is_empty());
    }
}
