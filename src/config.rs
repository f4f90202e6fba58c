//! 运行配置 - 命令行参数 + HUD样式JSON文件

use crate::processing::{DepthPalette, DEFAULT_MAX_DEPTH_MM};
use clap::Parser;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, warn};

/// 深度相机HUD参数
#[derive(Parser, Debug, Clone)]
#[command(author, version, about = "RGB-D 实时HUD (彩色 + 深度伪彩色 + 中心测距)", long_about = None)]
pub struct Args {
    /// 采集宽度
    #[arg(long, default_value_t = 640)]
    pub width: u32,

    /// 采集高度
    #[arg(long, default_value_t = 480)]
    pub height: u32,

    /// 采集帧率
    #[arg(long, default_value_t = 30)]
    pub fps: u32,

    /// 伪彩色归一化上限 (毫米)
    #[arg(long, default_value_t = DEFAULT_MAX_DEPTH_MM)]
    pub max_depth_mm: u16,

    /// 深度颜色表
    #[arg(long, value_enum, default_value_t = DepthPalette::Jet)]
    pub palette: DepthPalette,

    /// 取帧超时 (毫秒)
    #[arg(long, default_value_t = 1000)]
    pub fetch_timeout_ms: u64,

    /// HUD样式JSON文件
    #[arg(long)]
    pub hud_style: Option<PathBuf>,

    /// 处理指定帧数后退出
    #[arg(long)]
    pub max_frames: Option<u64>,

    /// 模拟深度噪声幅度 (毫米)
    #[arg(long, default_value_t = 0)]
    pub noise_mm: u16,

    /// 模拟数据随机种子
    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// 输出调试日志
    #[arg(short, long)]
    pub verbose: bool,
}

impl Args {
    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_millis(self.fetch_timeout_ms)
    }

    /// 读取HUD样式; 未指定文件时使用默认值
    pub fn load_hud_style(&self) -> HudStyle {
        match &self.hud_style {
            Some(path) => HudStyle::load(path),
            None => HudStyle::default(),
        }
    }
}

/// HUD样式
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HudStyle {
    pub font_path: Option<PathBuf>, // TrueType字体, 为空时使用内置点阵字体
    pub font_size_px: f32,          // 字号 (像素)
    pub text_thickness: u32,        // 面板文字粗细
    pub label_outline_thickness: u32, // 测距标签描边粗细
    pub label_fill_thickness: u32,    // 测距标签填充粗细
    pub panel_alpha: u8,            // 面板不透明度 (0-255)
    pub crosshair_len: u32,         // 准星线段长度
}

impl Default for HudStyle {
    fn default() -> Self {
        Self {
            font_path: None,
            font_size_px: 14.0,
            text_thickness: 2,
            label_outline_thickness: 4,
            label_fill_thickness: 2,
            panel_alpha: 120,
            crosshair_len: 20,
        }
    }
}

impl HudStyle {
    pub const FONT_SIZE_RANGE: (f32, f32) = (6.0, 96.0);
    pub const MAX_THICKNESS: u32 = 8;
    pub const MAX_CROSSHAIR_LEN: u32 = 400;

    /// 把各项限制在可绘制范围内
    pub fn sanitized(self) -> Self {
        let (min_size, max_size) = Self::FONT_SIZE_RANGE;
        let font_size_px = if self.font_size_px.is_finite() {
            self.font_size_px.clamp(min_size, max_size)
        } else {
            Self::default().font_size_px
        };
        let thickness = |t: u32| t.clamp(1, Self::MAX_THICKNESS);

        Self {
            font_size_px,
            text_thickness: thickness(self.text_thickness),
            label_outline_thickness: thickness(self.label_outline_thickness),
            label_fill_thickness: thickness(self.label_fill_thickness),
            crosshair_len: self.crosshair_len.min(Self::MAX_CROSSHAIR_LEN),
            ..self
        }
    }

    /// 从JSON文件加载样式
    pub fn load(path: &Path) -> Self {
        match fs::read_to_string(path) {
            Ok(json) => match serde_json::from_str::<Self>(&json) {
                Ok(style) => {
                    info!("✅ HUD样式已从 {} 加载", path.display());
                    let clamped = style.clone().sanitized();
                    if clamped != style {
                        warn!("⚠️  HUD样式超出范围, 已修正为 {:?}", clamped);
                    }
                    clamped
                }
                Err(e) => {
                    warn!("⚠️  HUD样式解析失败: {}, 使用默认值", e);
                    Self::default()
                }
            },
            Err(_) => {
                info!("📝 HUD样式文件不存在, 创建默认样式...");
                let style = Self::default();
                style.save(path);
                style
            }
        }
    }

    /// 保存样式到JSON文件
    pub fn save(&self, path: &Path) {
        match serde_json::to_string_pretty(self) {
            Ok(json) => {
                if let Err(e) = fs::write(path, json) {
                    warn!("❌ 保存HUD样式失败: {}", e);
                } else {
                    info!("💾 HUD样式已保存到 {}", path.display());
                }
            }
            Err(e) => warn!("❌ 序列化HUD样式失败: {}", e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("rgbd-hud-{}-{}", std::process::id(), name))
    }

    #[test]
    fn test_args_defaults() {
        let args = Args::parse_from(["hub"]);
        assert_eq!((args.width, args.height, args.fps), (640, 480, 30));
        assert_eq!(args.max_depth_mm, 4000);
        assert_eq!(args.palette, DepthPalette::Jet);
        assert_eq!(args.fetch_timeout(), Duration::from_millis(1000));
        assert!(args.hud_style.is_none());
        assert!(args.max_frames.is_none());
    }

    #[test]
    fn test_args_overrides() {
        let args = Args::parse_from([
            "hub",
            "--width",
            "320",
            "--palette",
            "grayscale",
            "--max-depth-mm",
            "6000",
            "--max-frames",
            "5",
        ]);
        assert_eq!(args.width, 320);
        assert_eq!(args.palette, DepthPalette::Grayscale);
        assert_eq!(args.max_depth_mm, 6000);
        assert_eq!(args.max_frames, Some(5));
    }

    #[test]
    fn test_style_partial_json_uses_defaults() {
        let style: HudStyle = serde_json::from_str(r#"{"panel_alpha": 200}"#).unwrap();
        assert_eq!(style.panel_alpha, 200);
        assert_eq!(style.crosshair_len, 20);
        assert!(style.font_path.is_none());
    }

    #[test]
    fn test_style_load_creates_missing_file() {
        let path = temp_path("missing-style.json");
        let _ = fs::remove_file(&path);

        let style = HudStyle::load(&path);
        assert_eq!(style, HudStyle::default());
        assert!(path.exists());

        let reloaded = HudStyle::load(&path);
        assert_eq!(reloaded, style);
        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_style_sanitized_clamps_ranges() {
        let style = HudStyle {
            font_size_px: f32::NAN,
            text_thickness: 0,
            label_outline_thickness: u32::MAX,
            label_fill_thickness: 3,
            crosshair_len: u32::MAX,
            ..HudStyle::default()
        }
        .sanitized();

        assert_eq!(style.font_size_px, 14.0);
        assert_eq!(style.text_thickness, 1);
        assert_eq!(style.label_outline_thickness, HudStyle::MAX_THICKNESS);
        assert_eq!(style.label_fill_thickness, 3);
        assert_eq!(style.crosshair_len, HudStyle::MAX_CROSSHAIR_LEN);
        assert_eq!(HudStyle::default().sanitized(), HudStyle::default());
    }

    #[test]
    fn test_style_load_clamps_out_of_range_values() {
        let path = temp_path("huge-style.json");
        fs::write(
            &path,
            r#"{"font_size_px": 1000.0, "text_thickness": 4294967295, "crosshair_len": 4000000000}"#,
        )
        .unwrap();

        let style = HudStyle::load(&path);
        assert_eq!(style.font_size_px, 96.0);
        assert_eq!(style.text_thickness, HudStyle::MAX_THICKNESS);
        assert_eq!(style.crosshair_len, HudStyle::MAX_CROSSHAIR_LEN);
        assert_eq!(style.panel_alpha, 120);
        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_style_load_invalid_json_falls_back() {
        let path = temp_path("broken-style.json");
        fs::write(&path, "{ not json").unwrap();

        assert_eq!(HudStyle::load(&path), HudStyle::default());
        let _ = fs::remove_file(&path);
    }
}
