//! 模拟 RGB-D 相机 - 无硬件时驱动完整流水线
//!
//! 彩色: 水平/垂直渐变; 深度: 由近到远的地面斜坡 + 一个左右移动的近处圆盘。

use super::{ChannelSource, FetchError, FrameMessage, FrameSource};
use crate::frame::{ChannelOrder, UnifiedFrame};
use chrono::{DateTime, Local};
use crossbeam_channel::{bounded, Sender, TrySendError};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// 斜坡近端/远端深度 (毫米)
const FLOOR_NEAR_MM: u32 = 800;
const FLOOR_FAR_MM: u32 = 3800;
/// 圆盘深度 (毫米)
const BLOB_MM: u16 = 1200;

#[derive(Debug, Clone)]
pub struct SyntheticConfig {
    pub width: u32,
    pub height: u32,
    pub fps: u32,
    pub noise_mm: u16, // 深度抖动幅度
    pub seed: u64,
    pub order: ChannelOrder, // 彩色流通道顺序
}

impl Default for SyntheticConfig {
    fn default() -> Self {
        Self {
            width: 640,
            height: 480,
            fps: 30,
            noise_mm: 0,
            seed: 42,
            order: ChannelOrder::Rgb,
        }
    }
}

/// 测试场景生成器 (不含线程, 可单独使用)
pub struct SceneGenerator {
    config: SyntheticConfig,
    rng: StdRng,
    tick: u64,
    last_timestamp: Option<DateTime<Local>>,
}

impl SceneGenerator {
    pub fn new(config: SyntheticConfig) -> Self {
        Self {
            rng: StdRng::seed_from_u64(config.seed),
            config,
            tick: 0,
            last_timestamp: None,
        }
    }

    /// 当前 tick 下圆盘的中心与半径
    pub fn blob(&self) -> (i64, i64, i64) {
        let (w, h) = (self.config.width as i64, self.config.height as i64);
        let radius = (h / 6).max(1);
        let span = (w - 2 * radius).max(1);
        // 往返运动
        let phase = (self.tick as i64 * 4) % (2 * span);
        let offset = if phase < span { phase } else { 2 * span - phase };
        (radius + offset, h / 2, radius)
    }

    pub fn next_frame(&mut self) -> UnifiedFrame {
        let SyntheticConfig {
            width,
            height,
            noise_mm,
            order,
            ..
        } = self.config;
        let pixels = width as usize * height as usize;
        let (bx, by, radius) = self.blob();

        let mut raw_color = Vec::with_capacity(pixels * 3);
        let mut raw_depth = Vec::with_capacity(pixels * 2);
        let shade = (self.tick.wrapping_mul(3) % 256) as u8;

        for y in 0..height {
            let floor = FLOOR_NEAR_MM + (FLOOR_FAR_MM - FLOOR_NEAR_MM) * (height - 1 - y) / height.max(1);
            for x in 0..width {
                let r = (x * 255 / width.max(1)) as u8;
                let g = (y * 255 / height.max(1)) as u8;
                raw_color.extend_from_slice(&order.pixel([r, g, shade]).0);

                let (dx, dy) = (x as i64 - bx, y as i64 - by);
                let mut mm = if dx * dx + dy * dy <= radius * radius {
                    BLOB_MM as i32
                } else {
                    floor as i32
                };
                if noise_mm > 0 {
                    let n = noise_mm as i32;
                    mm += self.rng.gen_range(-n..=n);
                }
                raw_depth.extend_from_slice(&(mm.clamp(0, u16::MAX as i32) as u16).to_le_bytes());
            }
        }

        // 墙钟可能回拨, 保证时间戳不递减
        let now = Local::now();
        let timestamp = match self.last_timestamp {
            Some(last) if last > now => last,
            _ => now,
        };
        self.last_timestamp = Some(timestamp);
        self.tick += 1;

        UnifiedFrame::new(raw_color, raw_depth, width, height, timestamp)
    }
}

/// 模拟相机: 采集线程按 fps 产帧, 经 bounded(2) 通道交给主线程
pub struct SyntheticCamera {
    source: ChannelSource,
    order: ChannelOrder,
    stop: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl SyntheticCamera {
    pub fn start(config: SyntheticConfig) -> Result<Self, FetchError> {
        let (tx, rx) = bounded(2);
        let stop = Arc::new(AtomicBool::new(false));
        let order = config.order;

        info!(
            "📷 模拟相机启动: {}x{} @ {}fps, 噪声 ±{}mm",
            config.width, config.height, config.fps, config.noise_mm
        );

        let thread_stop = stop.clone();
        let handle = thread::Builder::new()
            .name("synthetic-capture".into())
            .spawn(move || capture_loop(SceneGenerator::new(config), tx, thread_stop))
            .map_err(|e| FetchError::Device(format!("failed to spawn capture thread: {e}")))?;

        Ok(Self {
            source: ChannelSource::new(rx),
            order,
            stop,
            handle: Some(handle),
        })
    }

    /// 彩色流的通道顺序
    pub fn channel_order(&self) -> ChannelOrder {
        self.order
    }

    pub fn stop(&mut self) {
        self.stop.store(true, Ordering::SeqCst);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
            info!("📷 模拟相机已停止");
        }
    }
}

impl FrameSource for SyntheticCamera {
    fn fetch(&mut self, timeout: Duration) -> Result<UnifiedFrame, FetchError> {
        self.source.fetch(timeout)
    }
}

impl Drop for SyntheticCamera {
    fn drop(&mut self) {
        self.stop();
    }
}

fn capture_loop(mut scene: SceneGenerator, tx: Sender<FrameMessage>, stop: Arc<AtomicBool>) {
    let interval = Duration::from_secs_f64(1.0 / scene.config.fps.max(1) as f64);
    let mut deadline = Instant::now();
    let mut dropped = 0u64;

    while !stop.load(Ordering::Relaxed) {
        let frame = scene.next_frame();
        match tx.try_send(Ok(frame)) {
            Ok(()) => {}
            Err(TrySendError::Full(_)) => {
                // 消费端跟不上, 丢弃最新帧
                dropped += 1;
                debug!("模拟相机队列已满, 累计丢帧 {}", dropped);
            }
            Err(TrySendError::Disconnected(_)) => break,
        }

        deadline += interval;
        let now = Instant::now();
        if deadline > now {
            thread::sleep(deadline - now);
        } else {
            deadline = now;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_config() -> SyntheticConfig {
        SyntheticConfig {
            width: 32,
            height: 24,
            fps: 200,
            ..Default::default()
        }
    }

    #[test]
    fn test_scene_frames_are_valid() {
        let mut scene = SceneGenerator::new(small_config());
        let frame = scene.next_frame();

        assert!(frame.validate().is_ok());
        assert_eq!(frame.frame_index, 0);
        assert_eq!(frame.raw_color.len(), 32 * 24 * 3);
        assert_eq!(frame.raw_depth.len(), 32 * 24 * 2);
    }

    #[test]
    fn test_blob_is_nearer_than_floor() {
        let mut scene = SceneGenerator::new(small_config());
        let (bx, by, _) = scene.blob();
        let frame = scene.next_frame();

        let blob = crate::processing::depth_at(&frame.raw_depth, 32, 24, bx as u32, by as u32);
        assert_eq!(blob, BLOB_MM as f64 / 1000.0);
        // 底行为近端
        let near = crate::processing::depth_at(&frame.raw_depth, 32, 24, 31, 23);
        assert_eq!(near, FLOOR_NEAR_MM as f64 / 1000.0);
    }

    #[test]
    fn test_seeded_noise_is_reproducible() {
        let config = SyntheticConfig {
            noise_mm: 50,
            ..small_config()
        };
        let a = SceneGenerator::new(config.clone()).next_frame();
        let b = SceneGenerator::new(config).next_frame();

        assert_eq!(a.raw_depth, b.raw_depth);
        assert_eq!(a.raw_color, b.raw_color);
    }

    #[test]
    fn test_bgr_color_order() {
        let config = SyntheticConfig {
            order: ChannelOrder::Bgr,
            ..small_config()
        };
        let rgb = SceneGenerator::new(small_config()).next_frame();
        let bgr = SceneGenerator::new(config).next_frame();

        assert_eq!(&rgb.raw_color[3..6], &[bgr.raw_color[5], bgr.raw_color[4], bgr.raw_color[3]]);
    }

    #[test]
    fn test_camera_streams_until_dropped() {
        let mut camera = SyntheticCamera::start(small_config()).unwrap();
        assert_eq!(camera.channel_order(), ChannelOrder::Rgb);

        let mut last = None;
        for _ in 0..5 {
            let frame = camera.fetch(Duration::from_secs(1)).unwrap();
            assert!(frame.validate().is_ok());
            if let Some(prev) = last {
                assert!(frame.timestamp >= prev);
            }
            last = Some(frame.timestamp);
        }

        camera.stop();
        // 停止后通道最终断开
        let mut saw_device_error = false;
        for _ in 0..4 {
            if let Err(FetchError::Device(_)) = camera.fetch(Duration::from_millis(50)) {
                saw_device_error = true;
                break;
            }
        }
        assert!(saw_device_error);
    }
}
