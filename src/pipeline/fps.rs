use std::time::Instant;

/// 滚动帧率统计
///
/// 每处理 window 帧重新计算一次: fps = window / 距上次计算的耗时。
/// 启动时为 0, 运行期间不重置。
#[derive(Debug, Clone)]
pub struct FpsTracker {
    window: u64,
    count: u64,
    fps: f64,
    last_mark: Instant,
}

impl FpsTracker {
    pub const DEFAULT_WINDOW: u64 = 10;

    pub fn new(start: Instant) -> Self {
        Self::with_window(Self::DEFAULT_WINDOW, start)
    }

    pub fn with_window(window: u64, start: Instant) -> Self {
        Self {
            window: window.max(1),
            count: 0,
            fps: 0.0,
            last_mark: start,
        }
    }

    /// 记录一帧, 返回累计帧数 (即本帧序号)
    pub fn record(&mut self, now: Instant) -> u64 {
        self.count += 1;
        if self.count % self.window == 0 {
            let elapsed = now.saturating_duration_since(self.last_mark).as_secs_f64();
            if elapsed > 0.0 {
                self.fps = self.window as f64 / elapsed;
            }
            self.last_mark = now;
        }
        self.count
    }

    pub fn fps(&self) -> f64 {
        self.fps
    }

    pub fn count(&self) -> u64 {
        self.count
    }
}
