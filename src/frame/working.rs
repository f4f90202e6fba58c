/// 工作图像与缓冲池 (Working image & buffer pool)
///
/// 每个周期产生的图像都从 ImagePool 借出缓冲区, Drop 时自动归还,
/// 成功、畸形输入、渲染失败等所有退出路径都只释放一次。
use super::{FrameError, PixelLayout};
use image::ImageBuffer;
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

pub type PixelBuffer = ImageBuffer<image::Rgb<u8>, Vec<u8>>;

/// 3通道图像的字节顺序
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChannelOrder {
    #[default]
    Rgb,
    Bgr,
}

impl ChannelOrder {
    /// RGB 颜色 → 本顺序下的像素
    pub fn pixel(&self, rgb: [u8; 3]) -> image::Rgb<u8> {
        match self {
            Self::Rgb => image::Rgb(rgb),
            Self::Bgr => image::Rgb([rgb[2], rgb[1], rgb[0]]),
        }
    }

    /// 本顺序下的像素 → RGB 颜色
    pub fn to_rgb(&self, pixel: [u8; 3]) -> [u8; 3] {
        match self {
            Self::Rgb => pixel,
            Self::Bgr => [pixel[2], pixel[1], pixel[0]],
        }
    }

    /// 从 self 转到 target 的字节置换: out[i] = in[map[i]]
    pub fn permutation_to(&self, target: ChannelOrder) -> [usize; 3] {
        if *self == target {
            [0, 1, 2]
        } else {
            [2, 1, 0]
        }
    }
}

/// 缓冲池统计
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PoolStats {
    pub allocations: u64, // 新分配次数
    pub reuses: u64,      // 复用次数
    pub outstanding: usize,
    pub idle: usize,
}

struct PoolState {
    idle: Vec<Vec<u8>>,
    max_idle: usize,
    stats: PoolStats,
}

/// 单线程缓冲池, 由编排器持有
#[derive(Clone)]
pub struct ImagePool {
    state: Rc<RefCell<PoolState>>,
}

impl ImagePool {
    /// 彩色图 + 深度图 + HUD 暂存图, 再留一个余量
    pub const DEFAULT_MAX_IDLE: usize = 4;

    pub fn new() -> Self {
        Self::with_max_idle(Self::DEFAULT_MAX_IDLE)
    }

    pub fn with_max_idle(max_idle: usize) -> Self {
        Self {
            state: Rc::new(RefCell::new(PoolState {
                idle: Vec::with_capacity(max_idle),
                max_idle,
                stats: PoolStats::default(),
            })),
        }
    }

    pub fn stats(&self) -> PoolStats {
        let state = self.state.borrow();
        PoolStats {
            idle: state.idle.len(),
            ..state.stats
        }
    }

    /// 借出一张全零图像, 尺寸溢出时返回 TooLarge
    pub fn acquire(
        &self,
        width: u32,
        height: u32,
        order: ChannelOrder,
    ) -> Result<WorkingImage, FrameError> {
        let len = PixelLayout::Rgb8
            .buffer_len(width, height)
            .ok_or(FrameError::TooLarge { width, height })?;
        let mut buffer = self.take_buffer(len);
        buffer.resize(len, 0);
        Ok(WorkingImage::from_parts(
            width,
            height,
            order,
            buffer,
            Some(self.clone()),
        ))
    }

    /// 借出一张内容与 source 相同的图像
    pub fn acquire_copy(&self, source: &WorkingImage) -> WorkingImage {
        let raw = source.as_raw();
        let mut buffer = self.take_buffer(raw.len());
        buffer.extend_from_slice(raw);
        WorkingImage::from_parts(
            source.width(),
            source.height(),
            source.order(),
            buffer,
            Some(self.clone()),
        )
    }

    fn take_buffer(&self, len: usize) -> Vec<u8> {
        let mut state = self.state.borrow_mut();
        state.stats.outstanding += 1;

        let reusable = state.idle.iter().position(|buf| buf.capacity() >= len);
        match reusable {
            Some(index) => {
                state.stats.reuses += 1;
                let mut buffer = state.idle.swap_remove(index);
                buffer.clear();
                buffer
            }
            None => {
                state.stats.allocations += 1;
                Vec::with_capacity(len)
            }
        }
    }

    fn release(&self, buffer: Vec<u8>) {
        let mut state = self.state.borrow_mut();
        state.stats.outstanding = state.stats.outstanding.saturating_sub(1);
        if state.idle.len() < state.max_idle {
            state.idle.push(buffer);
        }
        // 池满时缓冲区直接随 buffer 一起释放
    }
}

impl Default for ImagePool {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ImagePool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImagePool")
            .field("stats", &self.stats())
            .finish()
    }
}

/// 单周期内可写的 3 通道 8bit 图像
pub struct WorkingImage {
    pixels: PixelBuffer,
    order: ChannelOrder,
    pool: Option<ImagePool>,
}

impl WorkingImage {
    /// 不属于任何缓冲池的全零图像
    pub fn new(width: u32, height: u32, order: ChannelOrder) -> Self {
        Self {
            pixels: ImageBuffer::new(width, height),
            order,
            pool: None,
        }
    }

    /// 以 RGB 颜色填充的图像
    pub fn filled(width: u32, height: u32, order: ChannelOrder, rgb: [u8; 3]) -> Self {
        Self {
            pixels: ImageBuffer::from_pixel(width, height, order.pixel(rgb)),
            order,
            pool: None,
        }
    }

    fn from_parts(
        width: u32,
        height: u32,
        order: ChannelOrder,
        buffer: Vec<u8>,
        pool: Option<ImagePool>,
    ) -> Self {
        let pixels = match ImageBuffer::from_raw(width, height, buffer) {
            Some(pixels) => pixels,
            None => ImageBuffer::new(width, height),
        };
        Self {
            pixels,
            order,
            pool,
        }
    }

    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    pub fn order(&self) -> ChannelOrder {
        self.order
    }

    pub fn is_empty(&self) -> bool {
        self.width() == 0 || self.height() == 0
    }

    pub fn is_pooled(&self) -> bool {
        self.pool.is_some()
    }

    pub fn pixels(&self) -> &PixelBuffer {
        &self.pixels
    }

    pub fn pixels_mut(&mut self) -> &mut PixelBuffer {
        &mut self.pixels
    }

    pub fn as_raw(&self) -> &[u8] {
        self.pixels.as_raw()
    }

    pub(crate) fn as_raw_mut(&mut self) -> &mut [u8] {
        &mut self.pixels
    }

    /// 读取 (x, y) 处的 RGB 颜色 (与存储顺序无关)
    pub fn rgb_at(&self, x: u32, y: u32) -> Option<[u8; 3]> {
        if x >= self.width() || y >= self.height() {
            return None;
        }
        Some(self.order.to_rgb(self.pixels.get_pixel(x, y).0))
    }

    /// 复制一份; 池化图像的副本仍从同一个池借出
    pub fn duplicate(&self) -> WorkingImage {
        match &self.pool {
            Some(pool) => pool.acquire_copy(self),
            None => Self {
                pixels: self.pixels.clone(),
                order: self.order,
                pool: None,
            },
        }
    }
}

impl Drop for WorkingImage {
    fn drop(&mut self) {
        if let Some(pool) = self.pool.take() {
            let pixels = std::mem::replace(&mut self.pixels, ImageBuffer::new(0, 0));
            pool.release(pixels.into_raw());
        }
    }
}

impl fmt::Debug for WorkingImage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WorkingImage")
            .field("width", &self.width())
            .field("height", &self.height())
            .field("order", &self.order)
            .field("pooled", &self.is_pooled())
            .finish()
    }
}
