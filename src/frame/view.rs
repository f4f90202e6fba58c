/// 零拷贝图像视图 (Zero-copy image view)
///
/// 视图只借用帧的字节流,生命周期受帧约束;需要修改时必须先复制为 WorkingImage。
use super::{check_buffer, FrameError};

/// 像素布局
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PixelLayout {
    Rgb8,    // 3通道 8bit
    Depth16, // 单通道 16bit 小端
}

impl PixelLayout {
    pub fn bytes_per_pixel(&self) -> usize {
        match self {
            PixelLayout::Rgb8 => 3,
            PixelLayout::Depth16 => 2,
        }
    }

    /// W x H 图像所需字节数, 溢出时返回 None
    pub fn buffer_len(&self, width: u32, height: u32) -> Option<usize> {
        (width as usize)
            .checked_mul(height as usize)?
            .checked_mul(self.bytes_per_pixel())
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ImageView<'a> {
    data: &'a [u8],
    width: u32,
    height: u32,
    layout: PixelLayout,
}

impl<'a> ImageView<'a> {
    /// 在原始字节流上建立视图,长度不符时返回 InvalidBufferSize
    pub fn new(
        data: &'a [u8],
        width: u32,
        height: u32,
        layout: PixelLayout,
    ) -> Result<Self, FrameError> {
        check_buffer(data, width, height, layout)?;
        Ok(Self {
            data,
            width,
            height,
            layout,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn layout(&self) -> PixelLayout {
        self.layout
    }

    pub fn as_bytes(&self) -> &'a [u8] {
        self.data
    }

    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    pub(crate) fn expect_layout(&self, expected: PixelLayout) -> Result<(), FrameError> {
        if self.layout != expected {
            return Err(FrameError::LayoutMismatch {
                expected,
                actual: self.layout,
            });
        }
        Ok(())
    }

    /// 按行优先顺序遍历深度采样 (毫米)
    pub fn depth_samples(&self) -> impl Iterator<Item = u16> + 'a {
        let data: &'a [u8] = match self.layout {
            PixelLayout::Depth16 => self.data,
            PixelLayout::Rgb8 => &[],
        };
        data.chunks_exact(2)
            .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
    }
}
