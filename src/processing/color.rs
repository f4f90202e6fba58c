use crate::frame::{ChannelOrder, FrameError, ImagePool, ImageView, PixelLayout, WorkingImage};

/// 彩色通道重排 (RGB ↔ BGR)
///
/// 输出为新的工作图像,尺寸与视图相同;视图本身不会被修改。
/// 源顺序与目标顺序相同时退化为逐字节复制。
pub fn convert_color(
    view: &ImageView<'_>,
    source_order: ChannelOrder,
    target_order: ChannelOrder,
    pool: &ImagePool,
) -> Result<WorkingImage, FrameError> {
    view.expect_layout(PixelLayout::Rgb8)?;

    let mut out = pool.acquire(view.width(), view.height(), target_order)?;
    let src = view.as_bytes();

    if source_order == target_order {
        out.as_raw_mut().copy_from_slice(src);
        return Ok(out);
    }

    let map = source_order.permutation_to(target_order);
    for (dst, px) in out.as_raw_mut().chunks_exact_mut(3).zip(src.chunks_exact(3)) {
        dst[0] = px[map[0]];
        dst[1] = px[map[1]];
        dst[2] = px[map[2]];
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rgb_to_bgr_swaps_channels() {
        let data = vec![10u8, 20, 30, 40, 50, 60];
        let view = ImageView::new(&data, 2, 1, PixelLayout::Rgb8).unwrap();
        let pool = ImagePool::new();

        let out = convert_color(&view, ChannelOrder::Rgb, ChannelOrder::Bgr, &pool).unwrap();

        assert_eq!(out.as_raw(), &[30, 20, 10, 60, 50, 40]);
        assert_eq!(out.order(), ChannelOrder::Bgr);
        assert_eq!(out.rgb_at(0, 0), Some([10, 20, 30]));
        // 源数据不变
        assert_eq!(data, vec![10, 20, 30, 40, 50, 60]);
    }

    #[test]
    fn test_same_order_is_identity_copy() {
        let data: Vec<u8> = (0..4 * 3 * 3).map(|i| i as u8).collect();
        let view = ImageView::new(&data, 4, 3, PixelLayout::Rgb8).unwrap();
        let pool = ImagePool::new();

        let out = convert_color(&view, ChannelOrder::Bgr, ChannelOrder::Bgr, &pool).unwrap();

        assert_eq!(out.as_raw(), data.as_slice());
        assert_eq!((out.width(), out.height()), (4, 3));
    }

    #[test]
    fn test_depth_view_is_rejected() {
        let data = vec![0u8; 8];
        let view = ImageView::new(&data, 2, 2, PixelLayout::Depth16).unwrap();
        let pool = ImagePool::new();

        let err = convert_color(&view, ChannelOrder::Rgb, ChannelOrder::Bgr, &pool).unwrap_err();

        assert_eq!(
            err,
            FrameError::LayoutMismatch {
                expected: PixelLayout::Rgb8,
                actual: PixelLayout::Depth16,
            }
        );
        assert_eq!(pool.stats().outstanding, 0);
    }
}
