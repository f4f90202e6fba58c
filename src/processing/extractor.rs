//! 距离提取 (Distance Extractor)
//!
//! 直接读取原始深度字节流,不分配内存。0.0 表示未知。

/// (x, y) 处的深度 (米); 缓冲区为空、坐标越界或数据不足时返回 0.0
pub fn depth_at(raw_depth: &[u8], width: u32, height: u32, x: u32, y: u32) -> f64 {
    if raw_depth.is_empty() || x >= width || y >= height {
        return 0.0;
    }

    let offset = (y as usize * width as usize + x as usize) * 2;
    if offset + 1 >= raw_depth.len() {
        return 0.0;
    }

    let mm = u16::from_le_bytes([raw_depth[offset], raw_depth[offset + 1]]);
    mm as f64 / 1000.0
}

/// 画面中心 (w/2, h/2) 处的深度 (米)
pub fn center_distance(raw_depth: &[u8], width: u32, height: u32) -> f64 {
    depth_at(raw_depth, width, height, width / 2, height / 2)
}
