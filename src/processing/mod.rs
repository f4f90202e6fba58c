/// 帧处理 (Frame Processing)
///
/// 彩色通道重排、深度伪彩色、中心测距。所有输出图像都从调用方的 ImagePool 借出。
pub mod color;
pub mod colorizer;
pub mod extractor;

pub use color::convert_color;
pub use colorizer::{DepthColorizer, DepthPalette, DEFAULT_MAX_DEPTH_MM};
pub use extractor::{center_distance, depth_at};
