/// HUD 合成 (Heads-Up Display)
///
/// 半透明状态面板 + 中心测距准星, 彩色图与深度图各画一次。
pub mod font;
pub mod glyphs;
pub mod painter;

pub use font::{FontError, HudFont};
pub use painter::{HudLayout, HudPainter, PanelRect};
