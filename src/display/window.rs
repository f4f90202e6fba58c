//! 双画面窗口 - 左侧彩色流, 右侧深度伪彩色
//!
//! 必须在 macroquad 主线程调用; render 只更新纹理, draw 负责绘制。

use super::{check_dimensions, to_rgba, DisplaySink, SinkError};
use crate::frame::{ChannelOrder, WorkingImage};
use macroquad::prelude::*;

pub struct MacroquadScreen {
    color_texture: Option<Texture2D>,
    depth_texture: Option<Texture2D>,
    rgba: Vec<u8>,
    closed: bool,
}

impl Default for MacroquadScreen {
    fn default() -> Self {
        Self::new()
    }
}

impl MacroquadScreen {
    pub fn new() -> Self {
        Self {
            color_texture: None,
            depth_texture: None,
            rgba: Vec::new(),
            closed: false,
        }
    }

    /// 标记窗口关闭, 之后的 render 返回 Closed
    pub fn close(&mut self) {
        self.closed = true;
    }

    /// 只在分辨率变化时重建纹理, 否则更新像素数据
    fn upload(slot: &mut Option<Texture2D>, image: &WorkingImage, rgba: &mut Vec<u8>) {
        to_rgba(image, rgba);
        let (w, h) = (image.width() as u16, image.height() as u16);

        let needs_rebuild = match slot {
            Some(tex) => tex.width() != w as f32 || tex.height() != h as f32,
            None => true,
        };

        if needs_rebuild {
            let texture = Texture2D::from_rgba8(w, h, rgba);
            texture.set_filter(FilterMode::Linear);
            *slot = Some(texture);
        } else if let Some(tex) = slot {
            let img = Image {
                bytes: rgba.clone(),
                width: w,
                height: h,
            };
            tex.update(&img);
        }
    }

    /// 左右并排绘制, 保持纵横比
    pub fn draw(&self) {
        clear_background(BLACK);

        let half_width = screen_width() / 2.0;
        for (index, slot) in [&self.color_texture, &self.depth_texture].into_iter().enumerate() {
            let Some(texture) = slot else { continue };

            let scale = (half_width / texture.width()).min(screen_height() / texture.height());
            let (w, h) = (texture.width() * scale, texture.height() * scale);
            let x = index as f32 * half_width + (half_width - w) / 2.0;
            let y = (screen_height() - h) / 2.0;

            draw_texture_ex(
                texture,
                x,
                y,
                WHITE,
                DrawTextureParams {
                    dest_size: Some(vec2(w, h)),
                    ..Default::default()
                },
            );
        }
    }
}

impl DisplaySink for MacroquadScreen {
    fn channel_order(&self) -> ChannelOrder {
        ChannelOrder::Rgb
    }

    fn render(&mut self, color: &WorkingImage, depth: &WorkingImage) -> Result<(), SinkError> {
        if self.closed {
            return Err(SinkError::Closed);
        }
        check_dimensions(color, depth)?;
        if color.width() > u16::MAX as u32 || color.height() > u16::MAX as u32 {
            return Err(SinkError::Render(format!(
                "texture too large: {}x{}",
                color.width(),
                color.height()
            )));
        }

        Self::upload(&mut self.color_texture, color, &mut self.rgba);
        Self::upload(&mut self.depth_texture, depth, &mut self.rgba);
        Ok(())
    }
}
