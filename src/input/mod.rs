/// 帧源 (Frame Source)
///
/// 编排器唯一的阻塞点; 取帧必须在超时内返回。
/// - FrameSource:     取帧接口
/// - ChannelSource:   crossbeam 通道接收端 (采集线程 → 主线程)
/// - SyntheticCamera: 模拟 RGB-D 相机, 独立采集线程
pub mod synthetic;

use crate::frame::UnifiedFrame;
use crossbeam_channel::{Receiver, RecvTimeoutError};
use std::time::Duration;
use thiserror::Error;

pub use synthetic::{SceneGenerator, SyntheticCamera, SyntheticConfig};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    /// 暂时性错误, 跳过本周期
    #[error("no frame within {0:?}")]
    Timeout(Duration),
    /// 设备/驱动故障, 结束主循环
    #[error("frame source failed: {0}")]
    Device(String),
}

/// 采集线程 → 主线程的消息
pub type FrameMessage = Result<UnifiedFrame, FetchError>;

pub trait FrameSource {
    fn fetch(&mut self, timeout: Duration) -> Result<UnifiedFrame, FetchError>;
}

impl<S: FrameSource + ?Sized> FrameSource for Box<S> {
    fn fetch(&mut self, timeout: Duration) -> Result<UnifiedFrame, FetchError> {
        (**self).fetch(timeout)
    }
}

/// 通道接收端适配; 发送端全部断开视为设备错误
pub struct ChannelSource {
    rx: Receiver<FrameMessage>,
}

impl ChannelSource {
    pub fn new(rx: Receiver<FrameMessage>) -> Self {
        Self { rx }
    }
}

impl FrameSource for ChannelSource {
    fn fetch(&mut self, timeout: Duration) -> Result<UnifiedFrame, FetchError> {
        match self.rx.recv_timeout(timeout) {
            Ok(message) => message,
            Err(RecvTimeoutError::Timeout) => Err(FetchError::Timeout(timeout)),
            Err(RecvTimeoutError::Disconnected) => {
                Err(FetchError::Device("capture channel disconnected".into()))
            }
        }
    }
}
