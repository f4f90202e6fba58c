use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// 主循环取消信号, 每个周期开始前检查一次
pub trait CancelToken {
    fn is_cancelled(&self) -> bool;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NeverCancel;

impl CancelToken for NeverCancel {
    #[inline]
    fn is_cancelled(&self) -> bool {
        false
    }
}

impl<F> CancelToken for F
where
    F: Fn() -> bool,
{
    #[inline]
    fn is_cancelled(&self) -> bool {
        self()
    }
}

/// 可跨线程共享的取消标志 (Ctrl-C、窗口关闭等)
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    /// 安装 Ctrl-C 处理器, 收到中断时置位; 每个进程只能安装一次
    pub fn on_interrupt() -> Result<Self, ctrlc::Error> {
        let flag = Self::new();
        let handle = flag.clone();
        ctrlc::set_handler(move || handle.cancel())?;
        Ok(flag)
    }
}

impl CancelToken for CancelFlag {
    fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_never_cancel() {
        assert!(!NeverCancel.is_cancelled());
    }

    #[test]
    fn test_closure_token() {
        let flag = AtomicBool::new(false);
        let token = || flag.load(Ordering::Relaxed);
        assert!(!token.is_cancelled());
        flag.store(true, Ordering::Relaxed);
        assert!(token.is_cancelled());
    }

    #[test]
    fn test_cancel_flag_is_shared_between_clones() {
        let flag = CancelFlag::new();
        let other = flag.clone();
        assert!(!other.is_cancelled());

        std::thread::spawn(move || flag.cancel()).join().unwrap();
        assert!(other.is_cancelled());
    }

    #[test]
    fn test_interrupt_flag_starts_clear_and_installs_once() {
        let flag = CancelFlag::on_interrupt().unwrap();
        assert!(!flag.is_cancelled());
        assert!(CancelFlag::on_interrupt().is_err());
    }
}
