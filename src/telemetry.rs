//! 日志初始化 - tracing 订阅器 (fmt 层 + 环境变量过滤 + 运行时长时间戳)

use tracing_subscriber::{filter::EnvFilter, fmt, prelude::*};

/// RUST_LOG 未设置时的默认过滤级别
pub fn default_directive(verbose: bool) -> &'static str {
    if verbose {
        "rgbd_hud=debug,info"
    } else {
        "info"
    }
}

/// 安装全局订阅器; 重复调用时保持第一次的设置
pub fn init_logging(verbose: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(verbose)));

    let _ = tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_target(false)
                .with_timer(fmt::time::uptime())
                .with_filter(filter),
        )
        .try_init();
}
