//! 日志初始化：输出到 stdout，由托管平台收集

use tracing_subscriber::EnvFilter;

const DEFAULT_FILTER: &str = "info,dxfilter=debug,tower_http=debug";

/// 初始化结构化日志，`RUST_LOG` 优先
pub fn init_logging() {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stdout)
        .with_ansi(false)
        .init();
}
