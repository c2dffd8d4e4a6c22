//! # 日志初始化模块
//!
//! 基于 `tracing-subscriber` 的 fmt 订阅者，支持文本和 JSON 两种输出。

use tracing_subscriber::{EnvFilter, fmt};

use crate::config::{LogFormat, LoggingConfig};

/// 从配置初始化日志系统
///
/// 优先使用环境变量 `RUST_LOG`，否则使用配置中的日志级别。
/// 只能在进程启动时调用一次。
///
/// # 示例
/// ```rust,ignore
/// use omnipos_store_service::config::{LogFormat, LoggingConfig};
///
/// init_tracing_from_config(Some(&LoggingConfig::default()), LogFormat::Text);
/// ```
pub fn init_tracing_from_config(logging_config: Option<&LoggingConfig>, format: LogFormat) {
    let default_config = LoggingConfig::default();
    let config = logging_config.unwrap_or(&default_config);

    let env_filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::new(config.level.as_str()),
    };

    let builder = fmt::Subscriber::builder()
        .with_target(config.with_target)
        .with_thread_ids(config.with_thread_ids)
        .with_file(config.with_file)
        .with_line_number(config.with_line_number)
        .with_env_filter(env_filter);

    match format {
        LogFormat::Json => builder.json().init(),
        LogFormat::Text => builder.init(),
    }
}
