use anyhow::Result;
use tracing_appender::{non_blocking::WorkerGuard, rolling};
use tracing_subscriber::{
    fmt::{self, time::UtcTime},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter,
};

use crate::config::LoggingConfig;

const DEFAULT_FILTER: &str = "ledger_api=debug,tower_http=debug";

/// 初始化日志系统
///
/// - 同时输出到控制台和文件
/// - 文件按天滚动，只保留最近 `max_files` 个
/// - `json = true` 时文件输出为 JSON 行
///
/// 返回的 guard 必须在 main 中一直持有，否则后台写线程会提前退出
pub fn init_logger(config: &LoggingConfig) -> Result<WorkerGuard> {
    std::fs::create_dir_all(&config.dir)?;

    let file_appender = rolling::RollingFileAppender::builder()
        .rotation(rolling::Rotation::DAILY)
        .filename_prefix(&config.file_prefix)
        .filename_suffix("log")
        .max_log_files(config.max_files.max(1))
        .build(&config.dir)?;
    let (file_writer, guard) = tracing_appender::non_blocking(file_appender);

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let console_layer = fmt::layer()
        .with_timer(UtcTime::rfc_3339())
        .with_target(true);

    let registry = tracing_subscriber::registry()
        .with(env_filter)
        .with(console_layer);

    if config.json {
        registry
            .with(
                fmt::layer()
                    .json()
                    .with_writer(file_writer)
                    .with_timer(UtcTime::rfc_3339())
                    .with_ansi(false)
                    .with_current_span(false),
            )
            .try_init()?;
    } else {
        registry
            .with(
                fmt::layer()
                    .with_writer(file_writer)
                    .with_timer(UtcTime::rfc_3339())
                    .with_ansi(false) // 文件中不使用颜色代码
                    .with_thread_ids(true),
            )
            .try_init()?;
    }

    Ok(guard)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_logging_config() {
        let config = LoggingConfig::default();
        assert_eq!(config.dir, "logs");
        assert_eq!(config.file_prefix, "ledger_api");
        assert_eq!(config.max_files, 7);
        assert!(!config.json);
    }

    #[test]
    fn test_default_filter_parses() {
        assert!(DEFAULT_FILTER.parse::<EnvFilter>().is_ok());
    }
}
