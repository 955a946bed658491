//! 日志配置模块
//!
//! 提供日志到文件的输出配置。

use clap::ValueEnum;
use std::path::PathBuf;
use tracing_appender::{non_blocking, non_blocking::WorkerGuard, rolling};
use tracing_subscriber::{
    filter::LevelFilter,
    fmt,
    layer::{Layer, SubscriberExt},
    util::SubscriberInitExt,
};

/// 日志文件前缀
const LOG_FILE_PREFIX: &str = "datapilot";

/// 日志级别
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl LogLevel {
    fn to_tracing_level(self) -> tracing::Level {
        match self {
            LogLevel::Trace => tracing::Level::TRACE,
            LogLevel::Debug => tracing::Level::DEBUG,
            LogLevel::Info => tracing::Level::INFO,
            LogLevel::Warn => tracing::Level::WARN,
            LogLevel::Error => tracing::Level::ERROR,
        }
    }
}

/// 日志配置
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// 日志目录
    pub log_dir: PathBuf,
    /// 日志级别
    pub level: LogLevel,
    /// 是否同时输出到控制台
    pub console_output: bool,
    /// 是否使用颜色（仅控制台）
    pub ansi: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            log_dir: PathBuf::from("logs"),
            level: LogLevel::default(),
            console_output: false,
            ansi: false,
        }
    }
}

impl LoggingConfig {
    /// 创建新的日志配置
    pub fn new() -> Self {
        Self::default()
    }

    /// 设置日志目录
    pub fn with_log_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.log_dir = dir.into();
        self
    }

    /// 设置日志级别
    pub fn with_level(mut self, level: LogLevel) -> Self {
        self.level = level;
        self
    }

    /// 设置是否输出到控制台
    pub fn with_console_output(mut self, output: bool) -> Self {
        self.console_output = output;
        self
    }

    /// 设置是否使用 ANSI 颜色
    pub fn with_ansi(mut self, ansi: bool) -> Self {
        self.ansi = ansi;
        self
    }

    /// 初始化日志系统
    ///
    /// 只能调用一次。返回的 guard 必须在程序运行期间保持存活，否则文件日志会停止写入。
    pub fn init(self) -> Result<WorkerGuard, Box<dyn std::error::Error>> {
        std::fs::create_dir_all(&self.log_dir)?;

        // 每天一个日志文件
        let file_appender = rolling::daily(&self.log_dir, LOG_FILE_PREFIX);
        let (non_blocking_file, guard) = non_blocking(file_appender);
        let level = LevelFilter::from(self.level.to_tracing_level());

        let file_layer = fmt::layer()
            .with_writer(non_blocking_file)
            .with_ansi(false)
            .with_level(true)
            .with_target(true)
            .with_thread_ids(false)
            .with_thread_names(false)
            .with_file(false)
            .with_line_number(false)
            .with_filter(level);

        let subscriber = tracing_subscriber::registry().with(file_layer);

        if self.console_output {
            let console_layer = fmt::layer()
                .with_writer(std::io::stderr)
                .with_ansi(self.ansi)
                .with_level(true)
                .with_target(true)
                .with_filter(level);

            subscriber.with(console_layer).try_init()?;
        } else {
            subscriber.try_init()?;
        }

        Ok(guard)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_level_conversion() {
        assert_eq!(LogLevel::Trace.to_tracing_level(), tracing::Level::TRACE);
        assert_eq!(LogLevel::Debug.to_tracing_level(), tracing::Level::DEBUG);
        assert_eq!(LogLevel::Info.to_tracing_level(), tracing::Level::INFO);
        assert_eq!(LogLevel::Warn.to_tracing_level(), tracing::Level::WARN);
        assert_eq!(LogLevel::Error.to_tracing_level(), tracing::Level::ERROR);
    }

    #[test]
    fn test_log_level_from_cli_value() {
        assert_eq!(LogLevel::from_str("debug", true).unwrap(), LogLevel::Debug);
        assert!(LogLevel::from_str("verbose", true).is_err());
    }

    #[test]
    fn test_config_builder() {
        let config = LoggingConfig::new()
            .with_log_dir("/tmp/logs")
            .with_level(LogLevel::Debug)
            .with_console_output(true)
            .with_ansi(true);

        assert_eq!(config.log_dir, PathBuf::from("/tmp/logs"));
        assert_eq!(config.level, LogLevel::Debug);
        assert!(config.console_output);
        assert!(config.ansi);
    }
}
