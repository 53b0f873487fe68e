use crate::config::LogSettings;
use crate::errors::ConfigError;
use serde::Deserialize;
use std::str::FromStr;
use std::time::Instant;
use tracing::Level;
use tracing_subscriber::{
    filter::LevelFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt, util::TryInitError,
    EnvFilter,
};

/// 日志格式配置
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// 人类可读格式
    Pretty,
    /// 紧凑格式
    Compact,
}

impl FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pretty" => Ok(LogFormat::Pretty),
            "compact" => Ok(LogFormat::Compact),
            _ => Err(ConfigError::InvalidValue {
                key: "logging.format".to_string(),
                value: s.to_string(),
            }),
        }
    }
}

/// 日志配置
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// 日志级别
    pub level: Level,
    /// 输出格式
    pub format: LogFormat,
    /// 是否显示目标模块
    pub show_target: bool,
    /// 是否启用 ANSI 颜色
    pub ansi: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: Level::INFO,
            format: LogFormat::Compact,
            show_target: true,
            ansi: true,
        }
    }
}

impl LoggingConfig {
    /// 创建开发环境配置
    pub fn development() -> Self {
        Self {
            level: Level::DEBUG,
            format: LogFormat::Pretty,
            show_target: true,
            ansi: true,
        }
    }

    /// 创建测试环境配置
    pub fn testing() -> Self {
        Self {
            level: Level::ERROR,
            format: LogFormat::Compact,
            show_target: false,
            ansi: false,
        }
    }
}

impl From<&LogSettings> for LoggingConfig {
    fn from(settings: &LogSettings) -> Self {
        Self {
            level: settings.level,
            format: settings.format,
            ..Self::default()
        }
    }
}

/// 初始化日志系统
///
/// `RUST_LOG` directives take precedence over the configured level. Fails when a
/// global subscriber is already installed.
pub fn init_logging(config: LoggingConfig) -> Result<(), TryInitError> {
    let filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::from_level(config.level).into())
        .from_env_lossy();

    match config.format {
        LogFormat::Pretty => {
            let fmt_layer = fmt::layer()
                .pretty()
                .with_target(config.show_target)
                .with_ansi(config.ansi);

            tracing_subscriber::registry()
                .with(filter)
                .with(fmt_layer)
                .try_init()?;
        }
        LogFormat::Compact => {
            let fmt_layer = fmt::layer()
                .compact()
                .with_target(config.show_target)
                .with_ansi(config.ansi);

            tracing_subscriber::registry()
                .with(filter)
                .with(fmt_layer)
                .try_init()?;
        }
    }

    tracing::info!(
        level = ?config.level,
        format = ?config.format,
        "Logging system initialized"
    );

    Ok(())
}

/// 操作性能计时器
pub struct OperationTimer {
    start: Instant,
    operation: String,
    finished: bool,
}

impl OperationTimer {
    /// 创建新的计时器
    pub fn new(operation: &str) -> Self {
        Self {
            start: Instant::now(),
            operation: operation.to_string(),
            finished: false,
        }
    }

    /// 完成计时并记录日志
    pub fn finish(mut self) -> std::time::Duration {
        self.finished = true;
        let duration = self.start.elapsed();

        tracing::debug!(
            operation = %self.operation,
            duration_us = duration.as_micros() as u64,
            "Operation completed"
        );
        duration
    }

    /// 获取当前经过时间
    pub fn elapsed(&self) -> std::time::Duration {
        self.start.elapsed()
    }
}

impl Drop for OperationTimer {
    fn drop(&mut self) {
        if self.finished {
            return;
        }

        tracing::debug!(
            operation = %self.operation,
            duration_us = self.start.elapsed().as_micros() as u64,
            "Operation aborted"
        );
    }
}
