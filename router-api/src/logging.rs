use anyhow::Result;
use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use vllm_router_core::LoggingSettings;

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
}

/// 初始化日志
///
/// 日志级别由 `RUST_LOG` 控制，默认 `info`。配置了日志文件时同时追加写入该文件，
/// 返回的guard需要保持到进程退出，否则缓冲中的日志会丢失。
pub fn init_logging(settings: &LoggingSettings) -> Result<Option<WorkerGuard>> {
    let stdout_layer = fmt::layer().with_file(true).with_line_number(true);

    let Some(file) = &settings.file else {
        tracing_subscriber::registry()
            .with(env_filter())
            .with(stdout_layer)
            .try_init()?;
        return Ok(None);
    };

    let path = Path::new(file);
    let directory = path
        .parent()
        .filter(|dir| !dir.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let file_name = path
        .file_name()
        .ok_or_else(|| anyhow::anyhow!("Invalid log file path: '{}'", file))?;

    let (writer, guard) = tracing_appender::non_blocking(tracing_appender::rolling::never(
        directory, file_name,
    ));

    tracing_subscriber::registry()
        .with(env_filter())
        .with(stdout_layer)
        .with(fmt::layer().with_ansi(false).with_writer(writer))
        .try_init()?;

    Ok(Some(guard))
}
