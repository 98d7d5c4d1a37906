//! Telemetry setup

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{
    fmt, fmt::writer::BoxMakeWriter, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter,
};

use crate::config::AppSettings;
use crate::error::AppError;

/// Installs the global subscriber.
///
/// When `log_dir` is set, output goes to a daily rolling file through a
/// non-blocking writer; the returned guard must live as long as the process.
pub fn init_telemetry(settings: &AppSettings) -> Result<Option<WorkerGuard>, AppError> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let (writer, guard) = match &settings.log_dir {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, format!("{}.log", settings.name));
            let (non_blocking, guard) = tracing_appender::non_blocking(appender);
            (BoxMakeWriter::new(non_blocking), Some(guard))
        }
        None => (BoxMakeWriter::new(std::io::stdout), None),
    };

    let fmt_layer = fmt::layer().with_writer(writer).with_target(true);
    let registry = tracing_subscriber::registry().with(env_filter);

    let result = if settings.log_format.eq_ignore_ascii_case("pretty") {
        registry.with(fmt_layer.pretty()).try_init()
    } else {
        registry.with(fmt_layer.json()).try_init()
    };
    result.map_err(|e| AppError::TelemetryError(e.to_string()))?;

    tracing::info!(
        format = %settings.log_format,
        log_dir = ?settings.log_dir,
        "Telemetry initialized"
    );
    Ok(guard)
}
