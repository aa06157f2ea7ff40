use std::path::Path;

use once_cell::sync::OnceCell;
use tracing_subscriber::{
    fmt, fmt::time::UtcTime, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter,
};

use crate::error::{AppError, AppResult};

static LOGGER_INIT: OnceCell<()> = OnceCell::new();
static LOGGER_GUARD: OnceCell<tracing_appender::non_blocking::WorkerGuard> = OnceCell::new();

/// Checked before `RUST_LOG`.
pub const LOG_ENV_VAR: &str = "PRESET_CREATOR_LOG";
const LOG_FILE_PREFIX: &str = "preset-creator.log";

/// Library, import and export paths log at debug; the rest stays at info.
const DEFAULT_LOG_DIRECTIVES: &str = "info,\
app::library=debug,\
app::import=debug,\
app::export=debug,\
app::validation=debug,\
app::editor=debug,\
app::categories=info,\
app::settings=info,\
app::command=info,\
app::io=info";

fn log_filter() -> AppResult<EnvFilter> {
    EnvFilter::try_from_env(LOG_ENV_VAR)
        .or_else(|_| EnvFilter::try_from_default_env())
        .or_else(|_| EnvFilter::try_new(DEFAULT_LOG_DIRECTIVES))
        .map_err(|err| AppError::other(format!("invalid log directives: {err}")))
}

/// Installs the global subscriber: a daily rolling file under `log_dir` plus
/// stdout. Later calls are no-ops.
pub fn init_logging(log_dir: &Path) -> AppResult<()> {
    LOGGER_INIT
        .get_or_try_init(|| {
            std::fs::create_dir_all(log_dir).map_err(|err| AppError::io(log_dir, err))?;

            let (file_writer, guard) =
                tracing_appender::non_blocking(tracing_appender::rolling::daily(log_dir, LOG_FILE_PREFIX));
            LOGGER_GUARD
                .set(guard)
                .map_err(|_| AppError::other("logger already initialised"))?;

            let file_layer = fmt::layer()
                .with_writer(file_writer)
                .with_ansi(false)
                .with_target(true)
                .with_timer(UtcTime::rfc_3339());
            let console_layer = fmt::layer()
                .with_target(false)
                .with_timer(UtcTime::rfc_3339());

            tracing_subscriber::registry()
                .with(log_filter()?)
                .with(file_layer)
                .with(console_layer)
                .try_init()
                .map_err(|err| AppError::other(format!("failed to install subscriber: {err}")))?;

            Ok(())
        })
        .map(|_| ())
}
