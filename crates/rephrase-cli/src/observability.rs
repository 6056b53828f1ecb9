use once_cell::sync::OnceCell;
use tracing_subscriber::layer::SubscriberExt as _;
use tracing_subscriber::util::SubscriberInitExt as _;

static INIT: OnceCell<()> = OnceCell::new();

fn parse_bool_env(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" | "enabled" => Some(true),
        "0" | "false" | "no" | "off" | "disabled" => Some(false),
        _ => None,
    }
}

fn logging_enabled() -> bool {
    match std::env::var("REPHRASE_LOG_ENABLED") {
        Ok(value) => parse_bool_env(&value).unwrap_or(true),
        Err(_) => true,
    }
}

/// First valid directive among `REPHRASE_LOG_LEVEL`, then `RUST_LOG`, then
/// the verbosity default.
fn select_filter(
    level: Option<String>,
    rust_log: Option<String>,
    verbose: bool,
) -> tracing_subscriber::EnvFilter {
    [level, rust_log]
        .into_iter()
        .flatten()
        .find_map(|directive| tracing_subscriber::EnvFilter::try_new(directive).ok())
        .unwrap_or_else(|| tracing_subscriber::EnvFilter::new(if verbose { "debug" } else { "warn" }))
}

fn resolve_env_filter(verbose: bool) -> tracing_subscriber::EnvFilter {
    select_filter(
        std::env::var("REPHRASE_LOG_LEVEL").ok(),
        std::env::var(tracing_subscriber::EnvFilter::DEFAULT_ENV).ok(),
        verbose,
    )
}

/// Initialize logging once per process.
///
/// Environment variables:
/// - `REPHRASE_LOG_ENABLED`: optional enable/disable flag (default enabled).
/// - `REPHRASE_LOG_LEVEL`: optional level/filter override (`info`, `debug`, etc.).
/// - `REPHRASE_JSON_LOG_PATH`: optional log file path. If set, logs are JSONL in that file.
///   If unset, logs go to stderr in a compact console format (stdout carries results).
/// - `RUST_LOG`: optional filter override.
pub fn init_observability(verbose: bool) {
    INIT.get_or_init(|| {
        if !logging_enabled() {
            return;
        }

        let env_filter = resolve_env_filter(verbose);
        if let Ok(path_raw) = std::env::var("REPHRASE_JSON_LOG_PATH") {
            let path = std::path::PathBuf::from(path_raw);
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                let _ = std::fs::create_dir_all(parent);
            }
            let dir = path
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .unwrap_or_else(|| std::path::Path::new("."));
            let file_name = path
                .file_name()
                .and_then(|n| n.to_str())
                .unwrap_or("rephrase.logs.jsonl");
            let writer = tracing_appender::rolling::never(dir, file_name);
            let json_layer = tracing_subscriber::fmt::layer()
                .json()
                .with_current_span(true)
                .with_span_list(true)
                .with_target(false)
                .with_writer(writer);
            let _ = tracing_subscriber::registry()
                .with(env_filter)
                .with(json_layer)
                .try_init();
        } else {
            let console_layer = tracing_subscriber::fmt::layer()
                .compact()
                .with_target(false)
                .with_writer(std::io::stderr);
            let _ = tracing_subscriber::registry()
                .with(env_filter)
                .with(console_layer)
                .try_init();
        }
    });
}
