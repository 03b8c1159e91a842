//! Logger setup for the application and its GPU stack.
//!
//! The crate logs through the `log` facade and installs `env_logger` as the
//! backend. wgpu and naga are chatty at `info`, so the default filter keeps
//! them at `warn` while this crate logs at `info`.

use std::sync::Once;

/// Filter used when neither the config nor `RUST_LOG` provides one.
pub const DEFAULT_FILTER: &str = "info,wgpu_core=warn,wgpu_hal=warn,naga=warn";

/// Logger configuration.
///
/// `env_filter` uses `env_logger` directive syntax, e.g.
/// `"hello_triangle=debug,wgpu_core=warn"`. When set it wins over `RUST_LOG`.
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    pub env_filter: Option<String>,
    pub write_style: env_logger::WriteStyle,
    /// Prefix each line with the module path that logged it.
    pub show_target: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            env_filter: None,
            write_style: env_logger::WriteStyle::Auto,
            show_target: true,
        }
    }
}

/// Picks the filter directives: explicit config, then `RUST_LOG`, then [`DEFAULT_FILTER`].
///
/// Blank values are skipped.
pub fn resolve_filter(config_filter: Option<&str>, rust_log: Option<&str>) -> String {
    fn non_blank(filter: Option<&str>) -> Option<&str> {
        filter.map(str::trim).filter(|f| !f.is_empty())
    }

    non_blank(config_filter)
        .or(non_blank(rust_log))
        .unwrap_or(DEFAULT_FILTER)
        .to_string()
}

static INIT: Once = Once::new();

/// Installs the global logger. Only the first call has any effect.
pub fn init_logging(config: LoggingConfig) {
    INIT.call_once(|| {
        let rust_log = std::env::var("RUST_LOG").ok();
        let filter = resolve_filter(config.env_filter.as_deref(), rust_log.as_deref());

        let mut builder = env_logger::Builder::new();
        builder
            .parse_filters(&filter)
            .write_style(config.write_style)
            .format_target(config.show_target);

        if builder.try_init().is_err() {
            log::warn!("a global logger was already installed");
        }

        log::debug!("logging initialized with filter '{filter}'");
    });
}
