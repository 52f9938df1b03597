use std::sync::Once;

use log::LevelFilter;

/// Logger configuration.
///
/// Filter precedence: `filter`, then `RUST_LOG`, then `default_level` for
/// everything.
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// `env_logger` filter syntax, e.g. "prism_engine::state=trace,info".
    pub filter: Option<String>,
    pub default_level: LevelFilter,
    pub write_style: env_logger::WriteStyle,
    /// Millisecond timestamps; frame logs are unreadable without them.
    pub timestamps: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: None,
            default_level: LevelFilter::Info,
            write_style: env_logger::WriteStyle::Auto,
            timestamps: true,
        }
    }
}

impl LoggingConfig {
    pub fn with_filter(filter: impl Into<String>) -> Self {
        Self {
            filter: Some(filter.into()),
            ..Self::default()
        }
    }

    /// `0` is info, `1` debug, `2` and above trace.
    pub fn verbosity(level: u8) -> Self {
        let default_level = match level {
            0 => LevelFilter::Info,
            1 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        };
        Self {
            default_level,
            ..Self::default()
        }
    }
}

static INIT: Once = Once::new();

/// Installs the global logger on first call; later calls do nothing.
///
/// Another logger already being installed (e.g. by a test harness) is not
/// an error.
pub fn init_logging(config: LoggingConfig) {
    INIT.call_once(|| {
        let mut builder = env_logger::Builder::new();
        builder.filter_level(config.default_level);

        if let Some(filter) = config.filter.or_else(|| std::env::var("RUST_LOG").ok()) {
            builder.parse_filters(&filter);
        }

        if config.timestamps {
            builder.format_timestamp_millis();
        } else {
            builder.format_timestamp(None);
        }
        builder.write_style(config.write_style);

        if builder.try_init().is_ok() {
            log::debug!("logging initialized at {}", config.default_level);
        }
    });
}
