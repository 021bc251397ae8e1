// Logger setup for the painter binary and for hosts that want the crate's log lines.
// The filter comes from the caller, then RUST_LOG, then `info`. A host that
// already installed its own logger keeps it.

use std::sync::Once;

use env_logger::{Builder, WriteStyle};
use log::LevelFilter;

#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// `env_logger` directives, e.g. "debug" or "mask_painter::loader=trace".
    pub env_filter: Option<String>,
    pub write_style: WriteStyle,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { env_filter: None, write_style: WriteStyle::Auto }
    }
}

impl LoggingConfig {
    /// Config for a `--log` style flag; `None` defers to RUST_LOG.
    pub fn with_filter(filter: Option<String>) -> Self {
        Self { env_filter: filter, ..Self::default() }
    }

    fn builder(&self) -> Builder {
        let mut builder = Builder::new();
        match self.env_filter.clone().or_else(|| std::env::var("RUST_LOG").ok()) {
            Some(filter) => {
                builder.parse_filters(&filter);
            }
            None => {
                builder.filter_level(LevelFilter::Info);
            }
        }
        builder.write_style(self.write_style);
        builder
    }
}

static INIT: Once = Once::new();

/// Install the global logger. Only the first call does anything; it returns
/// false if some other logger was already in place.
pub fn init_logging(config: LoggingConfig) -> bool {
    let mut installed = false;
    INIT.call_once(|| {
        installed = config.builder().try_init().is_ok();
        if installed {
            log::debug!("mask-painter logging on ({:?})", config.env_filter);
        }
    });
    installed
}
