use std::sync::Once;

/// Logger configuration.
///
/// `env_filter` uses `env_logger` syntax, e.g. `"reworld_engine=debug,wgpu=warn"`.
/// When unset, `RUST_LOG` is consulted, then `default_filter`.
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    pub env_filter: Option<String>,
    pub default_filter: String,
    pub write_style: env_logger::WriteStyle,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            env_filter: None,
            // wgpu is chatty at info.
            default_filter: "info,wgpu_core=warn,wgpu_hal=warn,naga=warn".to_string(),
            write_style: env_logger::WriteStyle::Auto,
        }
    }
}

impl LoggingConfig {
    fn filter(self) -> String {
        self.env_filter
            .or_else(|| std::env::var("RUST_LOG").ok())
            .unwrap_or(self.default_filter)
    }
}

static INIT: Once = Once::new();

/// Installs the global logger. Later calls do nothing.
pub fn init_logging(config: LoggingConfig) {
    INIT.call_once(|| {
        let write_style = config.write_style;
        let filter = config.filter();

        env_logger::Builder::new()
            .parse_filters(&filter)
            .write_style(write_style)
            .format_timestamp_millis()
            .init();

        log::debug!("logging initialized ({filter})");
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_filter_wins() {
        let config = LoggingConfig {
            env_filter: Some("trace".to_string()),
            ..LoggingConfig::default()
        };
        assert_eq!(config.filter(), "trace");
    }

    #[test]
    fn repeated_init_is_harmless() {
        init_logging(LoggingConfig::default());
        init_logging(LoggingConfig::default());
        log::info!("still one logger");
    }
}
