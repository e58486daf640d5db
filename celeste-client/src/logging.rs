use log::LevelFilter;
use simplelog::*;
use std::fs::File;
use std::path::PathBuf;

/// Log targets used by the category macros below
pub const TARGET_API_CALLS: &str = "api_calls";
pub const TARGET_INTERACTIONS: &str = "interactions";
pub const TARGET_GENERAL: &str = "general";

/// Logging configuration for the CelesteTalk client
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Master switch to enable/disable all logging
    pub enabled: bool,
    /// Path to the log file
    pub log_file: PathBuf,
    /// Whether to clear the log file on startup
    pub clear_on_startup: bool,
    /// Feature flags for specific logging categories
    pub features: LogFeatures,
    /// Overall log level
    pub level: LevelFilter,
}

/// Feature flags for specific logging categories
#[derive(Debug, Clone)]
pub struct LogFeatures {
    /// Log REST calls
    pub api_calls: bool,
    /// Log optimistic updates, reconciliation and rollbacks
    pub interactions: bool,
    /// Log general debug messages
    pub general: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            log_file: PathBuf::from("celeste.log"),
            clear_on_startup: true,
            features: LogFeatures::default(),
            level: LevelFilter::Info,
        }
    }
}

impl Default for LogFeatures {
    fn default() -> Self {
        Self {
            api_calls: true,
            interactions: true,
            general: true,
        }
    }
}

impl LogFeatures {
    /// Targets whose category flag is switched off
    pub fn ignored_targets(&self) -> Vec<&'static str> {
        let mut ignored = Vec::new();
        if !self.api_calls {
            ignored.push(TARGET_API_CALLS);
        }
        if !self.interactions {
            ignored.push(TARGET_INTERACTIONS);
        }
        if !self.general {
            ignored.push(TARGET_GENERAL);
        }
        ignored
    }
}

impl LogConfig {
    /// Create a new log configuration with all features disabled
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Default::default()
        }
    }

    /// Create a minimal log configuration (only errors and warnings)
    pub fn minimal() -> Self {
        Self {
            enabled: true,
            level: LevelFilter::Warn,
            features: LogFeatures {
                api_calls: false,
                interactions: false,
                general: false,
            },
            ..Default::default()
        }
    }

    /// Create a verbose log configuration (all features enabled)
    pub fn verbose() -> Self {
        Self {
            enabled: true,
            level: LevelFilter::Trace,
            features: LogFeatures::default(),
            ..Default::default()
        }
    }
}

/// Initialize the logging system with the given configuration
pub fn init_logging(config: &LogConfig) -> anyhow::Result<()> {
    if !config.enabled {
        // Initialize with no-op logger
        let _ = WriteLogger::init(LevelFilter::Off, Config::default(), std::io::sink());
        return Ok(());
    }

    // Clear log file if requested
    if config.clear_on_startup {
        let _ = File::create(&config.log_file)?;
    }

    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&config.log_file)?;

    let mut builder = ConfigBuilder::new();
    builder.set_time_format_rfc3339();
    for target in config.features.ignored_targets() {
        builder.add_filter_ignore_str(target);
    }
    let log_config = builder.build();

    WriteLogger::init(config.level, log_config, log_file)?;

    log::info!(
        "Logging initialized: file={}, level={:?}",
        config.log_file.display(),
        config.level
    );
    log::debug!("Log features: {:?}", config.features);

    Ok(())
}

/// Macro for logging API calls
#[macro_export]
macro_rules! log_api_call {
    ($($arg:tt)*) => {
        log::debug!(target: $crate::logging::TARGET_API_CALLS, $($arg)*)
    };
}

/// Macro for logging optimistic updates and their settlement
#[macro_export]
macro_rules! log_interaction {
    ($($arg:tt)*) => {
        log::debug!(target: $crate::logging::TARGET_INTERACTIONS, $($arg)*)
    };
}

/// Macro for general debug logging
#[macro_export]
macro_rules! log_debug {
    ($($arg:tt)*) => {
        log::debug!(target: $crate::logging::TARGET_GENERAL, $($arg)*)
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_ignores_every_category() {
        let config = LogConfig::minimal();
        assert_eq!(config.level, LevelFilter::Warn);
        assert_eq!(
            config.features.ignored_targets(),
            vec![TARGET_API_CALLS, TARGET_INTERACTIONS, TARGET_GENERAL]
        );
    }

    #[test]
    fn test_default_ignores_nothing() {
        assert!(LogConfig::default().features.ignored_targets().is_empty());
        assert!(!LogConfig::disabled().enabled);
    }
}
