//! File-based logging setup
//!
//! Multi-file logging where components write to separate log files with
//! daily rotation:
//!
//! | Log File          | Component                        | Target Prefixes                         |
//! |-------------------|----------------------------------|-----------------------------------------|
//! | greenline.log     | Root logger (all components)     | (all)                                   |
//! | auth.log          | Authentication and authorization | greenline_auth, server auth/middleware  |
//! | integrations.log  | Third-party service clients      | greenline_integrations                  |
//! | watcher.log       | Weather watcher                  | greenline_core::service::weather        |
//! | persistence.log   | Database layer                   | greenline_persistence, sea_orm          |
//!
//! Log files are stored in `~/greenline/logs` by default. Override with
//! the `GREENLINE_LOG_DIR` environment variable or `greenline.logs.path`
//! config.

use std::path::PathBuf;

use tracing::Level;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::filter::{LevelFilter, Targets};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, Registry, fmt};

// ---------------------------------------------------------------------------
// Component log file definitions
// ---------------------------------------------------------------------------

/// Internal definition for a component log file.
struct ComponentLogDef {
    /// Log file name (e.g. "auth.log")
    file_name: &'static str,
    /// Target module prefixes routed to this file
    targets: &'static [&'static str],
}

const COMPONENT_LOGS: &[ComponentLogDef] = &[
    ComponentLogDef {
        file_name: "auth.log",
        targets: &[
            "greenline_auth",
            "greenline_server::api::v1::auth",
            "greenline_server::middleware",
        ],
    },
    ComponentLogDef {
        file_name: "integrations.log",
        targets: &["greenline_integrations"],
    },
    ComponentLogDef {
        file_name: "watcher.log",
        targets: &["greenline_core::service::weather"],
    },
    ComponentLogDef {
        file_name: "persistence.log",
        targets: &["greenline_persistence", "sea_orm"],
    },
];

// ---------------------------------------------------------------------------
// Log rotation policy
// ---------------------------------------------------------------------------

/// Log rotation policy
#[derive(Debug, Clone, Copy)]
pub enum LogRotation {
    /// Rotate daily (default)
    Daily,
    /// Rotate hourly
    Hourly,
    /// Never rotate (single file)
    Never,
}

impl From<LogRotation> for Rotation {
    fn from(rotation: LogRotation) -> Self {
        match rotation {
            LogRotation::Daily => Rotation::DAILY,
            LogRotation::Hourly => Rotation::HOURLY,
            LogRotation::Never => Rotation::NEVER,
        }
    }
}

// ---------------------------------------------------------------------------
// Logging configuration
// ---------------------------------------------------------------------------

/// Logging configuration for the entire application.
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Base log directory (default: `~/greenline/logs`)
    pub log_dir: PathBuf,
    /// Enable console output
    pub console_output: bool,
    /// Console log level
    pub console_level: Level,
    /// Enable file logging
    pub file_logging: bool,
    /// Default log level for files
    pub file_level: Level,
    /// Log rotation policy
    pub rotation: LogRotation,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
        Self {
            log_dir: PathBuf::from(format!("{}/greenline/logs", home)),
            console_output: true,
            console_level: Level::INFO,
            file_logging: true,
            file_level: Level::INFO,
            rotation: LogRotation::Daily,
        }
    }
}

impl LoggingConfig {
    /// Create from application configuration.
    pub fn from_config(log_dir: Option<String>, console_output: bool, level: String) -> Self {
        let log_dir = log_dir
            .or_else(|| std::env::var("GREENLINE_LOG_DIR").ok())
            .map(PathBuf::from)
            .unwrap_or_else(|| {
                let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
                PathBuf::from(format!("{}/greenline/logs", home))
            });

        let level = level.parse().unwrap_or(Level::INFO);

        Self {
            log_dir,
            console_output,
            console_level: level,
            file_logging: true,
            file_level: level,
            rotation: LogRotation::Daily,
        }
    }
}

// ---------------------------------------------------------------------------
// Logging guard
// ---------------------------------------------------------------------------

/// Guard that keeps the logging system alive.
///
/// Holds file appender worker guards. Must be kept alive for the
/// duration of the application; when dropped, buffered log output is
/// flushed.
pub struct LoggingGuard {
    _file_guards: Vec<WorkerGuard>,
}

// ---------------------------------------------------------------------------
// Initialization
// ---------------------------------------------------------------------------

/// Initialize the logging system with multi-file output.
///
/// This sets up:
/// - Console output (optional, human-readable format with colors)
/// - Root log file `greenline.log` that captures **all** events
/// - Component-specific log files with target-based routing
///
/// The `RUST_LOG` env var controls the level for console and root file;
/// component log files use per-layer [`Targets`] filters.
pub fn init_logging(config: &LoggingConfig) -> Result<LoggingGuard, Box<dyn std::error::Error>> {
    if config.file_logging {
        std::fs::create_dir_all(&config.log_dir)?;
    }

    let mut guards: Vec<WorkerGuard> = Vec::new();
    let mut layers: Vec<Box<dyn Layer<Registry> + Send + Sync>> = Vec::new();

    // --- Console layer (human-readable with ANSI colors, per-layer EnvFilter) ---
    if config.console_output {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(config.console_level.to_string()));
        let console_layer = fmt::layer()
            .with_target(true)
            .with_thread_names(true)
            .with_file(true)
            .with_line_number(true)
            .with_filter(filter);
        layers.push(Box::new(console_layer));
    }

    // --- File layers ---
    if config.file_logging {
        // Root log file: greenline.log (captures all events)
        let root_appender =
            RollingFileAppender::new(config.rotation.into(), &config.log_dir, "greenline.log");
        let (root_nb, root_guard) = tracing_appender::non_blocking(root_appender);
        guards.push(root_guard);

        let root_filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(config.file_level.to_string()));
        let root_layer = fmt::layer()
            .with_writer(root_nb)
            .with_target(true)
            .with_thread_names(true)
            .with_file(true)
            .with_line_number(true)
            .with_ansi(false)
            .with_filter(root_filter);
        layers.push(Box::new(root_layer));

        // Component-specific log files with per-layer Targets filtering
        for component in COMPONENT_LOGS {
            let appender = RollingFileAppender::new(
                config.rotation.into(),
                &config.log_dir,
                component.file_name,
            );
            let (nb, guard) = tracing_appender::non_blocking(appender);
            guards.push(guard);

            // TRACE here so component files capture everything from their
            // targets; level control stays with RUST_LOG on the root layers.
            let mut targets = Targets::new();
            for target in component.targets {
                targets = targets.with_target(*target, LevelFilter::TRACE);
            }

            let layer = fmt::layer()
                .with_writer(nb)
                .with_target(true)
                .with_thread_names(true)
                .with_file(true)
                .with_line_number(true)
                .with_ansi(false)
                .with_filter(targets);
            layers.push(Box::new(layer));
        }
    }

    Registry::default()
        .with(layers)
        .try_init()
        .map_err(|e| format!("Failed to initialize logging: {}", e))?;

    if config.file_logging {
        tracing::info!(
            log_dir = %config.log_dir.display(),
            component_files = COMPONENT_LOGS.len(),
            "File logging initialized: greenline.log (root) + {} component log files",
            COMPONENT_LOGS.len()
        );
    }

    Ok(LoggingGuard {
        _file_guards: guards,
    })
}
