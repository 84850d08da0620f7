use crate::infrastructure::error::{CliError, Result};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Logging configuration
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Level for the CLI itself
    pub default_level: tracing::Level,
    /// Level for the session crates
    pub session_level: tracing::Level,
    pub json_format: bool,
    pub show_targets: bool,
    pub show_thread_ids: bool,
    /// Whether to write logs to stderr at all
    pub show_logs: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            default_level: tracing::Level::INFO,
            session_level: tracing::Level::DEBUG,
            json_format: false,
            show_targets: true,
            show_thread_ids: false,
            show_logs: true,
        }
    }
}

impl LogConfig {
    /// Verbose, human-readable
    pub fn dev() -> Self {
        Self {
            default_level: tracing::Level::DEBUG,
            session_level: tracing::Level::TRACE,
            show_thread_ids: true,
            ..Default::default()
        }
    }

    /// Warnings only
    pub fn quiet() -> Self {
        Self {
            default_level: tracing::Level::WARN,
            session_level: tracing::Level::WARN,
            show_targets: false,
            ..Default::default()
        }
    }

    pub fn with_json(mut self) -> Self {
        self.json_format = true;
        self
    }

    pub fn without_logs(mut self) -> Self {
        self.show_logs = false;
        self
    }

    /// Filter used when `RUST_LOG` is unset
    pub fn default_filter(&self) -> String {
        let cli = self.default_level.to_string().to_lowercase();
        let session = self.session_level.to_string().to_lowercase();
        format!(
            "robo_session_cli={cli},robo_session_p2p={session},robo_session_core={session},matchbox_socket=info"
        )
    }

    pub fn init(self) -> Result<()> {
        let env_filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(self.default_filter()));

        let registry = tracing_subscriber::registry().with(env_filter);

        let result = if !self.show_logs {
            registry.try_init()
        } else if self.json_format {
            registry
                .with(fmt::layer().json().with_target(self.show_targets))
                .try_init()
        } else {
            registry
                .with(
                    fmt::layer()
                        .with_writer(std::io::stderr)
                        .with_target(self.show_targets)
                        .with_thread_ids(self.show_thread_ids),
                )
                .try_init()
        };

        result.map_err(|e| CliError::Logging(e.to_string()))
    }
}
