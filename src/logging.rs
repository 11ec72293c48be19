//! Log output for rule evaluation and database maintenance.
//!
//! Components log through the [`LogSink`] trait so hosts can capture messages;
//! [`TracingSink`] forwards them to `tracing`, and [`init`] installs the
//! subscriber used by the command-line tool.

use std::fmt;

use tracing_subscriber::EnvFilter;

/// Message severity, from most to least verbose.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Debug,
    Info,
    Warn,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Severity::Debug => "DEBUG",
            Severity::Info => "INFO",
            Severity::Warn => "WARN",
            Severity::Error => "ERROR",
        };
        f.write_str(name)
    }
}

/// Fire-and-forget log destination.
pub trait LogSink {
    fn log(&self, message: &str, severity: Severity);

    /// Logs `message` with an optional context suffix; an empty context logs
    /// the bare message.
    fn log_with_context(&self, message: &str, severity: Severity, context: &str) {
        if context.is_empty() {
            self.log(message, severity);
        } else {
            self.log(&format!("{} [{}]", message, context), severity);
        }
    }
}

/// Forwards messages to the `tracing` macros under the `trap_rules` target.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl LogSink for TracingSink {
    fn log(&self, message: &str, severity: Severity) {
        match severity {
            Severity::Debug => tracing::debug!(target: "trap_rules", "{}", message),
            Severity::Info => tracing::info!(target: "trap_rules", "{}", message),
            Severity::Warn => tracing::warn!(target: "trap_rules", "{}", message),
            Severity::Error => tracing::error!(target: "trap_rules", "{}", message),
        }
    }
}

/// Subscriber settings.
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Default filter directive, overridden by `RUST_LOG`
    pub level: String,
    /// One JSON object per line instead of human-readable output
    pub json: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
            json: false,
        }
    }
}

/// Installs the global fmt subscriber writing to stderr.
///
/// Fails when a global subscriber is already set.
pub fn init(config: &LogConfig) -> Result<(), tracing_subscriber::util::TryInitError> {
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, Layer};

    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.level))
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    let fmt_layer = if config.json {
        fmt::layer()
            .json()
            .with_target(true)
            .with_writer(std::io::stderr)
            .boxed()
    } else {
        fmt::layer()
            .with_target(true)
            .with_writer(std::io::stderr)
            .boxed()
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    #[derive(Default)]
    struct Collect(RefCell<Vec<(String, Severity)>>);

    impl LogSink for Collect {
        fn log(&self, message: &str, severity: Severity) {
            self.0.borrow_mut().push((message.to_string(), severity));
        }
    }

    #[test]
    fn test_context_suffix() {
        let sink = Collect::default();
        sink.log_with_context("Connection failed", Severity::Error, "");
        sink.log_with_context("Connection failed", Severity::Error, "ido");
        assert_eq!(
            *sink.0.borrow(),
            vec![
                ("Connection failed".to_string(), Severity::Error),
                ("Connection failed [ido]".to_string(), Severity::Error),
            ]
        );
    }

    #[test]
    fn test_severity_order() {
        assert!(Severity::Debug < Severity::Info);
        assert!(Severity::Warn < Severity::Error);
        assert_eq!(Severity::Warn.to_string(), "WARN");
    }
}
