use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

use crate::config::{LogOutput, TracingConfig};

/// Install the global subscriber. Output goes to stderr so command output
/// on stdout stays clean. With `LogOutput::Off` nothing is installed.
pub fn init_tracing(config: &TracingConfig) {
    if config.output == LogOutput::Off {
        return;
    }

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.default_filter));

    // try_init: tests and repeated calls must not panic on an existing subscriber.
    let result = if config.json_format {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(
                fmt::layer()
                    .json()
                    .with_writer(std::io::stderr)
                    .with_target(true),
            )
            .try_init()
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer().with_writer(std::io::stderr).with_target(true))
            .try_init()
    };

    if result.is_ok() {
        tracing::debug!(
            environment = %config.environment,
            json_format = config.json_format,
            "Tracing initialized"
        );
    }
}
