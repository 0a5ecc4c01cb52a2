//! Tracing subscriber setup.

use crate::config::Config;
use tracing_subscriber::EnvFilter;

/// Installs the global tracing subscriber.
///
/// Honors `RUST_LOG` through [`Config::log_level`] and switches to JSON lines
/// when `LOG_FORMAT=json`. Output goes to stderr so command output on stdout
/// stays machine-readable.
pub fn init(config: &Config) {
    let filter = EnvFilter::try_new(&config.log_level).unwrap_or_else(|_| EnvFilter::new("info"));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    if config.log_format == "json" {
        builder.json().init();
    } else {
        builder.init();
    }
}
