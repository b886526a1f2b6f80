// Logging module - Logging infrastructure
use std::io;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initialize the tracing subscriber.
///
/// Writes to stderr so log lines never collide with the TUI on stdout.
/// The base level comes from the config file's `log_level`; `--verbose`
/// lowers it to debug, and `RUST_LOG` overrides everything.
pub fn init_logging(verbose: bool, log_level: &str) -> Result<(), Box<dyn std::error::Error>> {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter(verbose, log_level)));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(io::stderr)
                .with_target(true)
                .with_level(true),
        )
        .init();

    Ok(())
}

fn default_filter(verbose: bool, log_level: &str) -> String {
    if verbose {
        "serialmon=debug,info".to_string()
    } else {
        format!("serialmon={},warn", log_level)
    }
}
