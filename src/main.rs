// serialmon - Serial Port Terminal
use clap::Parser;
use serialmon::cli::args::{Args, Command};
use serialmon::cli::commands;
use serialmon::domain::error::MonitorError;
use serialmon::infrastructure::{config::MonitorConfig, logging::init_logging};
use serialmon::tui::App;
use tracing::warn;

#[tokio::main]
async fn main() -> Result<(), MonitorError> {
    let args = Args::parse();

    // Load preferences before the subscriber so the configured log level
    // can seed the filter; the load error is reported once logging is up.
    let (mut prefs, load_error) = match MonitorConfig::load() {
        Ok(prefs) => (prefs, None),
        Err(e) => (MonitorConfig::default(), Some(e)),
    };

    if let Err(e) = init_logging(args.verbose, &prefs.log_level) {
        eprintln!("Failed to initialize logging: {}", e);
    }
    if let Some(e) = load_error {
        warn!("ignoring unreadable config: {}", e);
    }

    match args.command {
        Some(Command::Ports { output }) => match commands::list_ports(output) {
            Ok(()) => Ok(()),
            Err(e) => {
                eprintln!("Error: {}", e);
                std::process::exit(1);
            }
        },
        Some(Command::Tui { port, baud }) => {
            if let Some(port) = port {
                prefs.default_port = Some(port);
            }
            if let Some(baud) = baud {
                prefs.default_baud = baud;
            }
            run_tui(&prefs).await
        }
        None => run_tui(&prefs).await,
    }
}

async fn run_tui(prefs: &MonitorConfig) -> Result<(), MonitorError> {
    let mut app = App::new(prefs)?;
    app.run().await
}
