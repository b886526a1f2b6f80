use clap::{Parser, Subcommand, ValueEnum};

/// Command line arguments for serialmon
#[derive(Parser, Debug)]
#[command(
    name = "serialmon",
    version = env!("CARGO_PKG_VERSION"),
    about = "Serial port terminal with timestamped line logging and command history"
)]
pub struct Args {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Command to execute; defaults to the interactive terminal
    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Interactive terminal (default)
    Tui {
        /// Serial port to pre-select
        #[arg(short, long)]
        port: Option<String>,

        /// Baud rate to pre-select
        #[arg(short, long)]
        baud: Option<u32>,
    },
    /// List available serial ports
    Ports {
        /// Output format
        #[arg(short, long, value_enum, default_value = "text")]
        output: OutputFormat,
    },
}

/// Output format options
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable text output
    Text,
    /// JSON output
    Json,
    /// Table output
    Table,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
            OutputFormat::Table => write!(f, "table"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_args_are_well_formed() {
        Args::command().debug_assert();
    }

    #[test]
    fn test_default_command_is_none() {
        let args = Args::parse_from(["serialmon"]);
        assert!(args.command.is_none());
        assert!(!args.verbose);
    }

    #[test]
    fn test_tui_overrides() {
        let args = Args::parse_from(["serialmon", "tui", "-p", "/dev/ttyACM0", "-b", "115200"]);
        match args.command {
            Some(Command::Tui { port, baud }) => {
                assert_eq!(port.as_deref(), Some("/dev/ttyACM0"));
                assert_eq!(baud, Some(115200));
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }
}
