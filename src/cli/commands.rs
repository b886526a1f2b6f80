use crate::cli::args::OutputFormat;
use crate::domain::error::{MonitorError, MonitorResult};
use crate::infrastructure::serial::PortRegistry;
use serde::Serialize;
use tabled::{Table, Tabled};

#[derive(Tabled, Serialize)]
struct PortRow {
    #[tabled(rename = "Port")]
    port: String,
}

/// `serialmon ports`: enumerate serial devices in the requested format.
pub fn list_ports(format: OutputFormat) -> MonitorResult<()> {
    let ports = PortRegistry::list();
    match format {
        OutputFormat::Text => {
            if ports.is_empty() {
                println!("No serial ports found");
            } else {
                for port in &ports {
                    println!("{}", port);
                }
            }
        }
        OutputFormat::Json => {
            let rows: Vec<PortRow> = ports.into_iter().map(|port| PortRow { port }).collect();
            let output = serde_json::to_string_pretty(&rows)
                .map_err(|e| MonitorError::Output(e.to_string()))?;
            println!("{}", output);
        }
        OutputFormat::Table => {
            let rows: Vec<PortRow> = ports.into_iter().map(|port| PortRow { port }).collect();
            println!("{}", Table::new(rows));
        }
    }
    Ok(())
}
