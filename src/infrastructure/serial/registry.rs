use tracing::warn;

/// Enumerates available serial devices. Stateless: every call re-queries the
/// platform, so newly plugged devices show up without a restart.
pub struct PortRegistry;

impl PortRegistry {
    /// Device identifiers in enumeration order. Empty when no devices are
    /// present or enumeration fails (failure is logged, not fatal).
    pub fn list() -> Vec<String> {
        match serialport::available_ports() {
            Ok(ports) => ports.into_iter().map(|p| p.port_name).collect(),
            Err(e) => {
                warn!("serial port enumeration failed: {}", e);
                Vec::new()
            }
        }
    }
}
