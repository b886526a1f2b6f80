use crate::domain::config::ConnectionConfig;
use std::io::{self, Read, Write};
use tracing::debug;

/// A raw serial byte stream viewed as newline-delimited lines.
///
/// The session core talks to this seam only, which is what makes the state
/// machine testable against in-memory transports.
pub trait SerialTransport: Send {
    /// Read one newline-terminated line.
    ///
    /// Returns `Ok(None)` when the read timed out with no complete line;
    /// partial data is retained for the next call. The returned bytes do not
    /// include the newline.
    fn read_line(&mut self) -> io::Result<Option<Vec<u8>>>;

    /// Write raw bytes to the device.
    fn write_all(&mut self, data: &[u8]) -> io::Result<()>;

    /// Release the underlying handle.
    fn shutdown(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Opens transports for connection attempts. Injected into the session so
/// tests can substitute mock transports.
pub trait TransportFactory: Send + Sync {
    fn open(&self, config: &ConnectionConfig) -> io::Result<Box<dyn SerialTransport>>;
}

/// Accumulates bytes until a newline completes a line.
#[derive(Debug, Default)]
struct LineBuffer {
    pending: Vec<u8>,
}

impl LineBuffer {
    /// Feed one byte; returns the completed line (without the newline) when
    /// `byte` terminates one.
    fn feed(&mut self, byte: u8) -> Option<Vec<u8>> {
        if byte == b'\n' {
            Some(std::mem::take(&mut self.pending))
        } else {
            self.pending.push(byte);
            None
        }
    }
}

/// Transport backed by a real OS serial port via the `serialport` crate.
pub struct SystemPort {
    port: Box<dyn serialport::SerialPort>,
    line: LineBuffer,
}

impl SystemPort {
    fn open(config: &ConnectionConfig) -> io::Result<Self> {
        let port = serialport::new(&config.port, config.baud_rate)
            .timeout(config.read_timeout)
            .open()
            .map_err(|e| io::Error::new(io::ErrorKind::Other, e.to_string()))?;
        debug!("serial port {} opened", config.port);
        Ok(Self {
            port,
            line: LineBuffer::default(),
        })
    }
}

impl SerialTransport for SystemPort {
    fn read_line(&mut self) -> io::Result<Option<Vec<u8>>> {
        let mut byte = [0u8; 1];
        loop {
            match self.port.read(&mut byte) {
                Ok(0) => return Ok(None),
                Ok(_) => {
                    if let Some(line) = self.line.feed(byte[0]) {
                        return Ok(Some(line));
                    }
                }
                Err(e) if e.kind() == io::ErrorKind::TimedOut => return Ok(None),
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            }
        }
    }

    fn write_all(&mut self, data: &[u8]) -> io::Result<()> {
        self.port.write_all(data)
    }

    fn shutdown(&mut self) -> io::Result<()> {
        // Dropping the boxed port releases the fd; flush what we can first.
        self.port.flush()
    }
}

/// Production [`TransportFactory`] opening real serial devices.
pub struct SystemPortFactory;

impl TransportFactory for SystemPortFactory {
    fn open(&self, config: &ConnectionConfig) -> io::Result<Box<dyn SerialTransport>> {
        SystemPort::open(config).map(|port| Box::new(port) as Box<dyn SerialTransport>)
    }
}
