mod registry;
mod transport;

pub use registry::PortRegistry;
pub use transport::{SerialTransport, SystemPortFactory, TransportFactory};
