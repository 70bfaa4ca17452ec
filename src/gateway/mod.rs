mod converter;
pub mod decoder;
pub mod encoder;
#[cfg(test)]
mod mock_gateway;
mod session;
pub mod transport;

pub use converter::group_octets;
pub use session::{DemandReading, Session};

pub const DEFAULT_PORT: u16 = 5002;
