use crate::gateway::group_octets;
use std::fmt::Display;

/// The gateway's device identifier exactly as it was sent on the wire.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DeviceId(String);

impl DeviceId {
    pub fn new(wire: impl Into<String>) -> Self {
        DeviceId(wire.into().trim().to_string())
    }

    pub fn as_wire(&self) -> &str {
        &self.0
    }
}

impl Display for DeviceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", group_octets(&self.0, 16))
    }
}
