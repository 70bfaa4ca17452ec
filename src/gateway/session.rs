use crate::domain::{Command, CommandParams, DeviceId, Epoch, GATEWAY_EPOCH, Response, Value};
use crate::gateway::decoder::{self, ParseError};
use crate::gateway::encoder::{self, EncodeError};
use crate::gateway::transport::{self, ConnectionError};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info, instrument};

const DEVICE_SECTION: &str = "DeviceInfo";
const DEVICE_FIELD: &str = "DeviceMacId";
const DEMAND_SECTION: &str = "InstantaneousDemand";

/// A connection target with a discovered device. Every call opens its own socket.
#[derive(Debug)]
pub struct Session {
    address: String,
    port: u16,
    timeout: Duration,
    epoch: Epoch,
    device_id: DeviceId,
}

#[derive(Debug, PartialEq)]
pub struct DemandReading {
    pub timestamp: Option<Value>,
    pub kilowatts: f64,
}

impl Session {
    /// Discovers the gateway's device and returns a session bound to it.
    #[instrument(skip(address), fields(address = %address.as_ref()))]
    pub async fn open(address: impl AsRef<str>, port: u16, timeout: Duration) -> Result<Self, SessionError> {
        let address = address.as_ref().to_string();
        info!("Discovering device on {}:{}...", address, port);

        let device_id = discover(&address, port, timeout, &GATEWAY_EPOCH).await?;
        info!("Discovering device on {}:{}... OK, found {}", address, port, device_id);

        Ok(Session {
            address,
            port,
            timeout,
            epoch: GATEWAY_EPOCH,
            device_id,
        })
    }

    pub fn device_id(&self) -> &DeviceId {
        &self.device_id
    }

    pub async fn call(&self, command: Command, params: &CommandParams) -> Result<Response, GatewayError> {
        self.call_with(command, params, true).await
    }

    #[instrument(skip(self, params))]
    pub async fn call_with(&self, command: Command, params: &CommandParams, convert: bool) -> Result<Response, GatewayError> {
        let raw = self.call_raw(command, params).await?;
        Ok(decoder::decode(&raw, convert, &self.epoch)?)
    }

    /// Returns the response text without decoding it.
    pub async fn call_raw(&self, command: Command, params: &CommandParams) -> Result<String, GatewayError> {
        exchange(&self.address, self.port, self.timeout, command, Some(&self.device_id), params, &self.epoch).await
    }

    /// Reads the current demand in kilowatts from the device data.
    #[instrument(skip(self))]
    pub async fn instantaneous_demand(&self) -> Result<DemandReading, GatewayError> {
        let response = self.call(Command::GetDeviceData, &CommandParams::default()).await?;
        demand_from(&response)
    }
}

async fn discover(address: &str, port: u16, timeout: Duration, epoch: &Epoch) -> Result<DeviceId, GatewayError> {
    let raw = exchange(address, port, timeout, Command::ListDevices, None, &CommandParams::default(), epoch).await?;
    let response = decoder::decode(&raw, false, epoch)?;

    let device_id = response
        .as_record()
        .and_then(|record| record.section(DEVICE_SECTION))
        .and_then(|section| section.get(DEVICE_FIELD))
        .ok_or_else(|| GatewayError::missing(DEVICE_SECTION, DEVICE_FIELD))?;

    Ok(DeviceId::new(device_id.to_string()))
}

async fn exchange(
    address: &str,
    port: u16,
    timeout: Duration,
    command: Command,
    device_id: Option<&DeviceId>,
    params: &CommandParams,
    epoch: &Epoch,
) -> Result<String, GatewayError> {
    let request = encoder::encode(command, device_id, params, epoch)?;
    debug!(command = %command, "Sending {}", command);
    Ok(transport::send(address, port, request.as_bytes(), timeout).await?)
}

fn demand_from(response: &Response) -> Result<DemandReading, GatewayError> {
    let section = response
        .as_record()
        .and_then(|record| record.section(DEMAND_SECTION))
        .ok_or_else(|| GatewayError::MissingField {
            section: DEMAND_SECTION.to_string(),
            field: None,
        })?;

    let number = |field: &str| -> Result<f64, GatewayError> {
        let value = section.get(field).ok_or_else(|| GatewayError::missing(DEMAND_SECTION, field))?;
        value.as_f64().ok_or_else(|| GatewayError::InvalidField {
            section: DEMAND_SECTION.to_string(),
            field: field.to_string(),
            value: value.to_string(),
        })
    };

    let demand = number("Demand")?;
    let multiplier = number("Multiplier")?;
    let divisor = number("Divisor")?;
    if divisor == 0.0 {
        return Err(GatewayError::InvalidField {
            section: DEMAND_SECTION.to_string(),
            field: "Divisor".to_string(),
            value: "0".to_string(),
        });
    }

    Ok(DemandReading {
        timestamp: section.get("TimeStamp").cloned(),
        kilowatts: demand * multiplier / divisor,
    })
}

#[derive(Error, Debug)]
pub enum GatewayError {
    #[error(transparent)]
    Connection(#[from] ConnectionError),
    #[error("could not decode the gateway response: {0}")]
    Parse(#[from] ParseError),
    #[error("could not encode the request: {0}")]
    Encode(#[from] EncodeError),
    #[error("{}", missing_message(.section, .field))]
    MissingField { section: String, field: Option<String> },
    #[error("field '{field}' in '{section}' is not a usable number: '{value}'")]
    InvalidField { section: String, field: String, value: String },
}

impl GatewayError {
    fn missing(section: &str, field: &str) -> Self {
        GatewayError::MissingField {
            section: section.to_string(),
            field: Some(field.to_string()),
        }
    }
}

fn missing_message(section: &str, field: &Option<String>) -> String {
    match field {
        Some(field) => format!("missing field '{}' in '{}'", field, section),
        None => format!("missing section '{}'", section),
    }
}

/// The device could not be discovered, so no session exists.
#[derive(Error, Debug)]
#[error("device discovery failed: {source}")]
pub struct SessionError {
    #[from]
    pub source: GatewayError,
}
