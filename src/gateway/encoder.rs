use crate::domain::{Command, CommandParams, DeviceId, Epoch, Param, ParamValue};
use crate::extensions::hex_ext::HexText;
use chrono::{DateTime, Utc};
use quick_xml::escape::escape;
use std::fmt::Write;
use thiserror::Error;

const ROOT: &str = "LocalCommand";
const INDENT: &str = "    ";

/// Builds the request document for `command`.
///
/// Parameters the command does not accept are left out. The device element is only
/// written once the device is known.
pub fn encode(command: Command, device_id: Option<&DeviceId>, params: &CommandParams, epoch: &Epoch) -> Result<String, EncodeError> {
    let mut xml = String::new();
    writeln!(xml, "<{}>", ROOT)?;
    write_element(&mut xml, "Name", command.wire_name())?;

    for (param, value) in params.accepted_by(command) {
        let text = match value {
            ParamValue::Instant(instant) => encode_instant(param, &instant, epoch)?,
            ParamValue::Integer(n) => n.to_hex_text(),
        };
        write_element(&mut xml, param.element_name(), &text)?;
    }

    if let Some(device_id) = device_id {
        write_element(&mut xml, "MacId", device_id.as_wire())?;
    }

    writeln!(xml, "</{}>", ROOT)?;
    Ok(xml)
}

fn encode_instant(param: Param, instant: &DateTime<Utc>, epoch: &Epoch) -> Result<String, EncodeError> {
    epoch
        .seconds_until(instant)
        .map(HexText::to_hex_text)
        .ok_or_else(|| EncodeError::BeforeEpoch {
            param: param.element_name(),
            instant: *instant,
        })
}

fn write_element(xml: &mut String, name: &str, text: &str) -> std::fmt::Result {
    writeln!(xml, "{}<{}>{}</{}>", INDENT, name, escape(text), name)
}

#[derive(Error, Debug)]
pub enum EncodeError {
    #[error("{param} {instant} lies before the gateway epoch")]
    BeforeEpoch { param: &'static str, instant: DateTime<Utc> },
    #[error("could not write request: {0}")]
    Format(#[from] std::fmt::Error),
}
