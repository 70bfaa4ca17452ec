use crate::domain::{Epoch, Value};
use crate::extensions::hex_ext::HexText;

const IDENTIFIER_MARKERS: [&str; 3] = ["MacId", "Code", "Key"];
const SHORT_IDENTIFIERS: [&str; 2] = ["MeterMacId", "CoordMacId"];

const IDENTIFIER_HEX_LEN: usize = 15;
// The gateway reports these two one octet short of the other identifiers.
const SHORT_IDENTIFIER_HEX_LEN: usize = 13;

/// Converts a raw field value as sent by the gateway into a typed [`Value`].
///
/// Returns `None` when there is no text to convert.
pub fn convert(field: &str, raw: Option<&str>, epoch: &Epoch) -> Option<Value> {
    let text = raw.map(str::trim).filter(|t| !t.is_empty())?;

    if IDENTIFIER_MARKERS.iter().any(|marker| field.contains(marker)) {
        let len = if SHORT_IDENTIFIERS.contains(&field) {
            SHORT_IDENTIFIER_HEX_LEN
        } else {
            IDENTIFIER_HEX_LEN
        };
        return Some(Value::Identifier(group_octets(text, len)));
    }

    if field.eq_ignore_ascii_case("timestamp") || field.eq_ignore_ascii_case("endtime") {
        match u64::from_hex_text(text) {
            // Zero means "not set" and stays as the raw text.
            Some(0) => return Some(Value::Text(text.to_string())),
            Some(seconds) => {
                if let Some(instant) = epoch.plus_seconds(seconds) {
                    return Some(Value::Timestamp(instant));
                }
            }
            None => {}
        }
    }

    if text.starts_with("0x") {
        if let Some(n) = u64::from_hex_text(text) {
            return Some(Value::Integer(n));
        }
    }

    Some(Value::Text(text.to_string()))
}

/// Leaves the text untouched, only dropping empty values.
pub fn passthrough(raw: Option<&str>) -> Option<Value> {
    raw.map(str::trim).filter(|t| !t.is_empty()).map(|t| Value::Text(t.to_string()))
}

/// Splits the first `len` hex digits of `text` (after an optional `0x`) into
/// colon-separated pairs. The last pair may run one digit past `len`.
pub fn group_octets(text: &str, len: usize) -> String {
    let digits: Vec<char> = text.trim().strip_prefix("0x").unwrap_or(text.trim()).chars().collect();

    (0..len)
        .step_by(2)
        .take_while(|i| *i < digits.len())
        .map(|i| digits[i..(i + 2).min(digits.len())].iter().collect::<String>())
        .collect::<Vec<_>>()
        .join(":")
}
