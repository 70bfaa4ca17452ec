use chrono::{DateTime, Utc};
use serde::{Serialize, Serializer};
use std::fmt::Display;

/// A single converted field value as read from the gateway.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    Text(String),
    Integer(u64),
    Timestamp(DateTime<Utc>),
    /// Colon-separated hex octets, e.g. `00:15:8d:00:00:00:00:01`.
    Identifier(String),
}

impl Value {
    /// Returns the numeric value of an integer, or of text holding a decimal number.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Integer(n) => Some(*n as f64),
            Value::Text(s) => s.trim().parse::<f64>().ok().filter(|n| n.is_finite()),
            Value::Timestamp(_) | Value::Identifier(_) => None,
        }
    }
}

impl Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Text(s) => write!(f, "{}", s),
            Value::Integer(n) => write!(f, "{}", n),
            Value::Timestamp(ts) => write!(f, "{}", ts.format("%Y-%m-%d %H:%M:%S UTC")),
            Value::Identifier(id) => write!(f, "{}", id),
        }
    }
}

impl Serialize for Value {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Value::Text(s) | Value::Identifier(s) => serializer.serialize_str(s),
            Value::Integer(n) => serializer.serialize_u64(*n),
            Value::Timestamp(ts) => serializer.serialize_str(&ts.to_rfc3339()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[rstest]
    #[case(Value::Integer(42), Some(42.0))]
    #[case(Value::Text("10".to_string()), Some(10.0))]
    #[case(Value::Text(" 2.5 ".to_string()), Some(2.5))]
    #[case(Value::Text("plain".to_string()), None)]
    #[case(Value::Text("NaN".to_string()), None)]
    #[case(Value::Identifier("00:01".to_string()), None)]
    fn as_f64_reads_numbers(#[case] value: Value, #[case] expected: Option<f64>) {
        assert_eq!(value.as_f64(), expected);
    }

    #[test]
    fn displays_a_timestamp_in_utc() {
        let value = Value::Timestamp(Utc.with_ymd_and_hms(2014, 3, 1, 12, 30, 5).unwrap());

        assert_eq!(value.to_string(), "2014-03-01 12:30:05 UTC");
    }

    #[test]
    fn serializes_integers_as_numbers_and_timestamps_as_rfc3339() {
        let values = vec![
            Value::Integer(7),
            Value::Timestamp(Utc.with_ymd_and_hms(2000, 1, 2, 0, 0, 0).unwrap()),
            Value::Identifier("d8:d5".to_string()),
        ];

        let json = serde_json::to_string(&values).unwrap();

        assert_eq!(json, r#"[7,"2000-01-02T00:00:00+00:00","d8:d5"]"#);
    }
}
