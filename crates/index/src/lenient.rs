//! Forgiving readers for instants stored in a snapshot.
//!
//! Instants may have been written as RFC 3339 strings or as epoch
//! milliseconds. Anything else is not an error: expiry becomes absent and
//! observation times become "now".

use jiff::Timestamp;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

pub(crate) fn timestamp_or_now<'de, D>(deserializer: D) -> Result<Timestamp, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(parse_instant(&value).unwrap_or_else(Timestamp::now))
}

pub(crate) fn optional_timestamp<'de, D>(deserializer: D) -> Result<Option<Timestamp>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(parse_instant(&value))
}

fn parse_instant(value: &Value) -> Option<Timestamp> {
    match value {
        Value::String(text) => text.parse().ok(),
        Value::Number(number) => {
            let millis = match number.as_i64() {
                Some(millis) => millis,
                None => number.as_f64().filter(|millis| millis.is_finite())?.trunc() as i64,
            };

            Timestamp::from_millisecond(millis).ok()
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn rfc3339_strings() {
        let parsed = parse_instant(&json!("2024-03-01T12:30:00.000Z")).unwrap();
        assert_eq!(parsed.as_second(), 1_709_296_200);
    }

    #[test]
    fn epoch_millis() {
        let parsed = parse_instant(&json!(1_709_296_200_000_i64)).unwrap();
        assert_eq!(parsed.as_second(), 1_709_296_200);

        let fractional = parse_instant(&json!(1_709_296_200_000.7)).unwrap();
        assert_eq!(fractional.as_millisecond(), 1_709_296_200_000);
    }

    #[test]
    fn garbage_is_absent() {
        assert_eq!(parse_instant(&json!("yesterday")), None);
        assert_eq!(parse_instant(&json!(null)), None);
        assert_eq!(parse_instant(&json!({ "at": 1 })), None);
        assert_eq!(parse_instant(&json!(u64::MAX)), None);
    }
}
