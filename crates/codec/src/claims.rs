//! Structured views of the credential header and payload.
//!
//! Registered fields are typed when their value has the registered shape.
//! Anything else, including a registered field that is `null` or of another
//! type, stays in `extra` untouched, so a decoded credential never loses
//! information and any JSON object decodes.

use jiff::Timestamp;
use serde::{Deserialize, Deserializer, Serialize, de::DeserializeOwned};
use serde_json::{Map, Value};

/// The JOSE header of a credential.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Header {
    /// Signing algorithm, e.g. `HS256`.
    #[serde(rename = "alg", skip_serializing_if = "Option::is_none")]
    pub algorithm: Option<String>,

    /// Media type of the credential, usually `JWT`.
    #[serde(rename = "typ", skip_serializing_if = "Option::is_none")]
    pub token_type: Option<String>,

    /// Any other header parameters (`kid`, `cty`, ...).
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl<'de> Deserialize<'de> for Header {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let mut extra: Map<String, Value> = Map::deserialize(deserializer)?;

        Ok(Self {
            algorithm: take_registered(&mut extra, "alg"),
            token_type: take_registered(&mut extra, "typ"),
            extra,
        })
    }
}

/// Registered and custom claims carried in the payload.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Claims {
    /// Issuer claim - identifies the principal that issued the credential
    #[serde(rename = "iss", skip_serializing_if = "Option::is_none")]
    pub issuer: Option<String>,

    /// Subject claim - identifies the principal that is the subject of the credential
    #[serde(rename = "sub", skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,

    /// Audience claim - a single recipient or a list of them
    #[serde(rename = "aud", skip_serializing_if = "Option::is_none")]
    pub audience: Option<Audience>,

    #[serde(rename = "exp", skip_serializing_if = "Option::is_none")]
    pub expiration: Option<NumericDate>,

    #[serde(rename = "iat", skip_serializing_if = "Option::is_none")]
    pub issued_at: Option<NumericDate>,

    #[serde(rename = "nbf", skip_serializing_if = "Option::is_none")]
    pub not_before: Option<NumericDate>,

    #[serde(rename = "jti", skip_serializing_if = "Option::is_none")]
    pub token_id: Option<String>,

    /// Custom claims, plus registered ones that did not have the registered shape
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl<'de> Deserialize<'de> for Claims {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let mut extra: Map<String, Value> = Map::deserialize(deserializer)?;

        Ok(Self {
            issuer: take_registered(&mut extra, "iss"),
            subject: take_registered(&mut extra, "sub"),
            audience: take_registered(&mut extra, "aud"),
            expiration: take_registered(&mut extra, "exp"),
            issued_at: take_registered(&mut extra, "iat"),
            not_before: take_registered(&mut extra, "nbf"),
            token_id: take_registered(&mut extra, "jti"),
            extra,
        })
    }
}

/// Moves `name` out of `fields` when it reads as a `T`. Nulls and mistyped
/// values are left where they are.
fn take_registered<T: DeserializeOwned>(fields: &mut Map<String, Value>, name: &str) -> Option<T> {
    let value = fields.get(name).filter(|value| !value.is_null())?;
    let typed = T::deserialize(value).ok()?;

    fields.remove(name);
    Some(typed)
}

/// The `aud` claim keeps the shape it was issued with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Audience {
    Single(String),
    Multiple(Vec<String>),
}

/// Seconds since the Unix epoch, as found in `exp`, `iat` and `nbf`.
///
/// Non-null values that are not numbers are retained as `Malformed`; they
/// simply never resolve to an instant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NumericDate {
    Seconds(i64),
    Fractional(f64),
    Malformed(Value),
}

impl NumericDate {
    pub fn to_timestamp(&self) -> Option<Timestamp> {
        let seconds = match self {
            NumericDate::Seconds(seconds) => *seconds,
            NumericDate::Fractional(seconds) if seconds.is_finite() => seconds.trunc() as i64,
            NumericDate::Fractional(_) | NumericDate::Malformed(_) => return None,
        };

        Timestamp::from_second(seconds).ok()
    }
}
