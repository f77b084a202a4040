//! Decoding of compact, three-segment bearer credentials.
//!
//! Signatures are never verified. The codec only reads what the credential
//! claims about itself: who it is for, and when it stops being valid.

mod claims;
mod error;
mod identity;

use base64::{
    Engine as _, alphabet,
    engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig, general_purpose::URL_SAFE_NO_PAD},
};
use jiff::Timestamp;
use serde::{Serialize, de::DeserializeOwned};
use serde_json::{Map, Value};

pub use claims::{Audience, Claims, Header, NumericDate};
pub use error::{DecodeError, Segment};
pub use identity::{GroupIdentity, IDENTITY_LEN};

/// Segments are translated to the standard alphabet and re-padded before they
/// reach this engine.
const SEGMENT_ENGINE: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new()
        .with_decode_padding_mode(DecodePaddingMode::RequireCanonical)
        .with_decode_allow_trailing_bits(true),
);

/// A credential split into its decoded parts.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedCredential {
    pub header: Header,
    pub claims: Claims,
    pub signature: String,
    raw: String,
}

impl DecodedCredential {
    /// The compact form this credential was decoded from.
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// The original `header`, `payload` and `signature` segments, byte for byte.
    pub fn segments(&self) -> [&str; 3] {
        let mut parts = self.raw.splitn(3, '.');
        let header = parts.next().unwrap_or_default();
        let payload = parts.next().unwrap_or_default();
        let signature = parts.next().unwrap_or_default();

        [header, payload, signature]
    }

    pub fn identity(&self) -> GroupIdentity {
        GroupIdentity::of(&self.raw)
    }

    pub fn expiry_instant(&self) -> Option<Timestamp> {
        expiry_instant(&self.claims)
    }

    pub fn is_expired(&self, now: Timestamp) -> bool {
        is_expired(&self.claims, now)
    }
}

/// Decodes a `header.payload.signature` credential.
pub fn decode(credential: &str) -> Result<DecodedCredential, DecodeError> {
    let [header, payload, signature] = split(credential)?;

    Ok(DecodedCredential {
        header: decode_segment(Segment::Header, header)?,
        claims: decode_segment(Segment::Payload, payload)?,
        signature: signature.to_owned(),
        raw: credential.to_owned(),
    })
}

/// Decodes only the payload segment, skipping the header.
///
/// Used to refresh expiry for a credential whose group already exists.
pub fn decode_claims(credential: &str) -> Result<Claims, DecodeError> {
    let [_, payload, _] = split(credential)?;
    decode_segment(Segment::Payload, payload)
}

/// The instant at which the credential stops being valid, if it says so.
///
/// Missing, non-numeric, or out of range `exp` values all yield `None`.
pub fn expiry_instant(claims: &Claims) -> Option<Timestamp> {
    claims.expiration.as_ref()?.to_timestamp()
}

/// The group a credential belongs to. See [`GroupIdentity::of`].
pub fn group_identity(credential: &str) -> GroupIdentity {
    GroupIdentity::of(credential)
}

/// Credentials without a usable `exp` never expire.
pub fn is_expired(claims: &Claims, now: Timestamp) -> bool {
    expiry_instant(claims).is_some_and(|expiry| expiry < now)
}

/// Encodes a value as an unpadded base64url JSON segment.
pub fn encode_segment<T: Serialize>(value: &T) -> Result<String, serde_json::Error> {
    let json = serde_json::to_vec(value)?;
    Ok(URL_SAFE_NO_PAD.encode(json))
}

fn split(credential: &str) -> Result<[&str; 3], DecodeError> {
    let mut parts = credential.split('.');

    match (parts.next(), parts.next(), parts.next(), parts.next()) {
        (Some(header), Some(payload), Some(signature), None)
            if !header.is_empty() && !payload.is_empty() && !signature.is_empty() =>
        {
            Ok([header, payload, signature])
        }
        _ => Err(DecodeError::MalformedStructure),
    }
}

fn decode_segment<T: DeserializeOwned>(segment: Segment, encoded: &str) -> Result<T, DecodeError> {
    let mut standard: String = encoded
        .chars()
        .map(|c| match c {
            '-' => '+',
            '_' => '/',
            c => c,
        })
        .collect();

    let remainder = standard.len() % 4;
    if remainder != 0 {
        standard.push_str(&"=".repeat(4 - remainder));
    }

    let bytes = SEGMENT_ENGINE
        .decode(standard.as_bytes())
        .map_err(|err| DecodeError::encoding(segment, err))?;

    let object: Map<String, Value> =
        serde_json::from_slice(&bytes).map_err(|err| DecodeError::encoding(segment, err))?;

    serde_json::from_value(Value::Object(object)).map_err(|err| DecodeError::encoding(segment, err))
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    const CREDENTIAL: &str =
        "eyJhbGciOiJIUzI1NiIsInR5cCI6IkpXVCJ9.eyJzdWIiOiJ1MSIsImV4cCI6OTk5OTk5OTk5OX0.sig";

    fn credential(header: Value, payload: Value, signature: &str) -> String {
        format!(
            "{}.{}.{signature}",
            encode_segment(&header).unwrap(),
            encode_segment(&payload).unwrap()
        )
    }

    #[test]
    fn decodes_reference_credential() {
        let decoded = decode(CREDENTIAL).unwrap();

        insta::assert_debug_snapshot!(decoded, @r#"
        DecodedCredential {
            header: Header {
                algorithm: Some(
                    "HS256",
                ),
                token_type: Some(
                    "JWT",
                ),
                extra: {},
            },
            claims: Claims {
                issuer: None,
                subject: Some(
                    "u1",
                ),
                audience: None,
                expiration: Some(
                    Seconds(
                        9999999999,
                    ),
                ),
                issued_at: None,
                not_before: None,
                token_id: None,
                extra: {},
            },
            signature: "sig",
            raw: "eyJhbGciOiJIUzI1NiIsInR5cCI6IkpXVCJ9.eyJzdWIiOiJ1MSIsImV4cCI6OTk5OTk5OTk5OX0.sig",
        }
        "#);
    }

    #[test]
    fn segments_round_trip() {
        let raw = credential(
            json!({ "alg": "RS256", "typ": "JWT", "kid": "key-1" }),
            json!({ "sub": "u1", "aud": ["a", "b"], "custom": { "nested": true } }),
            "c2lnbmF0dXJl",
        );

        let decoded = decode(&raw).unwrap();
        assert_eq!(decoded.segments().join("."), raw);
        assert_eq!(decoded.raw(), raw);

        let [header, payload, signature] = decoded.segments();
        assert_eq!(format!("{header}.{payload}.{signature}"), raw);
        assert_eq!(signature, "c2lnbmF0dXJl");
        assert_eq!(decoded.header.extra.get("kid"), Some(&json!("key-1")));
    }

    #[test]
    fn wrong_segment_count() {
        assert_eq!(decode("only.two"), Err(DecodeError::MalformedStructure));
        assert_eq!(decode("a.b.c.d"), Err(DecodeError::MalformedStructure));
        assert_eq!(decode_claims("no-dots"), Err(DecodeError::MalformedStructure));
    }

    #[test]
    fn empty_segment_is_malformed() {
        let err = decode("eyJhbGciOiJIUzI1NiJ9.eyJzdWIiOiJ1MSJ9.").unwrap_err();
        assert_eq!(err, DecodeError::MalformedStructure);
    }

    #[test]
    fn invalid_base64() {
        let err = decode("!!!.eyJzdWIiOiJ1MSJ9.sig").unwrap_err();
        assert!(matches!(
            err,
            DecodeError::InvalidEncoding {
                segment: Segment::Header,
                ..
            }
        ));
    }

    #[test]
    fn payload_must_be_an_object() {
        let header = encode_segment(&json!({ "alg": "HS256" })).unwrap();
        let payload = encode_segment(&json!([1, 2])).unwrap();

        let err = decode(&format!("{header}.{payload}.sig")).unwrap_err();
        assert!(matches!(
            err,
            DecodeError::InvalidEncoding {
                segment: Segment::Payload,
                ..
            }
        ));
    }

    #[test]
    fn any_json_object_decodes() {
        let raw = credential(
            json!({ "alg": 5 }),
            json!({ "sub": 42, "aud": ["api", 7], "jti": 123, "exp": 9999999999_i64 }),
            "sig",
        );

        let decoded = decode(&raw).unwrap();

        assert_eq!(decoded.header.algorithm, None);
        assert_eq!(decoded.claims.subject, None);
        assert_eq!(decoded.claims.extra.get("sub"), Some(&json!(42)));
        assert_eq!(decoded.expiry_instant().map(|exp| exp.as_second()), Some(9_999_999_999));
    }

    #[test]
    fn padded_and_url_safe_segments() {
        // {"alg":"none"} padded, and a payload whose encoding contains '-' and '_'.
        let payload = encode_segment(&json!({ "sub": "??>>" })).unwrap();
        assert!(payload.contains('_') || payload.contains('-'));

        let decoded = decode(&format!("eyJhbGciOiJub25lIn0=.{payload}.sig")).unwrap();
        assert_eq!(decoded.header.algorithm.as_deref(), Some("none"));
        assert_eq!(decoded.claims.subject.as_deref(), Some("??>>"));
    }

    #[test]
    fn expiry_from_exp_claim() {
        let claims = decode_claims(CREDENTIAL).unwrap();
        let expiry = expiry_instant(&claims).unwrap();

        assert_eq!(expiry.as_second(), 9999999999);
        assert!(!is_expired(&claims, Timestamp::now()));
        assert!(is_expired(&claims, Timestamp::from_second(10_000_000_000).unwrap()));
    }

    #[test]
    fn expiry_boundary_is_strict() {
        let claims: Claims = serde_json::from_value(json!({ "exp": 1_700_000_000 })).unwrap();
        let at_expiry = Timestamp::from_second(1_700_000_000).unwrap();

        assert!(!is_expired(&claims, at_expiry));
    }

    #[test]
    fn missing_or_malformed_exp_never_expires() {
        let far_future = Timestamp::MAX;

        for payload in [json!({}), json!({ "exp": "soon" }), json!({ "exp": null }), json!({ "exp": 1e300 })] {
            let claims: Claims = serde_json::from_value(payload).unwrap();
            assert_eq!(expiry_instant(&claims), None);
            assert!(!is_expired(&claims, far_future));
        }
    }

    #[test]
    fn expiry_is_pure() {
        let claims: Claims = serde_json::from_value(json!({ "exp": 1_700_000_000 })).unwrap();
        let now = Timestamp::from_second(1_800_000_000).unwrap();

        let first = is_expired(&claims, now);
        let second = is_expired(&claims, now);

        assert!(first);
        assert_eq!(first, second);
        assert_eq!(claims.expiration, Some(NumericDate::Seconds(1_700_000_000)));
    }

    #[test]
    fn decoded_identity_matches_raw_identity() {
        let decoded = decode(CREDENTIAL).unwrap();
        assert_eq!(decoded.identity(), group_identity(CREDENTIAL));
    }
}
