use std::fmt;

/// The base64-encoded JSON segments of a credential.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Segment {
    Header,
    Payload,
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Segment::Header => f.write_str("header"),
            Segment::Payload => f.write_str("payload"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DecodeError {
    #[error("Credential must consist of three non-empty dot-separated segments")]
    MalformedStructure,
    #[error("Invalid {segment} segment: {reason}")]
    InvalidEncoding { segment: Segment, reason: String },
}

impl DecodeError {
    pub(crate) fn encoding(segment: Segment, reason: impl ToString) -> Self {
        Self::InvalidEncoding {
            segment,
            reason: reason.to_string(),
        }
    }
}
