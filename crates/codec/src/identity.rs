use std::fmt;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Number of hex characters kept from the digest.
pub const IDENTITY_LEN: usize = 16;

/// Stable key used to cluster requests by the credential they carried.
///
/// Derived from the payload and signature segments only. Two credentials that
/// differ just in their header collapse into the same group.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GroupIdentity(String);

impl GroupIdentity {
    pub fn of(credential: &str) -> Self {
        let mut segments = credential.split('.');

        match (segments.next(), segments.next(), segments.next(), segments.next()) {
            (Some(_), Some(payload), Some(signature), None) => {
                let mut hasher = Sha256::new();
                hasher.update(payload.as_bytes());
                hasher.update(b".");
                hasher.update(signature.as_bytes());

                let mut digest = format!("{:x}", hasher.finalize());
                digest.truncate(IDENTITY_LEN);

                Self(digest)
            }
            _ => Self(credential.to_owned()),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for GroupIdentity {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for GroupIdentity {
    fn from(value: &str) -> Self {
        Self(value.to_owned())
    }
}

impl fmt::Display for GroupIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
