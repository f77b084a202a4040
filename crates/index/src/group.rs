use capture::RequestEvent;
use codec::{Claims, DecodedCredential, GroupIdentity, Header};
use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{MAX_REQUESTS_PER_GROUP, lenient};

/// One intercepted request that carried a recognized credential.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestRecord {
    pub id: String,
    pub url: String,
    pub method: String,
    pub path_summary: String,
    #[serde(default = "Timestamp::now", deserialize_with = "lenient::timestamp_or_now")]
    pub observed_at: Timestamp,
}

impl RequestRecord {
    pub fn new(event: &RequestEvent, observed_at: Timestamp) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            url: event.url.clone(),
            method: event.method.clone(),
            path_summary: event.path_summary(),
            observed_at,
        }
    }
}

/// Everything known about one credential identity.
///
/// `requests` is kept in ascending `observed_at` order and never grows past
/// [`MAX_REQUESTS_PER_GROUP`]. `is_expired` is a cache of
/// [`codec::is_expired`] and is refreshed on every write and sweep.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CredentialGroup {
    pub identity: GroupIdentity,
    pub raw: String,
    #[serde(default)]
    pub header: Header,
    #[serde(default)]
    pub payload: Claims,
    #[serde(default)]
    pub signature: String,
    #[serde(
        default,
        deserialize_with = "lenient::optional_timestamp",
        skip_serializing_if = "Option::is_none"
    )]
    pub expiry_instant: Option<Timestamp>,
    #[serde(default)]
    pub is_expired: bool,
    #[serde(default)]
    pub requests: Vec<RequestRecord>,
    #[serde(default = "Timestamp::now", deserialize_with = "lenient::timestamp_or_now")]
    pub first_seen: Timestamp,
    #[serde(default = "Timestamp::now", deserialize_with = "lenient::timestamp_or_now")]
    pub last_seen: Timestamp,
}

impl CredentialGroup {
    pub(crate) fn new(credential: DecodedCredential, record: RequestRecord, now: Timestamp) -> Self {
        let identity = credential.identity();
        let expiry_instant = credential.expiry_instant();
        let is_expired = credential.is_expired(now);
        let raw = credential.raw().to_owned();

        let DecodedCredential {
            header,
            claims,
            signature,
            ..
        } = credential;

        Self {
            identity,
            raw,
            header,
            payload: claims,
            signature,
            expiry_instant,
            is_expired,
            first_seen: record.observed_at,
            last_seen: record.observed_at,
            requests: vec![record],
        }
    }

    /// Inserts a request in timestamp order, dropping the oldest ones beyond the cap.
    pub(crate) fn push_request(&mut self, record: RequestRecord) {
        self.last_seen = self.last_seen.max(record.observed_at);

        let position = self
            .requests
            .partition_point(|existing| existing.observed_at <= record.observed_at);
        self.requests.insert(position, record);

        if self.requests.len() > MAX_REQUESTS_PER_GROUP {
            let excess = self.requests.len() - MAX_REQUESTS_PER_GROUP;
            self.requests.drain(..excess);
        }
    }

    pub(crate) fn refresh_expiry(&mut self, now: Timestamp) {
        self.expiry_instant = codec::expiry_instant(&self.payload);
        self.is_expired = codec::is_expired(&self.payload, now);
    }

    /// Drops requests observed before `cutoff`, returning how many were removed.
    pub(crate) fn prune_requests(&mut self, cutoff: Timestamp) -> usize {
        let before = self.requests.len();
        self.requests.retain(|request| request.observed_at >= cutoff);
        before - self.requests.len()
    }

    /// Fully cold: nothing recent left and not seen since `cutoff`.
    pub(crate) fn is_idle(&self, cutoff: Timestamp) -> bool {
        self.requests.is_empty() && self.last_seen < cutoff
    }
}
