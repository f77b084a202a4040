//! The bounded, newest-first collection of credential groups.
//!
//! An [`Index`] is built from a [`Snapshot`], mutated by [`Index::upsert`] and
//! [`Index::sweep`], and turned back into a snapshot for persistence. It does
//! no I/O of its own.

mod group;
mod lenient;
mod retention;
mod snapshot;

use codec::{DecodeError, GroupIdentity};
use jiff::{SignedDuration, Timestamp};

pub use group::{CredentialGroup, RequestRecord};
pub use retention::SweepReport;
pub use snapshot::{Snapshot, SnapshotError};

pub const DEFAULT_MAX_TOKEN_GROUPS: usize = 100;
pub const DEFAULT_RETENTION_HOURS: f64 = 24.0;
pub const MAX_REQUESTS_PER_GROUP: usize = 50;

/// The two recognized knobs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Settings {
    /// Maximum number of credential groups kept.
    pub max_token_groups: usize,
    /// How long individual requests are kept, and how long a group may stay idle.
    pub retention_hours: f64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            max_token_groups: DEFAULT_MAX_TOKEN_GROUPS,
            retention_hours: DEFAULT_RETENTION_HOURS,
        }
    }
}

impl Settings {
    pub fn retention(&self) -> SignedDuration {
        SignedDuration::try_from_secs_f64(self.retention_hours * 3600.0).unwrap_or(SignedDuration::MAX)
    }

    /// Values stored in a snapshot win over these.
    pub fn overridden_by(self, snapshot: &Snapshot) -> Self {
        Self {
            max_token_groups: snapshot.max_token_groups.unwrap_or(self.max_token_groups),
            retention_hours: snapshot.retention_hours.unwrap_or(self.retention_hours),
        }
    }
}

/// Outcome of feeding one credential sighting into the index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Upsert {
    Created(GroupIdentity),
    Updated(GroupIdentity),
    /// The credential could not be decoded; nothing changed.
    Dropped(DecodeError),
}

impl Upsert {
    pub fn changed(&self) -> bool {
        !matches!(self, Upsert::Dropped(_))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Index {
    snapshot: Snapshot,
    settings: Settings,
}

impl Index {
    pub fn new(settings: Settings) -> Self {
        Self::from_snapshot(Snapshot::default(), settings)
    }

    pub fn from_snapshot(snapshot: Snapshot, defaults: Settings) -> Self {
        let settings = defaults.overridden_by(&snapshot);
        let mut index = Self { snapshot, settings };
        index.enforce_group_cap();
        index
    }

    pub fn into_snapshot(self) -> Snapshot {
        self.snapshot
    }

    pub fn snapshot(&self) -> &Snapshot {
        &self.snapshot
    }

    pub fn settings(&self) -> Settings {
        self.settings
    }

    /// Groups in insertion-recency order, newest first.
    pub fn groups(&self) -> &[CredentialGroup] {
        &self.snapshot.token_groups
    }

    pub fn len(&self) -> usize {
        self.snapshot.token_groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshot.token_groups.is_empty()
    }

    pub fn get(&self, identity: &GroupIdentity) -> Option<&CredentialGroup> {
        self.snapshot.token_groups.iter().find(|group| &group.identity == identity)
    }

    /// Records that `credential` was sent with the request in `record`.
    ///
    /// An existing group gets the request appended and its expiry refreshed
    /// from a fresh decode of the payload alone, but keeps its position. Only
    /// a new group needs the whole credential to decode. It goes to the front,
    /// and the oldest inserted groups beyond the cap are dropped regardless of
    /// their expiry or activity.
    pub fn upsert(&mut self, credential: &str, record: RequestRecord, now: Timestamp) -> Upsert {
        let identity = GroupIdentity::of(credential);

        if let Some(group) = self
            .snapshot
            .token_groups
            .iter_mut()
            .find(|group| group.identity == identity)
        {
            match codec::decode_claims(credential) {
                Ok(claims) => group.payload = claims,
                Err(err) => return Upsert::Dropped(err),
            }

            group.push_request(record);
            group.refresh_expiry(now);

            return Upsert::Updated(identity);
        }

        let decoded = match codec::decode(credential) {
            Ok(decoded) => decoded,
            Err(err) => return Upsert::Dropped(err),
        };

        self.snapshot
            .token_groups
            .insert(0, CredentialGroup::new(decoded, record, now));
        self.enforce_group_cap();

        Upsert::Created(identity)
    }

    /// Re-derives every cached `is_expired` flag without touching requests.
    pub fn refresh_expiry(&mut self, now: Timestamp) {
        for group in &mut self.snapshot.token_groups {
            group.refresh_expiry(now);
        }
    }

    fn enforce_group_cap(&mut self) {
        self.snapshot.token_groups.truncate(self.settings.max_token_groups);
    }
}
