//! Ties request events, the token index and the snapshot store together.
//!
//! Every mutation is a single load-modify-save cycle over the whole snapshot.
//! [`Tracker`] runs those cycles one at a time, so a sweep can never clobber
//! a concurrent upsert or the other way around.

mod error;
mod sweeper;

use std::{future::Future, sync::Arc, time::Duration};

use capture::RequestEvent;
use config::Config;
use index::{Index, RequestRecord, Settings, Snapshot, SweepReport, Upsert};
use jiff::Timestamp;
use storage::{SNAPSHOT_KEY, SnapshotStore, StorageError};
use tokio::sync::Mutex;

pub use error::{LoadError, TrackerError};
pub use sweeper::spawn_sweeper;

/// What happened to one intercepted request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Observation {
    /// The request carried no bearer credential.
    NoCredential,
    /// The credential went through the index and the result was persisted.
    Indexed(Upsert),
    /// The snapshot could not be read or written; the event was dropped.
    StorageUnavailable,
}

pub struct Tracker {
    store: Arc<dyn SnapshotStore>,
    defaults: Settings,
    timeout: Duration,
    writer: Mutex<()>,
}

impl Tracker {
    pub fn new(store: Arc<dyn SnapshotStore>, defaults: Settings, timeout: Duration) -> Self {
        Self {
            store,
            defaults,
            timeout,
            writer: Mutex::new(()),
        }
    }

    pub fn from_config(store: Arc<dyn SnapshotStore>, config: &Config) -> Self {
        let defaults = Settings {
            max_token_groups: config.index.max_token_groups,
            retention_hours: config.index.retention_hours,
        };

        Self::new(store, defaults, config.storage.timeout)
    }

    pub async fn observe(&self, event: &RequestEvent) -> Observation {
        self.observe_at(event, Timestamp::now()).await
    }

    pub async fn observe_at(&self, event: &RequestEvent, now: Timestamp) -> Observation {
        let Some(credential) = event.credential() else {
            return Observation::NoCredential;
        };

        let _writer = self.writer.lock().await;

        let snapshot = match self.load().await {
            Ok(snapshot) => snapshot,
            Err(err) => {
                log::warn!("Dropping request to {}: {err}", event.url);
                return Observation::StorageUnavailable;
            }
        };

        let mut index = Index::from_snapshot(snapshot, self.defaults);
        let outcome = index.upsert(credential, RequestRecord::new(event, now), now);

        match &outcome {
            Upsert::Dropped(err) => {
                log::debug!("Ignoring undecodable bearer credential on {} {}: {err}", event.method, event.url);
                return Observation::Indexed(outcome);
            }
            Upsert::Created(identity) => log::debug!("New token group {identity} from {}", event.url),
            Upsert::Updated(identity) => log::trace!("Token group {identity} seen again on {}", event.url),
        }

        if let Err(err) = self.save(index.into_snapshot()).await {
            log::warn!("Failed to persist token groups: {err}");
            return Observation::StorageUnavailable;
        }

        Observation::Indexed(outcome)
    }

    /// Runs one retention sweep.
    ///
    /// Returns `None` when the cycle turned into a no-op because the snapshot
    /// could not be read or written. A snapshot that is unreadable as JSON is
    /// replaced by an empty one.
    pub async fn sweep(&self) -> Option<SweepReport> {
        self.sweep_at(Timestamp::now()).await
    }

    pub async fn sweep_at(&self, now: Timestamp) -> Option<SweepReport> {
        let _writer = self.writer.lock().await;

        let snapshot = match self.load().await {
            Ok(snapshot) => snapshot,
            Err(LoadError::Snapshot(err)) => {
                log::warn!("Stored token groups are unreadable, starting over: {err}");
                Snapshot::default()
            }
            Err(LoadError::Storage(err)) => {
                log::warn!("Skipping retention sweep: {err}");
                return None;
            }
        };

        let mut index = Index::from_snapshot(snapshot, self.defaults);
        let report = index.sweep(now);

        if let Err(err) = self.save(index.into_snapshot()).await {
            log::warn!("Failed to persist swept token groups: {err}");
            return None;
        }

        log::info!(
            "Retention sweep kept {} token groups ({} expired), evicted {}, pruned {} requests",
            report.groups_retained,
            report.groups_expired,
            report.groups_evicted,
            report.requests_pruned,
        );

        Some(report)
    }

    /// The current token groups with expiry flags evaluated against now.
    ///
    /// Read only: nothing is written back.
    pub async fn snapshot(&self) -> Result<Snapshot, TrackerError> {
        self.snapshot_at(Timestamp::now()).await
    }

    pub async fn snapshot_at(&self, now: Timestamp) -> Result<Snapshot, TrackerError> {
        let snapshot = self.load().await.map_err(TrackerError::Load)?;

        let mut index = Index::from_snapshot(snapshot, self.defaults);
        index.refresh_expiry(now);

        Ok(index.into_snapshot())
    }

    /// The raw credential of a group, verbatim.
    pub async fn copy_raw_credential(&self, identity: &str) -> Result<Option<String>, TrackerError> {
        let snapshot = self.load().await.map_err(TrackerError::Load)?;
        Ok(snapshot.raw_credential(identity).map(str::to_owned))
    }

    async fn load(&self) -> Result<Snapshot, LoadError> {
        let stored = self.bounded(self.store.get(SNAPSHOT_KEY)).await??;

        match stored {
            Some(json) => Ok(Snapshot::from_json(&json)?),
            None => Ok(Snapshot::default()),
        }
    }

    async fn save(&self, snapshot: Snapshot) -> Result<(), TrackerError> {
        let json = snapshot.to_json().map_err(TrackerError::Encode)?;

        self.bounded(self.store.set(SNAPSHOT_KEY, json))
            .await
            .and_then(|result| result)
            .map_err(TrackerError::Save)
    }

    async fn bounded<T>(&self, call: impl Future<Output = T>) -> Result<T, StorageError> {
        tokio::time::timeout(self.timeout, call)
            .await
            .map_err(|_| StorageError::Timeout(self.timeout))
    }
}
