use crate::core::snapshot::Snapshot;
use crate::domain::ports::RecordSource;
use crate::utils::error::Result;
use std::sync::{Arc, RwLock};
use std::time::{Duration, Instant};
use tokio::task::JoinHandle;

/// Holds the current snapshot and replaces it wholesale on reload.
///
/// Readers clone the `Arc` under a short read lock and keep using their copy
/// even if a reload lands mid-request.
pub struct SnapshotStore {
    source: Arc<dyn RecordSource>,
    current: RwLock<Arc<Snapshot>>,
}

impl SnapshotStore {
    /// Performs the initial load. A failure here is fatal to startup.
    pub async fn load(source: Arc<dyn RecordSource>) -> Result<Self> {
        let snapshot = build_snapshot(source.as_ref()).await?;
        Ok(Self {
            source,
            current: RwLock::new(Arc::new(snapshot)),
        })
    }

    /// Wraps an already-built snapshot, e.g. for tests.
    pub fn with_snapshot(source: Arc<dyn RecordSource>, snapshot: Snapshot) -> Self {
        Self {
            source,
            current: RwLock::new(Arc::new(snapshot)),
        }
    }

    pub fn current(&self) -> Arc<Snapshot> {
        let guard = self.current.read().unwrap_or_else(|e| e.into_inner());
        Arc::clone(&*guard)
    }

    /// Re-reads the source and swaps the result in. On failure the previous
    /// snapshot stays in place and the error is returned.
    pub async fn reload(&self) -> Result<Arc<Snapshot>> {
        match build_snapshot(self.source.as_ref()).await {
            Ok(snapshot) => {
                let snapshot = Arc::new(snapshot);
                self.replace(Arc::clone(&snapshot));
                Ok(snapshot)
            }
            Err(e) => {
                tracing::error!(
                    "❌ Reload of {} failed, keeping previous snapshot: {}",
                    self.source.describe(),
                    e
                );
                Err(e)
            }
        }
    }

    pub fn replace(&self, snapshot: Arc<Snapshot>) {
        let mut guard = self.current.write().unwrap_or_else(|e| e.into_inner());
        *guard = snapshot;
    }

    /// Reloads on a fixed cadence until the returned handle is aborted.
    pub fn spawn_periodic_reload(self: Arc<Self>, every: Duration) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(every);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            // The first tick completes immediately; the initial load already happened.
            ticker.tick().await;
            loop {
                ticker.tick().await;
                let _ = self.reload().await;
            }
        })
    }
}

async fn build_snapshot(source: &dyn RecordSource) -> Result<Snapshot> {
    let started = Instant::now();
    let name = source.describe();
    let records = source.load().await?;
    let snapshot = Snapshot::new(records, name);

    if snapshot.is_empty() {
        tracing::warn!("⚠️ {} contains no customer rows", snapshot.source());
    }
    if snapshot.duplicate_phones() > 0 {
        tracing::warn!(
            "⚠️ {} rows share a phone number with an earlier row; the first row wins",
            snapshot.duplicate_phones()
        );
    }
    tracing::info!(
        "📦 Loaded {} rows ({} phone numbers indexed) from {} in {:?}",
        snapshot.len(),
        snapshot.indexed_phones(),
        snapshot.source(),
        started.elapsed()
    );

    Ok(snapshot)
}
