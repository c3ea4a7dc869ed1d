use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
};

use log::{info, warn};
use serde::Serialize;
use tokio::sync::RwLock;

use crate::{
    config::FailurePolicy,
    model::{
        error::PersistenceError,
        record::Record,
        record_action::{Confirmation, RecordAction},
    },
    store::RecordStore,
};

/// Snapshot of the listing screen.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ListingState {
    /// A fetch is in flight; clients show a spinner instead of the rows.
    pub loading: bool,
    pub records: Vec<Record>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MarkDoneOutcome {
    Done,
    AlreadyDone,
    NotTriggered,
    Declined,
    /// The store refused and the failure policy hides it.
    Unchanged,
}

/// Counts one fetch for as long as it lives, including when the caller
/// drops the refresh halfway.
struct Fetching<'a>(&'a AtomicUsize);

impl<'a> Fetching<'a> {
    fn start(fetches: &'a AtomicUsize) -> Self {
        fetches.fetch_add(1, Ordering::SeqCst);
        Fetching(fetches)
    }
}

impl Drop for Fetching<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

/// The listing screen: every record in the store, newest first.
pub struct Listing<S> {
    store: Arc<S>,
    policy: FailurePolicy,
    swipe_threshold: f64,
    fetches: AtomicUsize,
    records: RwLock<Vec<Record>>,
}

impl<S> Listing<S>
where
    S: RecordStore,
{
    pub fn new(store: Arc<S>, policy: FailurePolicy, swipe_threshold: f64) -> Self {
        Listing {
            store,
            policy,
            swipe_threshold,
            fetches: AtomicUsize::new(0),
            records: RwLock::new(Vec::new()),
        }
    }

    fn snapshot(&self, records: &[Record]) -> ListingState {
        ListingState {
            loading: self.fetches.load(Ordering::SeqCst) > 0,
            records: records.to_vec(),
        }
    }

    pub async fn state(&self) -> ListingState {
        self.snapshot(&self.records.read().await)
    }

    /// Re-fetches the rows. A failed fetch keeps the previous rows.
    pub async fn refresh(&self) -> Result<ListingState, PersistenceError> {
        let fetched = {
            let _fetching = Fetching::start(&self.fetches);
            self.store.select_all().await
        };

        let mut records = self.records.write().await;
        match fetched {
            Ok(fetched) => {
                info!("listing refreshed with {} records", fetched.len());
                *records = fetched;
                Ok(self.snapshot(&records))
            }
            Err(e) => {
                warn!("listing refresh failed: {}", e);
                match self.policy {
                    FailurePolicy::Surface => Err(e),
                    FailurePolicy::Silent => Ok(self.snapshot(&records)),
                }
            }
        }
    }

    /// The flag is already written when this runs, so a failed re-fetch only
    /// leaves the cached rows stale.
    async fn refresh_after_update(&self, id: i64) {
        if let Err(e) = self.refresh().await {
            warn!("listing not refreshed after updating record {}: {}", id, e);
        }
    }

    pub async fn mark_done(
        &self,
        id: i64,
        action: RecordAction,
        confirmation: Confirmation,
    ) -> Result<MarkDoneOutcome, PersistenceError> {
        if !action.triggers(self.swipe_threshold) {
            return Ok(MarkDoneOutcome::NotTriggered);
        }

        if confirmation == Confirmation::No {
            info!("mark done of record {} declined", id);
            return Ok(MarkDoneOutcome::Declined);
        }

        let known_done = self
            .records
            .read()
            .await
            .iter()
            .any(|r| r.id == Some(id) && r.done);
        if known_done {
            return Ok(MarkDoneOutcome::AlreadyDone);
        }

        match self.store.mark_done(id).await {
            Ok(true) => {
                info!("record {} marked done via {:?}", id, action);
                self.refresh_after_update(id).await;
                Ok(MarkDoneOutcome::Done)
            }
            Ok(false) => {
                info!("record {} was already done", id);
                self.refresh_after_update(id).await;
                Ok(MarkDoneOutcome::AlreadyDone)
            }
            Err(PersistenceError::NotFound(id)) => Err(PersistenceError::NotFound(id)),
            Err(e) => {
                warn!("marking record {} done failed: {}", id, e);
                match self.policy {
                    FailurePolicy::Surface => Err(e),
                    FailurePolicy::Silent => Ok(MarkDoneOutcome::Unchanged),
                }
            }
        }
    }
}
