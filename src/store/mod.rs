use std::future::Future;

use hyper_rustls::HttpsConnector;
use hyper::client::HttpConnector;

use crate::model::{error::PersistenceError, record::Record};

pub mod remote;
pub mod sqlite;

pub use remote::RemoteStore;
pub use sqlite::SqliteStore;

/// Where submitted records live.
pub trait RecordStore: Send + Sync + 'static {
    /// Persists a new record and returns it with the id the store assigned.
    fn insert(
        &self,
        record: Record,
    ) -> impl Future<Output = Result<Record, PersistenceError>> + Send;

    /// Every record, newest first.
    fn select_all(&self) -> impl Future<Output = Result<Vec<Record>, PersistenceError>> + Send;

    /// Sets `check_done` on one record. `false` when it was already set.
    fn mark_done(&self, id: i64) -> impl Future<Output = Result<bool, PersistenceError>> + Send;
}

/// The store chosen by configuration at startup.
pub enum AnyStore {
    Sqlite(SqliteStore),
    Remote(RemoteStore<HttpsConnector<HttpConnector>>),
}

impl RecordStore for AnyStore {
    async fn insert(&self, record: Record) -> Result<Record, PersistenceError> {
        match self {
            AnyStore::Sqlite(store) => store.insert(record).await,
            AnyStore::Remote(store) => store.insert(record).await,
        }
    }

    async fn select_all(&self) -> Result<Vec<Record>, PersistenceError> {
        match self {
            AnyStore::Sqlite(store) => store.select_all().await,
            AnyStore::Remote(store) => store.select_all().await,
        }
    }

    async fn mark_done(&self, id: i64) -> Result<bool, PersistenceError> {
        match self {
            AnyStore::Sqlite(store) => store.mark_done(id).await,
            AnyStore::Remote(store) => store.mark_done(id).await,
        }
    }
}
