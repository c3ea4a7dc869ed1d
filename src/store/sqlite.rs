use std::{
    path::Path,
    sync::{Mutex, MutexGuard},
};

use log::{info, warn};
use rusqlite::{params, Connection, OptionalExtension, Row};

use crate::model::{
    amount::Amount,
    cpf::Cpf,
    error::PersistenceError,
    record::{parse_timestamp, Record},
};

use super::RecordStore;

/// Local records table, used when no hosted store is configured.
pub struct SqliteStore {
    connection: Mutex<Connection>,
}

impl SqliteStore {
    pub fn in_memory() -> Result<SqliteStore, PersistenceError> {
        Self::init(Connection::open_in_memory()?)
    }

    pub fn open<P: AsRef<Path>>(path: P) -> Result<SqliteStore, PersistenceError> {
        info!("opening sqlite store at {}", path.as_ref().display());
        Self::init(Connection::open(path)?)
    }

    fn init(connection: Connection) -> Result<SqliteStore, PersistenceError> {
        connection.execute(
            "CREATE TABLE IF NOT EXISTS records (
                id INTEGER PRIMARY KEY,
                name TEXT,
                cpf TEXT NOT NULL,
                observation TEXT NOT NULL,
                value TEXT NOT NULL,
                data TEXT NOT NULL,
                check_done INTEGER NOT NULL DEFAULT 0
            )",
            (),
        )?;

        Ok(SqliteStore {
            connection: Mutex::new(connection),
        })
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>, PersistenceError> {
        self.connection
            .lock()
            .map_err(|_| PersistenceError::Database(String::from("connection lock poisoned")))
    }

    fn insert_record(&self, record: Record) -> Result<Record, PersistenceError> {
        let conn = self.lock()?;

        conn.execute(
            "INSERT INTO records (name, cpf, observation, value, data, check_done) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                record.name,
                record.cpf.as_str(),
                record.observation,
                record.value.serialize_for_db(),
                record.formatted_timestamp(),
                record.done,
            ],
        )?;

        Ok(record.with_id(conn.last_insert_rowid()))
    }

    fn select_all_records(&self) -> Result<Vec<Record>, PersistenceError> {
        let conn = self.lock()?;

        let mut stmt = conn.prepare(
            "SELECT id, name, cpf, observation, value, data, check_done FROM records ORDER BY data DESC, id DESC",
        )?;

        let mut records = Vec::new();
        let mut rows = stmt.query(())?;
        while let Some(row) = rows.next()? {
            match Self::record_from_row(row) {
                Ok(record) => records.push(record),
                Err(PersistenceError::Decode(reason)) => warn!("skipping row: {}", reason),
                Err(e) => return Err(e),
            }
        }

        Ok(records)
    }

    fn record_from_row(row: &Row<'_>) -> Result<Record, PersistenceError> {
        let id = row.get::<usize, i64>(0)?;
        let corrupt = |column: &str| {
            PersistenceError::Decode(format!("record {} has an unreadable {}", id, column))
        };

        let cpf = Cpf::parse(&row.get::<usize, String>(2)?).ok_or_else(|| corrupt("cpf"))?;
        let value =
            Amount::deserialize_from_db(&row.get::<usize, String>(4)?).map_err(|_| corrupt("value"))?;
        let timestamp =
            parse_timestamp(&row.get::<usize, String>(5)?).ok_or_else(|| corrupt("data"))?;

        Ok(Record {
            id: Some(id),
            name: row.get::<usize, Option<String>>(1)?,
            cpf,
            observation: row.get::<usize, String>(3)?,
            value,
            timestamp,
            done: row.get::<usize, i64>(6)? == 1,
        })
    }

    fn mark_record_done(&self, id: i64) -> Result<bool, PersistenceError> {
        let conn = self.lock()?;

        let updated = conn.execute(
            "UPDATE records SET check_done = 1 WHERE id = ?1 AND check_done = 0",
            params![id],
        )?;
        if updated > 0 {
            return Ok(true);
        }

        conn.query_row("SELECT id FROM records WHERE id = ?1", params![id], |_| Ok(()))
            .optional()?
            .map(|()| false)
            .ok_or(PersistenceError::NotFound(id))
    }
}

impl RecordStore for SqliteStore {
    async fn insert(&self, record: Record) -> Result<Record, PersistenceError> {
        self.insert_record(record)
    }

    async fn select_all(&self) -> Result<Vec<Record>, PersistenceError> {
        self.select_all_records()
    }

    async fn mark_done(&self, id: i64) -> Result<bool, PersistenceError> {
        self.mark_record_done(id)
    }
}
