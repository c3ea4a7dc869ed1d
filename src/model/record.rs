use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use super::{amount::Amount, cpf::Cpf};

/// A submitted note.
///
/// Serializes with the column names of the records table, so the same shape
/// travels to the hosted store and back to clients.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Record {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub name: Option<String>,
    pub cpf: Cpf,
    pub observation: String,
    pub value: Amount,
    #[serde(rename = "data", with = "sortable_timestamp")]
    pub timestamp: DateTime<Utc>,
    #[serde(rename = "check_done", default, with = "done_flag")]
    pub done: bool,
}

impl Record {
    pub fn new(
        name: Option<String>,
        cpf: Cpf,
        observation: String,
        value: Amount,
        timestamp: DateTime<Utc>,
    ) -> Record {
        // stored with millisecond precision
        let timestamp = Utc
            .timestamp_millis_opt(timestamp.timestamp_millis())
            .single()
            .unwrap_or(timestamp);

        Record {
            id: None,
            name,
            cpf,
            observation,
            value,
            timestamp,
            done: false,
        }
    }

    pub fn with_id(self, id: i64) -> Record {
        Record {
            id: Some(id),
            ..self
        }
    }

    /// Sortable creation time, e.g. `2024-08-17T14:03:09.120Z`.
    pub fn formatted_timestamp(&self) -> String {
        sortable_timestamp::format(&self.timestamp)
    }
}

/// Timestamps are written as RFC 3339 in UTC with millisecond precision. Rows
/// from a `timestamp without time zone` column carry no offset and are read as
/// UTC.
mod sortable_timestamp {
    use chrono::{DateTime, NaiveDateTime, SecondsFormat, TimeZone, Utc};
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn format(timestamp: &DateTime<Utc>) -> String {
        timestamp.to_rfc3339_opts(SecondsFormat::Millis, true)
    }

    pub fn serialize<S>(timestamp: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&format(timestamp))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        parse(&raw).ok_or_else(|| de::Error::custom(format!("invalid timestamp '{raw}'")))
    }

    pub fn parse(raw: &str) -> Option<DateTime<Utc>> {
        if let Ok(timestamp) = DateTime::parse_from_rfc3339(raw) {
            return Some(timestamp.with_timezone(&Utc));
        }

        NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
            .ok()
            .map(|naive| Utc.from_utc_datetime(&naive))
    }
}

pub(crate) use sortable_timestamp::parse as parse_timestamp;

/// `check_done` is stored as `0`/`1`; booleans are accepted when reading.
mod done_flag {
    use serde::{de, Deserialize, Deserializer, Serializer};
    use serde_json::Value;

    pub fn serialize<S>(done: &bool, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u8(u8::from(*done))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<bool, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Value::deserialize(deserializer)? {
            Value::Null => Ok(false),
            Value::Bool(b) => Ok(b),
            Value::Number(n) if n.as_i64() == Some(0) => Ok(false),
            Value::Number(n) if n.as_i64() == Some(1) => Ok(true),
            other => Err(de::Error::custom(format!(
                "check_done must be 0 or 1, got {other}"
            ))),
        }
    }
}
