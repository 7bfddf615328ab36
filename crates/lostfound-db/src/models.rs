//! Database row types and the conversions between SQLite text columns and
//! domain values.

use chrono::{DateTime, NaiveDateTime, SecondsFormat, SubsecRound, Utc};
use lostfound_types::models::{Message, MessageId};
use rusqlite::Row;
use uuid::Uuid;

use crate::{Result, StoreError};

pub(crate) const MESSAGE_COLUMNS: &str = "id, author_id, content, parent_id, created_at";

pub(crate) struct MessageRow {
    pub id: MessageId,
    pub author_id: String,
    pub content: String,
    pub parent_id: Option<MessageId>,
    pub created_at: String,
}

impl MessageRow {
    /// Expects the columns in `MESSAGE_COLUMNS` order.
    pub(crate) fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            author_id: row.get(1)?,
            content: row.get(2)?,
            parent_id: row.get(3)?,
            created_at: row.get(4)?,
        })
    }

    pub(crate) fn into_message(self) -> Result<Message> {
        let author_id = self.author_id.parse::<Uuid>().map_err(|e| {
            StoreError::Invariant(format!(
                "corrupt author_id '{}' on message {}: {}",
                self.author_id, self.id, e
            ))
        })?;
        let created_at = parse_timestamp(&self.created_at).ok_or_else(|| {
            StoreError::Invariant(format!(
                "corrupt created_at '{}' on message {}",
                self.created_at, self.id
            ))
        })?;

        Ok(Message {
            id: self.id,
            author_id,
            content: self.content,
            parent_id: self.parent_id,
            created_at,
        })
    }
}

/// Current time at the precision stored in the database.
pub(crate) fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}

/// Fixed-width RFC 3339 so that text order equals time order.
pub(crate) fn format_timestamp(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub(crate) fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    raw.parse::<DateTime<Utc>>()
        .or_else(|_| {
            // Rows written by hand through the sqlite shell use datetime('now')
            NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S").map(|ndt| ndt.and_utc())
        })
        .ok()
}

/// COUNT(*) results arrive as i64; a negative one means storage is broken.
pub(crate) fn to_count(raw: i64, what: &str) -> Result<u64> {
    u64::try_from(raw).map_err(|_| StoreError::Invariant(format!("negative {}: {}", what, raw)))
}
