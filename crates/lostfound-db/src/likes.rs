use std::collections::HashSet;

use lostfound_types::models::MessageId;
use rusqlite::{Connection, params};
use rusqlite::types::ToSql;
use tracing::debug;
use uuid::Uuid;

use crate::models::{format_timestamp, now};
use crate::threads::parent_of;
use crate::{Database, ID_BATCH, Result, StoreError, placeholders};

impl Database {
    // -- Likes --

    /// Flip the (user, message) like fact. Returns `true` if the like now
    /// exists.
    ///
    /// The existence check and the write happen in one immediate
    /// transaction, keyed on the `(user_id, message_id)` primary key, so
    /// concurrent toggles from the same user serialize into alternating
    /// inserts and deletes.
    pub fn toggle_like(&self, user_id: Uuid, message_id: MessageId) -> Result<bool> {
        let user = user_id.to_string();
        let liked_at = format_timestamp(now());

        let liked = self.with_conn_mut(|conn| {
            if parent_of(conn, message_id)?.is_none() {
                return Err(StoreError::message_not_found(message_id));
            }

            let removed = conn.execute(
                "DELETE FROM message_likes WHERE user_id = ?1 AND message_id = ?2",
                params![user, message_id],
            )?;
            if removed > 0 {
                return Ok(false);
            }

            let inserted = conn.execute(
                "INSERT INTO message_likes (user_id, message_id, created_at) VALUES (?1, ?2, ?3)
                 ON CONFLICT(user_id, message_id) DO NOTHING",
                params![user, message_id, liked_at],
            )?;
            if inserted == 0 {
                return Err(StoreError::Invariant(format!(
                    "like ({}, {}) appeared inside an immediate transaction",
                    user, message_id
                )));
            }
            Ok(true)
        })?;

        debug!(%user_id, message_id, liked, "Like toggled");
        Ok(liked)
    }

    /// Which of `message_ids` the user has liked.
    pub fn liked_by(&self, user_id: Uuid, message_ids: &[MessageId]) -> Result<HashSet<MessageId>> {
        if message_ids.is_empty() {
            return Ok(HashSet::new());
        }
        self.with_conn(|conn| query_liked(conn, user_id, message_ids))
    }
}

pub(crate) fn query_liked(
    conn: &Connection,
    user_id: Uuid,
    message_ids: &[MessageId],
) -> Result<HashSet<MessageId>> {
    let user = user_id.to_string();
    let mut liked = HashSet::new();
    for batch in message_ids.chunks(ID_BATCH) {
        let sql = format!(
            "SELECT message_id FROM message_likes WHERE user_id = ?1 AND message_id IN ({})",
            placeholders(2, batch.len())
        );

        let mut stmt = conn.prepare(&sql)?;
        let mut bound: Vec<&dyn ToSql> = Vec::with_capacity(batch.len() + 1);
        bound.push(&user);
        bound.extend(batch.iter().map(|id| id as &dyn ToSql));

        let rows = stmt.query_map(bound.as_slice(), |row| row.get::<_, MessageId>(0))?;
        for id in rows {
            liked.insert(id?);
        }
    }
    Ok(liked)
}
