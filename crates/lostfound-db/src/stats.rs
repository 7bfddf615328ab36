use std::collections::HashMap;

use lostfound_types::api::{GlobalStats, MessageStats, UserStats};
use lostfound_types::models::MessageId;
use rusqlite::Connection;
use rusqlite::types::ToSql;
use uuid::Uuid;

use crate::models::to_count;
use crate::threads::parent_of;
use crate::{Database, ID_BATCH, Result, StoreError, placeholders};

/// Like and reply counts for one message. `replies` is always zero for a
/// reply.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MessageCounts {
    pub likes: u64,
    pub replies: u64,
}

impl Database {
    // -- Stats --
    //
    // Everything here is counted from the rows at read time.

    pub fn global_stats(&self) -> Result<GlobalStats> {
        self.with_conn(|conn| {
            let (roots, replies, likes): (i64, i64, i64) = conn.query_row(
                "SELECT
                    (SELECT COUNT(*) FROM messages WHERE parent_id IS NULL),
                    (SELECT COUNT(*) FROM messages WHERE parent_id IS NOT NULL),
                    (SELECT COUNT(*) FROM message_likes)",
                [],
                |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
            )?;

            Ok(GlobalStats {
                total_roots: to_count(roots, "root count")?,
                total_replies: to_count(replies, "reply count")?,
                total_likes: to_count(likes, "like count")?,
            })
        })
    }

    pub fn message_stats(&self, id: MessageId) -> Result<MessageStats> {
        self.with_conn(|conn| {
            let parent = parent_of(conn, id)?.ok_or_else(|| StoreError::message_not_found(id))?;

            let likes: i64 = conn.query_row(
                "SELECT COUNT(*) FROM message_likes WHERE message_id = ?1",
                [id],
                |row| row.get(0),
            )?;

            let reply_count = match parent {
                Some(_) => None,
                None => {
                    let replies: i64 = conn.query_row(
                        "SELECT COUNT(*) FROM messages WHERE parent_id = ?1",
                        [id],
                        |row| row.get(0),
                    )?;
                    Some(to_count(replies, "reply count")?)
                }
            };

            Ok(MessageStats {
                like_count: to_count(likes, "like count")?,
                reply_count,
            })
        })
    }

    /// Activity for one author. A user with no messages gets zeros.
    pub fn user_stats(&self, user_id: Uuid) -> Result<UserStats> {
        let user = user_id.to_string();
        self.with_conn(|conn| {
            let (roots, replies): (i64, i64) = conn.query_row(
                "SELECT
                    COALESCE(SUM(parent_id IS NULL), 0),
                    COALESCE(SUM(parent_id IS NOT NULL), 0)
                 FROM messages WHERE author_id = ?1",
                [&user],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )?;

            let likes: i64 = conn.query_row(
                "SELECT COUNT(*) FROM message_likes l
                 JOIN messages m ON m.id = l.message_id
                 WHERE m.author_id = ?1",
                [&user],
                |row| row.get(0),
            )?;

            Ok(UserStats {
                roots_authored: to_count(roots, "root count")?,
                replies_authored: to_count(replies, "reply count")?,
                likes_received: to_count(likes, "like count")?,
            })
        })
    }

    /// Batch-fetch like and reply counts for a set of message ids. Every
    /// requested id is present in the result.
    pub fn counts_for(
        &self,
        message_ids: &[MessageId],
    ) -> Result<HashMap<MessageId, MessageCounts>> {
        if message_ids.is_empty() {
            return Ok(HashMap::new());
        }
        self.with_conn(|conn| query_counts(conn, message_ids))
    }
}

pub(crate) fn query_counts(
    conn: &Connection,
    message_ids: &[MessageId],
) -> Result<HashMap<MessageId, MessageCounts>> {
    let mut counts: HashMap<MessageId, MessageCounts> = message_ids
        .iter()
        .map(|id| (*id, MessageCounts::default()))
        .collect();

    for batch in message_ids.chunks(ID_BATCH) {
        let bound: Vec<&dyn ToSql> = batch.iter().map(|id| id as &dyn ToSql).collect();
        let in_list = placeholders(1, batch.len());

        let mut stmt = conn.prepare(&format!(
            "SELECT message_id, COUNT(*) FROM message_likes
             WHERE message_id IN ({}) GROUP BY message_id",
            in_list
        ))?;
        let rows = stmt.query_map(bound.as_slice(), |row| {
            Ok((row.get::<_, MessageId>(0)?, row.get::<_, i64>(1)?))
        })?;
        for row in rows {
            let (id, n) = row?;
            counts.entry(id).or_default().likes = to_count(n, "like count")?;
        }

        let mut stmt = conn.prepare(&format!(
            "SELECT parent_id, COUNT(*) FROM messages
             WHERE parent_id IN ({}) GROUP BY parent_id",
            in_list
        ))?;
        let rows = stmt.query_map(bound.as_slice(), |row| {
            Ok((row.get::<_, MessageId>(0)?, row.get::<_, i64>(1)?))
        })?;
        for row in rows {
            let (id, n) = row?;
            counts.entry(id).or_default().replies = to_count(n, "reply count")?;
        }
    }
    Ok(counts)
}
