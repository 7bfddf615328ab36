use lostfound_types::models::{Caller, Message, MessageId};
use rusqlite::{Connection, OptionalExtension, params};
use tracing::info;
use uuid::Uuid;

use crate::models::{MESSAGE_COLUMNS, MessageRow, format_timestamp, now};
use crate::{Database, Result, StoreError};

pub const MAX_CONTENT_CHARS: usize = 2000;

/// What a successful delete removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeleteOutcome {
    pub was_root: bool,
    pub replies_removed: usize,
    pub likes_removed: usize,
}

impl Database {
    // -- Threads --

    /// Insert a root (`parent_id = None`) or a reply to an existing root.
    pub fn create_message(
        &self,
        author_id: Uuid,
        content: &str,
        parent_id: Option<MessageId>,
    ) -> Result<Message> {
        validate_content(content)?;
        let created_at = now();

        let message = self.with_conn_mut(|conn| {
            if let Some(pid) = parent_id {
                match parent_of(conn, pid)? {
                    None => return Err(StoreError::message_not_found(pid)),
                    Some(Some(_)) => {
                        return Err(StoreError::Conflict(format!(
                            "message {} is a reply and cannot be replied to",
                            pid
                        )));
                    }
                    Some(None) => {}
                }
            }

            conn.execute(
                "INSERT INTO messages (author_id, content, parent_id, created_at)
                 VALUES (?1, ?2, ?3, ?4)",
                params![author_id.to_string(), content, parent_id, format_timestamp(created_at)],
            )?;

            Ok(Message {
                id: conn.last_insert_rowid(),
                author_id,
                content: content.to_string(),
                parent_id,
                created_at,
            })
        })?;

        info!(message_id = message.id, parent_id = ?parent_id, "Message created");
        Ok(message)
    }

    /// Delete a message the caller owns (or any message, for privileged
    /// callers). Deleting a root takes its replies and every like on the
    /// thread with it, in the same transaction.
    pub fn delete_message(&self, id: MessageId, caller: Caller) -> Result<DeleteOutcome> {
        let outcome = self.with_conn_mut(|conn| {
            let target = query_message(conn, id)?.ok_or_else(|| StoreError::message_not_found(id))?;

            if target.author_id != caller.user_id && !caller.privileged {
                return Err(StoreError::Forbidden(
                    "only the author or an administrator may delete this message".into(),
                ));
            }

            match target.parent_id {
                None => {
                    let likes_removed = conn.execute(
                        "DELETE FROM message_likes WHERE message_id IN
                            (SELECT id FROM messages WHERE id = ?1 OR parent_id = ?1)",
                        [id],
                    )?;
                    let replies_removed =
                        conn.execute("DELETE FROM messages WHERE parent_id = ?1", [id])?;
                    conn.execute("DELETE FROM messages WHERE id = ?1", [id])?;

                    Ok(DeleteOutcome {
                        was_root: true,
                        replies_removed,
                        likes_removed,
                    })
                }
                Some(parent) => {
                    match parent_of(conn, parent)? {
                        Some(None) => {}
                        Some(Some(grandparent)) => {
                            return Err(StoreError::Invariant(format!(
                                "reply {} hangs off reply {} (parent {})",
                                id, parent, grandparent
                            )));
                        }
                        None => {
                            return Err(StoreError::Invariant(format!(
                                "reply {} references missing parent {}",
                                id, parent
                            )));
                        }
                    }

                    let likes_removed =
                        conn.execute("DELETE FROM message_likes WHERE message_id = ?1", [id])?;
                    conn.execute("DELETE FROM messages WHERE id = ?1", [id])?;

                    Ok(DeleteOutcome {
                        was_root: false,
                        replies_removed: 0,
                        likes_removed,
                    })
                }
            }
        })?;

        info!(
            message_id = id,
            by = %caller.user_id,
            replies = outcome.replies_removed,
            likes = outcome.likes_removed,
            "Message deleted"
        );
        Ok(outcome)
    }

    /// One page of roots, newest first, plus the total number of roots.
    pub fn list_roots(&self, page: u32, page_size: u32) -> Result<(Vec<Message>, u64)> {
        self.with_conn(|conn| query_roots(conn, page, page_size))
    }

    /// Replies to a root in conversation order.
    pub fn list_replies(&self, root_id: MessageId) -> Result<Vec<Message>> {
        self.with_conn(|conn| query_replies(conn, root_id))
    }

    pub fn get_message(&self, id: MessageId) -> Result<Option<Message>> {
        self.with_conn(|conn| query_message(conn, id))
    }
}

pub(crate) fn query_roots(
    conn: &Connection,
    page: u32,
    page_size: u32,
) -> Result<(Vec<Message>, u64)> {
    let offset = u64::from(page.saturating_sub(1)) * u64::from(page_size);
    let offset = i64::try_from(offset).unwrap_or(i64::MAX);

    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM messages
         WHERE parent_id IS NULL
         ORDER BY created_at DESC, id DESC
         LIMIT ?1 OFFSET ?2",
        MESSAGE_COLUMNS
    ))?;
    let rows = stmt.query_map(params![page_size, offset], MessageRow::from_row)?;
    let roots = collect_messages(rows)?;

    let total: i64 = conn.query_row(
        "SELECT COUNT(*) FROM messages WHERE parent_id IS NULL",
        [],
        |row| row.get(0),
    )?;

    Ok((roots, crate::models::to_count(total, "root count")?))
}

/// `NotFound` unless `root_id` names an existing root.
pub(crate) fn query_replies(conn: &Connection, root_id: MessageId) -> Result<Vec<Message>> {
    match parent_of(conn, root_id)? {
        None => return Err(StoreError::message_not_found(root_id)),
        Some(Some(_)) => {
            return Err(StoreError::NotFound(format!("message {} is not a root message", root_id)));
        }
        Some(None) => {}
    }

    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM messages
         WHERE parent_id = ?1
         ORDER BY created_at ASC, id ASC",
        MESSAGE_COLUMNS
    ))?;
    let replies = collect_messages(stmt.query_map([root_id], MessageRow::from_row)?)?;

    if let Some(bad) = replies.iter().find(|r| r.parent_id != Some(root_id)) {
        return Err(StoreError::Invariant(format!(
            "reply {} listed under root {} has parent {:?}",
            bad.id, root_id, bad.parent_id
        )));
    }
    Ok(replies)
}

fn validate_content(content: &str) -> Result<()> {
    if content.trim().is_empty() {
        return Err(StoreError::Validation("message content must not be empty".into()));
    }
    if content.chars().count() > MAX_CONTENT_CHARS {
        return Err(StoreError::Validation(format!(
            "message content must be at most {} characters",
            MAX_CONTENT_CHARS
        )));
    }
    Ok(())
}

/// `None` if the message does not exist, otherwise its `parent_id`.
pub(crate) fn parent_of(conn: &Connection, id: MessageId) -> Result<Option<Option<MessageId>>> {
    let parent = conn
        .query_row("SELECT parent_id FROM messages WHERE id = ?1", [id], |row| {
            row.get::<_, Option<MessageId>>(0)
        })
        .optional()?;
    Ok(parent)
}

pub(crate) fn query_message(conn: &Connection, id: MessageId) -> Result<Option<Message>> {
    conn.query_row(
        &format!("SELECT {} FROM messages WHERE id = ?1", MESSAGE_COLUMNS),
        [id],
        MessageRow::from_row,
    )
    .optional()?
    .map(MessageRow::into_message)
    .transpose()
}

fn collect_messages<I>(rows: I) -> Result<Vec<Message>>
where
    I: Iterator<Item = rusqlite::Result<MessageRow>>,
{
    rows.map(|row| row.map_err(StoreError::from).and_then(MessageRow::into_message))
        .collect()
}
