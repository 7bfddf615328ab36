use std::collections::{HashMap, HashSet};

use lostfound_types::models::{Message, MessageId};
use rusqlite::Connection;
use uuid::Uuid;

use crate::likes::query_liked;
use crate::stats::{MessageCounts, query_counts};
use crate::threads::{query_message, query_replies, query_roots};
use crate::{Database, Result, StoreError};

/// Messages together with their counts and the viewer's likes, all read
/// in the same transaction.
#[derive(Debug, Default)]
pub struct Snapshot {
    pub messages: Vec<Message>,
    pub counts: HashMap<MessageId, MessageCounts>,
    /// Empty for anonymous viewers.
    pub liked: HashSet<MessageId>,
}

impl Database {
    // -- Viewer snapshots --

    /// One page of roots, newest first, plus the total number of roots.
    pub fn roots_page(
        &self,
        page: u32,
        page_size: u32,
        viewer: Option<Uuid>,
    ) -> Result<(Snapshot, u64)> {
        self.with_conn(|conn| {
            let (roots, total) = query_roots(conn, page, page_size)?;
            Ok((annotate_in(conn, roots, viewer)?, total))
        })
    }

    /// A message followed by its replies when it is a root. A reply comes
    /// back alone.
    pub fn thread(&self, id: MessageId, viewer: Option<Uuid>) -> Result<Snapshot> {
        self.with_conn(|conn| {
            let message =
                query_message(conn, id)?.ok_or_else(|| StoreError::message_not_found(id))?;

            let mut messages = if message.is_root() {
                query_replies(conn, id)?
            } else {
                Vec::new()
            };
            messages.insert(0, message);

            annotate_in(conn, messages, viewer)
        })
    }

    /// Replies to a root in conversation order.
    pub fn replies(&self, root_id: MessageId, viewer: Option<Uuid>) -> Result<Snapshot> {
        self.with_conn(|conn| {
            let replies = query_replies(conn, root_id)?;
            annotate_in(conn, replies, viewer)
        })
    }

    /// Counts and likes for messages the caller already holds.
    pub fn annotate(&self, messages: Vec<Message>, viewer: Option<Uuid>) -> Result<Snapshot> {
        self.with_conn(|conn| annotate_in(conn, messages, viewer))
    }
}

fn annotate_in(
    conn: &Connection,
    messages: Vec<Message>,
    viewer: Option<Uuid>,
) -> Result<Snapshot> {
    if messages.is_empty() {
        return Ok(Snapshot::default());
    }

    let ids: Vec<MessageId> = messages.iter().map(|m| m.id).collect();
    let counts = query_counts(conn, &ids)?;
    let liked = match viewer {
        Some(user_id) => query_liked(conn, user_id, &ids)?,
        None => HashSet::new(),
    };

    Ok(Snapshot {
        messages,
        counts,
        liked,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::thread;

    #[test]
    fn thread_puts_the_root_first() {
        let db = Database::open_in_memory().unwrap();
        let u = Uuid::new_v4();
        let root = db.create_message(u, "found: gloves", None).unwrap();
        let a = db.create_message(u, "mine", Some(root.id)).unwrap();
        let b = db.create_message(u, "no, mine", Some(root.id)).unwrap();
        db.toggle_like(u, a.id).unwrap();

        let snap = db.thread(root.id, Some(u)).unwrap();
        let ids: Vec<_> = snap.messages.iter().map(|m| m.id).collect();
        assert_eq!(ids, vec![root.id, a.id, b.id]);
        assert_eq!(snap.counts[&root.id].replies, 2);
        assert_eq!(snap.liked, HashSet::from([a.id]));

        let alone = db.thread(b.id, None).unwrap();
        assert_eq!(alone.messages.len(), 1);
        assert!(alone.liked.is_empty());

        assert!(matches!(db.thread(9999, None), Err(StoreError::NotFound(_))));
    }

    #[test]
    fn roots_page_reports_total_and_viewer_likes() {
        let db = Database::open_in_memory().unwrap();
        let u = Uuid::new_v4();
        let ids: Vec<_> = (0..3)
            .map(|i| db.create_message(u, &format!("item {}", i), None).unwrap().id)
            .collect();
        db.toggle_like(u, ids[1]).unwrap();

        let (snap, total) = db.roots_page(1, 2, Some(u)).unwrap();
        assert_eq!(total, 3);
        assert_eq!(snap.messages.len(), 2);
        assert_eq!(snap.liked, HashSet::from([ids[1]]));

        let (empty, total) = db.roots_page(5, 2, Some(u)).unwrap();
        assert_eq!(total, 3);
        assert!(empty.messages.is_empty());
    }

    #[test]
    fn like_state_and_count_agree_under_concurrent_toggles() {
        let path = std::env::temp_dir().join(format!("lostfound-snap-{}.db", Uuid::new_v4()));
        let db = Arc::new(Database::open(&path).unwrap());
        let user = Uuid::new_v4();
        let message = db.create_message(user, "lost: library card", None).unwrap();
        let stop = Arc::new(AtomicBool::new(false));

        let toggler = {
            let db = db.clone();
            let stop = stop.clone();
            let id = message.id;
            thread::spawn(move || {
                while !stop.load(Ordering::Relaxed) {
                    db.toggle_like(user, id).unwrap();
                }
            })
        };

        let mut mismatches = 0;
        for _ in 0..2000 {
            let snap = db.annotate(vec![message.clone()], Some(user)).unwrap();
            let liked = snap.liked.contains(&message.id);
            if (snap.counts[&message.id].likes == 1) != liked {
                mismatches += 1;
            }
        }
        stop.store(true, Ordering::Relaxed);
        toggler.join().unwrap();
        assert_eq!(mismatches, 0);

        drop(db);
        for suffix in ["", "-wal", "-shm"] {
            let _ = std::fs::remove_file(format!("{}{}", path.display(), suffix));
        }
    }
}
