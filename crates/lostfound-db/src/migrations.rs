use rusqlite::Connection;
use tracing::info;

use crate::Result;

pub fn run(conn: &Connection) -> Result<()> {
    conn.execute_batch("CREATE TABLE IF NOT EXISTS schema_version (version INTEGER NOT NULL);")?;

    let version: i64 =
        conn.query_row("SELECT COALESCE(MAX(version), 0) FROM schema_version", [], |r| r.get(0))?;

    if version < 1 {
        info!("Running migration v1 (messages + likes)");
        conn.execute_batch(
            "
            BEGIN;

            CREATE TABLE messages (
                id          INTEGER PRIMARY KEY AUTOINCREMENT,
                author_id   TEXT NOT NULL,
                content     TEXT NOT NULL,
                parent_id   INTEGER REFERENCES messages(id),
                created_at  TEXT NOT NULL
            );

            CREATE INDEX idx_messages_thread
                ON messages(parent_id, created_at, id);

            CREATE INDEX idx_messages_author
                ON messages(author_id);

            -- One row per (user, message); the key is what makes toggling idempotent
            CREATE TABLE message_likes (
                user_id     TEXT NOT NULL,
                message_id  INTEGER NOT NULL REFERENCES messages(id),
                created_at  TEXT NOT NULL,
                PRIMARY KEY (user_id, message_id)
            );

            CREATE INDEX idx_message_likes_message
                ON message_likes(message_id);

            INSERT INTO schema_version (version) VALUES (1);

            COMMIT;
            ",
        )?;
    }

    info!("Database migrations complete");
    Ok(())
}
