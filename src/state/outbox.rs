use chrono::Utc;
use rusqlite::{Connection, Result as SqlResult};
use std::path::PathBuf;

use super::data::RawFile;

/// The Outbox manages the SQLite database of submitted posts.
/// It stores each post's caption and the ordered list of attached media.
pub struct Outbox {
    conn: Connection,
    db_path: PathBuf,
}

/// Confirmation returned once a post has been recorded.
#[derive(Debug, Clone, PartialEq)]
pub struct PostReceipt {
    pub post_id: i64,
    pub media_count: usize,
}

impl Outbox {
    /// Create a new Outbox instance and initialize the database.
    ///
    /// The database file is created in the user's data directory:
    /// - Linux: ~/.local/share/post-composer/outbox.db
    /// - macOS: ~/Library/Application Support/post-composer/outbox.db
    /// - Windows: %APPDATA%\post-composer\outbox.db
    pub fn new() -> SqlResult<Self> {
        let db_path = Self::get_db_path();

        // Ensure the parent directory exists
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent)
                .expect("Failed to create application data directory");
        }

        // Open or create the database
        let conn = Connection::open(&db_path)?;

        println!("📁 Outbox database initialized at: {}", db_path.display());

        init_schema(&conn)?;

        Ok(Outbox { conn, db_path })
    }

    /// Get the path where the database should be stored
    fn get_db_path() -> PathBuf {
        let mut path = dirs::data_dir()
            .or_else(dirs::home_dir)
            .expect("Could not determine user data directory");

        path.push("post-composer");
        path.push("outbox.db");
        path
    }

    /// Get the path to the database file
    pub fn path(&self) -> &PathBuf {
        &self.db_path
    }

    /// Get a count of submitted posts
    pub fn post_count(&self) -> SqlResult<i64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM posts", [], |row| row.get(0))?;
        Ok(count)
    }
}

/// Initialize the database schema.
/// Creates all necessary tables and indexes if they don't exist.
fn init_schema(conn: &Connection) -> SqlResult<()> {
    // Create posts table
    conn.execute(
        "CREATE TABLE IF NOT EXISTS posts (
            id              INTEGER PRIMARY KEY AUTOINCREMENT,
            caption         TEXT NOT NULL,
            created_at      INTEGER NOT NULL
        )",
        [],
    )?;

    // Create post_media table
    // One row per attachment, position preserves the compose order
    conn.execute(
        "CREATE TABLE IF NOT EXISTS post_media (
            id              INTEGER PRIMARY KEY AUTOINCREMENT,
            post_id         INTEGER NOT NULL,
            position        INTEGER NOT NULL,
            filename        TEXT NOT NULL,
            path            TEXT NOT NULL,
            byte_length     INTEGER NOT NULL,
            FOREIGN KEY(post_id) REFERENCES posts(id) ON DELETE CASCADE
        )",
        [],
    )?;

    // Create indexes for fast queries
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_posts_created_at
         ON posts(created_at DESC)",
        [],
    )?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_post_media_post_id
         ON post_media(post_id)",
        [],
    )?;

    Ok(())
}

/// Record a submitted post with its ordered attachments.
///
/// Opens a new database connection for the background task:
/// rusqlite::Connection is not Send, so the main connection stays with
/// the UI thread. The post row and its media rows are written in one
/// transaction so a failure cannot leave a caption without its media.
pub async fn store_post_async(
    db_path: PathBuf,
    caption: String,
    files: Vec<RawFile>,
) -> Result<PostReceipt, String> {
    let mut conn = Connection::open(&db_path)
        .map_err(|e| format!("Failed to open outbox database: {}", e))?;

    init_schema(&conn).map_err(|e| format!("Failed to initialize outbox schema: {}", e))?;

    let tx = conn
        .transaction()
        .map_err(|e| format!("Failed to start transaction: {}", e))?;

    tx.execute(
        "INSERT INTO posts (caption, created_at) VALUES (?1, ?2)",
        rusqlite::params![caption, Utc::now().timestamp()],
    )
    .map_err(|e| format!("Failed to store post: {}", e))?;

    let post_id = tx.last_insert_rowid();

    for (position, file) in files.iter().enumerate() {
        tx.execute(
            "INSERT INTO post_media (post_id, position, filename, path, byte_length)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            rusqlite::params![
                post_id,
                position as i64,
                file.name,
                file.path.to_string_lossy().to_string(),
                file.byte_length as i64,
            ],
        )
        .map_err(|e| format!("Failed to store media '{}': {}", file.name, e))?;
    }

    tx.commit()
        .map_err(|e| format!("Failed to commit post: {}", e))?;

    println!("✅ Stored post #{} with {} attachments", post_id, files.len());

    Ok(PostReceipt {
        post_id,
        media_count: files.len(),
    })
}

// Implement Debug for better error messages
impl std::fmt::Debug for Outbox {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Outbox")
            .field("db_path", &self.db_path)
            .finish()
    }
}
