use anyhow::{Context, Result};
use chrono::Utc;
use rusqlite::{params, Connection, ErrorCode};
use serde::Serialize;
use std::sync::{Arc, Mutex};

/// A reader comment on a content item.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: i64,
    pub post_id: String,
    pub content: String,
    pub author_name: String,
    pub author_email: String,
    pub approved: bool,
    pub created_at: String,
}

/// A like record. Unique per (post, email).
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Like {
    pub post_id: String,
    pub user_name: String,
    pub user_email: String,
    pub created_at: String,
}

#[derive(Clone)]
pub struct Database {
    conn: Arc<Mutex<Connection>>,
}

impl Database {
    /// Open the database and create tables if needed.
    pub fn new(database_path: &str) -> Result<Self> {
        let conn = Connection::open(database_path)
            .context(format!("Failed to open database at {}", database_path))?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS comments (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                post_id TEXT NOT NULL,
                content TEXT NOT NULL,
                author_name TEXT NOT NULL,
                author_email TEXT NOT NULL,
                approved INTEGER NOT NULL DEFAULT 1,
                created_at TEXT NOT NULL
            )",
            [],
        )
        .context("Failed to create comments table")?;

        // The UNIQUE constraint is the single source of truth for like
        // uniqueness; concurrent check-then-insert races resolve here.
        conn.execute(
            "CREATE TABLE IF NOT EXISTS likes (
                post_id TEXT NOT NULL,
                user_name TEXT NOT NULL,
                user_email TEXT NOT NULL,
                created_at TEXT NOT NULL,
                UNIQUE(post_id, user_email)
            )",
            [],
        )
        .context("Failed to create likes table")?;

        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_comments_post ON comments (post_id, created_at)",
            [],
        )
        .context("Failed to create comments index")?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    // ==================== Comments ====================

    /// Insert a comment, approved by default, with a server-assigned
    /// timestamp. Returns the stored record.
    pub fn add_comment(
        &self,
        post_id: &str,
        content: &str,
        author_name: &str,
        author_email: &str,
    ) -> Result<Comment> {
        let conn = self.conn.lock().unwrap();
        let created_at = Utc::now().to_rfc3339();

        conn.execute(
            "INSERT INTO comments (post_id, content, author_name, author_email, approved, created_at)
             VALUES (?1, ?2, ?3, ?4, 1, ?5)",
            params![post_id, content, author_name, author_email, created_at],
        )
        .context("Failed to insert comment")?;

        Ok(Comment {
            id: conn.last_insert_rowid(),
            post_id: post_id.to_string(),
            content: content.to_string(),
            author_name: author_name.to_string(),
            author_email: author_email.to_string(),
            approved: true,
            created_at,
        })
    }

    /// Approved comments for a content item, newest first. Unapproved
    /// comments are excluded unconditionally.
    pub fn list_approved_comments(&self, post_id: &str) -> Result<Vec<Comment>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(
            "SELECT id, post_id, content, author_name, author_email, approved, created_at
             FROM comments
             WHERE post_id = ?1 AND approved = 1
             ORDER BY created_at DESC, id DESC",
        )?;

        let comments = stmt
            .query_map(params![post_id], |row| {
                Ok(Comment {
                    id: row.get(0)?,
                    post_id: row.get(1)?,
                    content: row.get(2)?,
                    author_name: row.get(3)?,
                    author_email: row.get(4)?,
                    approved: row.get::<_, i64>(5)? != 0,
                    created_at: row.get(6)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(comments)
    }

    /// Moderation hook: flip a comment's approval flag.
    pub fn set_comment_approval(&self, comment_id: i64, approved: bool) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "UPDATE comments SET approved = ?1 WHERE id = ?2",
            params![approved as i64, comment_id],
        )
        .context("Failed to update comment approval")?;
        Ok(())
    }

    // ==================== Likes ====================

    /// Total like count for a content item.
    pub fn like_count(&self, post_id: &str) -> Result<usize> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare("SELECT COUNT(*) FROM likes WHERE post_id = ?1")?;
        let count: i64 = stmt.query_row(params![post_id], |row| row.get(0))?;
        Ok(count as usize)
    }

    /// Whether this email has already liked the item.
    pub fn has_liked(&self, post_id: &str, user_email: &str) -> Result<bool> {
        let conn = self.conn.lock().unwrap();
        let mut stmt =
            conn.prepare("SELECT COUNT(*) FROM likes WHERE post_id = ?1 AND user_email = ?2")?;
        let count: i64 = stmt.query_row(params![post_id, user_email], |row| row.get(0))?;
        Ok(count > 0)
    }

    /// Record a like. Returns `Ok(None)` when a like already exists for
    /// (post, email); the UNIQUE constraint guarantees no duplicate row even
    /// when two requests race.
    pub fn add_like(&self, post_id: &str, user_name: &str, user_email: &str) -> Result<Option<Like>> {
        let conn = self.conn.lock().unwrap();
        let created_at = Utc::now().to_rfc3339();

        let inserted = conn.execute(
            "INSERT INTO likes (post_id, user_name, user_email, created_at)
             VALUES (?1, ?2, ?3, ?4)",
            params![post_id, user_name, user_email, created_at],
        );

        match inserted {
            Ok(_) => Ok(Some(Like {
                post_id: post_id.to_string(),
                user_name: user_name.to_string(),
                user_email: user_email.to_string(),
                created_at,
            })),
            Err(rusqlite::Error::SqliteFailure(e, _))
                if e.code == ErrorCode::ConstraintViolation =>
            {
                Ok(None)
            }
            Err(e) => Err(e).context("Failed to insert like"),
        }
    }

    /// Remove a like if present. Idempotent: returns `false` when there was
    /// nothing to remove, which is not an error.
    pub fn remove_like(&self, post_id: &str, user_email: &str) -> Result<bool> {
        let conn = self.conn.lock().unwrap();
        let rows_affected = conn
            .execute(
                "DELETE FROM likes WHERE post_id = ?1 AND user_email = ?2",
                params![post_id, user_email],
            )
            .context("Failed to remove like")?;

        Ok(rows_affected > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    // ==================== Helper Functions ====================

    /// Create a temporary database for testing
    fn create_test_db() -> (Database, TempDir) {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let db_path = temp_dir.path().join("test_site.db");
        let db = Database::new(db_path.to_str().unwrap()).expect("Failed to create database");
        (db, temp_dir)
    }

    // ==================== Database Initialization Tests ====================

    #[test]
    fn test_database_creation() {
        let (db, _temp_dir) = create_test_db();

        let comments = db.list_approved_comments("p1").expect("Should list");
        assert!(comments.is_empty());
        assert_eq!(db.like_count("p1").expect("count"), 0);
    }

    #[test]
    fn test_database_reopening() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let db_path = temp_dir.path().join("test.db");
        let path_str = db_path.to_str().unwrap();

        {
            let db = Database::new(path_str).expect("Failed to create database");
            db.add_comment("p1", "Nice post", "Ann", "ann@x.com")
                .expect("Should add");
        }

        {
            let db = Database::new(path_str).expect("Failed to reopen database");
            let comments = db.list_approved_comments("p1").expect("list");
            assert_eq!(comments.len(), 1, "Comment should persist");
        }
    }

    #[test]
    fn test_invalid_database_path() {
        let result = Database::new("/non/existent/path/db.db");
        assert!(result.is_err());
    }

    // ==================== Comment Tests ====================

    #[test]
    fn test_add_comment_defaults_to_approved() {
        let (db, _temp_dir) = create_test_db();

        let comment = db
            .add_comment("p1", "Great article", "Ann", "ann@x.com")
            .expect("Should add comment");

        assert!(comment.approved);
        assert!(comment.id > 0);
        assert_eq!(comment.post_id, "p1");
        assert_eq!(comment.content, "Great article");

        // Timestamp is valid RFC3339
        chrono::DateTime::parse_from_rfc3339(&comment.created_at).expect("valid RFC3339");
    }

    #[test]
    fn test_list_comments_newest_first() {
        let (db, _temp_dir) = create_test_db();

        db.add_comment("p1", "first", "Ann", "ann@x.com").expect("add");
        std::thread::sleep(std::time::Duration::from_millis(10));
        db.add_comment("p1", "second", "Bob", "bob@x.com").expect("add");
        std::thread::sleep(std::time::Duration::from_millis(10));
        db.add_comment("p1", "third", "Cam", "cam@x.com").expect("add");

        let comments = db.list_approved_comments("p1").expect("list");

        assert_eq!(comments.len(), 3);
        assert_eq!(comments[0].content, "third");
        assert_eq!(comments[1].content, "second");
        assert_eq!(comments[2].content, "first");
    }

    #[test]
    fn test_list_comments_excludes_unapproved() {
        let (db, _temp_dir) = create_test_db();

        let kept = db.add_comment("p1", "visible", "Ann", "ann@x.com").expect("add");
        let hidden = db.add_comment("p1", "spam", "Eve", "eve@x.com").expect("add");
        db.set_comment_approval(hidden.id, false).expect("unapprove");

        let comments = db.list_approved_comments("p1").expect("list");

        assert_eq!(comments.len(), 1);
        assert_eq!(comments[0].id, kept.id);
    }

    #[test]
    fn test_list_comments_scoped_to_post() {
        let (db, _temp_dir) = create_test_db();

        db.add_comment("p1", "on p1", "Ann", "ann@x.com").expect("add");
        db.add_comment("p2", "on p2", "Bob", "bob@x.com").expect("add");

        let comments = db.list_approved_comments("p1").expect("list");
        assert_eq!(comments.len(), 1);
        assert_eq!(comments[0].content, "on p1");
    }

    #[test]
    fn test_comment_special_characters_preserved() {
        let (db, _temp_dir) = create_test_db();

        let content = "Quotes ' \" and <html> & newline\nhere";
        db.add_comment("p1", content, "Ann", "ann@x.com").expect("add");

        let comments = db.list_approved_comments("p1").expect("list");
        assert_eq!(comments[0].content, content);
    }

    #[test]
    fn test_comment_sql_injection_prevention() {
        let (db, _temp_dir) = create_test_db();

        let malicious = "'; DROP TABLE comments; --";
        db.add_comment("p1", malicious, malicious, "eve@x.com")
            .expect("add");

        // Table should still exist and function
        let comments = db.list_approved_comments("p1").expect("list");
        assert_eq!(comments.len(), 1);
        assert_eq!(comments[0].content, malicious);
    }

    // ==================== Like Tests ====================

    #[test]
    fn test_add_like_first_time() {
        let (db, _temp_dir) = create_test_db();

        let like = db.add_like("p1", "Ann", "ann@x.com").expect("like");

        let like = like.expect("should be stored");
        assert_eq!(like.post_id, "p1");
        assert_eq!(like.user_email, "ann@x.com");
        chrono::DateTime::parse_from_rfc3339(&like.created_at).expect("valid RFC3339");

        assert_eq!(db.like_count("p1").expect("count"), 1);
        assert!(db.has_liked("p1", "ann@x.com").expect("check"));
    }

    #[test]
    fn test_add_like_duplicate_rejected() {
        let (db, _temp_dir) = create_test_db();

        assert!(db.add_like("p1", "Ann", "ann@x.com").expect("first").is_some());
        assert!(db.add_like("p1", "Ann", "ann@x.com").expect("second").is_none());

        // Exactly one row stored
        assert_eq!(db.like_count("p1").expect("count"), 1);
    }

    #[test]
    fn test_same_email_can_like_different_posts() {
        let (db, _temp_dir) = create_test_db();

        assert!(db.add_like("p1", "Ann", "ann@x.com").expect("like p1").is_some());
        assert!(db.add_like("p2", "Ann", "ann@x.com").expect("like p2").is_some());

        assert_eq!(db.like_count("p1").expect("count"), 1);
        assert_eq!(db.like_count("p2").expect("count"), 1);
    }

    #[test]
    fn test_different_emails_like_same_post() {
        let (db, _temp_dir) = create_test_db();

        assert!(db.add_like("p1", "Ann", "ann@x.com").expect("like").is_some());
        assert!(db.add_like("p1", "Bob", "bob@x.com").expect("like").is_some());

        assert_eq!(db.like_count("p1").expect("count"), 2);
    }

    #[test]
    fn test_remove_like() {
        let (db, _temp_dir) = create_test_db();

        db.add_like("p1", "Ann", "ann@x.com").expect("like");
        let removed = db.remove_like("p1", "ann@x.com").expect("unlike");

        assert!(removed);
        assert_eq!(db.like_count("p1").expect("count"), 0);
        assert!(!db.has_liked("p1", "ann@x.com").expect("check"));
    }

    #[test]
    fn test_remove_like_idempotent() {
        let (db, _temp_dir) = create_test_db();

        // No prior like: both removals succeed with no error
        assert!(!db.remove_like("p1", "ann@x.com").expect("first"));
        assert!(!db.remove_like("p1", "ann@x.com").expect("second"));
        assert_eq!(db.like_count("p1").expect("count"), 0);
    }

    #[test]
    fn test_like_unlike_like_cycle() {
        let (db, _temp_dir) = create_test_db();

        assert!(db.add_like("p1", "Ann", "ann@x.com").expect("like").is_some());
        assert!(db.remove_like("p1", "ann@x.com").expect("unlike"));
        assert!(db.add_like("p1", "Ann", "ann@x.com").expect("re-like").is_some());

        assert_eq!(db.like_count("p1").expect("count"), 1);
    }

    #[test]
    fn test_has_liked_unknown_email() {
        let (db, _temp_dir) = create_test_db();

        db.add_like("p1", "Ann", "ann@x.com").expect("like");

        assert!(!db.has_liked("p1", "bob@x.com").expect("check"));
        assert!(!db.has_liked("p2", "ann@x.com").expect("check"));
    }

    // ==================== Concurrency Tests ====================

    #[test]
    fn test_concurrent_likes_store_exactly_one_row() {
        let (db, _temp_dir) = create_test_db();

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let db_clone = db.clone();
                std::thread::spawn(move || {
                    db_clone
                        .add_like("p1", "Ann", "ann@x.com")
                        .expect("like")
                        .is_some()
                })
            })
            .collect();

        let successes = handles
            .into_iter()
            .map(|h| h.join().expect("thread"))
            .filter(|added| *added)
            .count();

        assert_eq!(successes, 1, "Exactly one like attempt should win");
        assert_eq!(db.like_count("p1").expect("count"), 1);
    }

    #[test]
    fn test_concurrent_comments_no_deadlock() {
        let (db, _temp_dir) = create_test_db();

        let handles: Vec<_> = (0..10)
            .map(|i| {
                let db_clone = db.clone();
                std::thread::spawn(move || {
                    for j in 0..5 {
                        db_clone
                            .add_comment("p1", &format!("comment {}-{}", i, j), "Ann", "ann@x.com")
                            .expect("add should not deadlock");
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().expect("Thread should complete");
        }

        let comments = db.list_approved_comments("p1").expect("list");
        assert_eq!(comments.len(), 50);
    }
}
