//! SQLite implementation of [`AssociationStore`].
//!
//! # Schema Versioning
//!
//! A `schema_version` table records the applied version. Migrations run
//! sequentially from the stored version to `CURRENT_SCHEMA_VERSION`:
//!
//! - v1: `discussion_associations` with repo, discussion and issue IDs
//! - v2: `is_tracking` flag
//! - v3: `ref_comment_id` and a partial unique index on active rows

use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};

use rusqlite::{Connection, OptionalExtension, Row, params};
use tracing::debug;

use super::{AssociationStore, StoreError};
use crate::types::{
    Association, CommentNodeId, DiscussionNodeId, IssueNodeId, NewAssociation, RepoNodeId,
};

const CURRENT_SCHEMA_VERSION: i64 = 3;

const SELECT_COLUMNS: &str =
    "SELECT id, repo_id, discussion_id, issue_id, is_tracking, ref_comment_id
     FROM discussion_associations";

/// SQLite-backed association store.
///
/// `rusqlite::Connection` is not `Sync`, so it lives behind a mutex and every
/// query runs inside `tokio::task::spawn_blocking`.
#[derive(Clone)]
pub struct SqliteAssociationStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteAssociationStore {
    /// Opens (or creates) the database at `path` and applies pending migrations.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)
                .map_err(|e| StoreError::storage("create database directory", e))?;
        }

        let conn = Connection::open(path).map_err(|e| StoreError::storage("open database", e))?;
        conn.execute_batch("PRAGMA busy_timeout = 5000;")
            .map_err(|e| StoreError::storage("configure pragmas", e))?;
        Self::from_connection(conn)
    }

    /// Opens a private in-memory database.
    pub fn in_memory() -> Result<Self, StoreError> {
        let conn =
            Connection::open_in_memory().map_err(|e| StoreError::storage("open database", e))?;
        Self::from_connection(conn)
    }

    fn from_connection(conn: Connection) -> Result<Self, StoreError> {
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS schema_version (
                id INTEGER PRIMARY KEY CHECK (id = 1),
                version INTEGER NOT NULL
            );
            "#,
        )
        .map_err(|e| StoreError::storage("create schema_version table", e))?;

        let current: i64 = conn
            .query_row(
                "SELECT version FROM schema_version WHERE id = 1",
                [],
                |row| row.get(0),
            )
            .optional()
            .map_err(|e| StoreError::storage("get schema version", e))?
            .unwrap_or(0);

        run_migrations(&conn, current)?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    async fn with_conn<T, F>(&self, operation: &'static str, f: F) -> Result<T, StoreError>
    where
        T: Send + 'static,
        F: FnOnce(&mut Connection) -> Result<T, StoreError> + Send + 'static,
    {
        let conn = self.conn.clone();
        tokio::task::spawn_blocking(move || {
            let mut guard = lock(&conn, operation)?;
            f(&mut *guard)
        })
        .await
        .map_err(|e| StoreError::storage(operation, e))?
    }
}

fn lock<'a>(
    conn: &'a Mutex<Connection>,
    operation: &'static str,
) -> Result<MutexGuard<'a, Connection>, StoreError> {
    conn.lock()
        .map_err(|_| StoreError::storage(operation, "connection mutex poisoned"))
}

fn run_migrations(conn: &Connection, from_version: i64) -> Result<(), StoreError> {
    if from_version > CURRENT_SCHEMA_VERSION {
        return Err(StoreError::storage(
            "schema version",
            format!(
                "database schema version {} is newer than supported version {}",
                from_version, CURRENT_SCHEMA_VERSION
            ),
        ));
    }
    if from_version == CURRENT_SCHEMA_VERSION {
        return Ok(());
    }

    if from_version < 1 {
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS discussion_associations (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                repo_id TEXT NOT NULL,
                discussion_id TEXT NOT NULL,
                issue_id TEXT NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_associations_issue
                ON discussion_associations(issue_id);
            "#,
        )
        .map_err(|e| StoreError::storage("migration v1", e))?;
    }

    if from_version < 2 {
        conn.execute_batch(
            "ALTER TABLE discussion_associations ADD COLUMN is_tracking INTEGER NOT NULL DEFAULT 1;",
        )
        .map_err(|e| StoreError::storage("migration v2", e))?;
    }

    if from_version < 3 {
        conn.execute_batch(
            r#"
            ALTER TABLE discussion_associations ADD COLUMN ref_comment_id TEXT;
            CREATE UNIQUE INDEX IF NOT EXISTS idx_associations_active_issue
                ON discussion_associations(issue_id) WHERE is_tracking = 1;
            "#,
        )
        .map_err(|e| StoreError::storage("migration v3", e))?;
    }

    conn.execute(
        "INSERT OR REPLACE INTO schema_version (id, version) VALUES (1, ?1)",
        params![CURRENT_SCHEMA_VERSION],
    )
    .map_err(|e| StoreError::storage("update schema version", e))?;

    debug!(
        from = from_version,
        to = CURRENT_SCHEMA_VERSION,
        "Applied association store migrations"
    );
    Ok(())
}

fn row_to_association(row: &Row<'_>) -> rusqlite::Result<Association> {
    Ok(Association {
        id: row.get(0)?,
        repo_id: RepoNodeId(row.get(1)?),
        discussion_id: DiscussionNodeId(row.get(2)?),
        issue_id: IssueNodeId(row.get(3)?),
        is_tracking: row.get(4)?,
        ref_comment_id: row.get::<_, Option<String>>(5)?.map(CommentNodeId),
    })
}

impl AssociationStore for SqliteAssociationStore {
    async fn exists_for_issue(&self, issue: &IssueNodeId) -> Result<bool, StoreError> {
        let issue = issue.0.clone();
        self.with_conn("exists_for_issue", move |conn| {
            conn.query_row(
                "SELECT EXISTS(SELECT 1 FROM discussion_associations WHERE issue_id = ?1)",
                params![issue],
                |row| row.get(0),
            )
            .map_err(|e| StoreError::storage("exists_for_issue", e))
        })
        .await
    }

    async fn find_active_for_issue(
        &self,
        issue: &IssueNodeId,
    ) -> Result<Option<Association>, StoreError> {
        let issue = issue.0.clone();
        self.with_conn("find_active_for_issue", move |conn| {
            conn.query_row(
                &format!("{SELECT_COLUMNS} WHERE issue_id = ?1 AND is_tracking = 1"),
                params![issue],
                row_to_association,
            )
            .optional()
            .map_err(|e| StoreError::storage("find_active_for_issue", e))
        })
        .await
    }

    async fn latest_for_issue(
        &self,
        issue: &IssueNodeId,
    ) -> Result<Option<Association>, StoreError> {
        let issue = issue.0.clone();
        self.with_conn("latest_for_issue", move |conn| {
            conn.query_row(
                &format!("{SELECT_COLUMNS} WHERE issue_id = ?1 ORDER BY id DESC LIMIT 1"),
                params![issue],
                row_to_association,
            )
            .optional()
            .map_err(|e| StoreError::storage("latest_for_issue", e))
        })
        .await
    }

    async fn list_for_issue(&self, issue: &IssueNodeId) -> Result<Vec<Association>, StoreError> {
        let issue = issue.0.clone();
        self.with_conn("list_for_issue", move |conn| {
            let mut stmt = conn
                .prepare(&format!("{SELECT_COLUMNS} WHERE issue_id = ?1 ORDER BY id"))
                .map_err(|e| StoreError::storage("list_for_issue", e))?;
            let rows = stmt
                .query_map(params![issue], row_to_association)
                .map_err(|e| StoreError::storage("list_for_issue", e))?;
            rows.collect::<rusqlite::Result<Vec<_>>>()
                .map_err(|e| StoreError::storage("list_for_issue", e))
        })
        .await
    }

    async fn insert(&self, record: NewAssociation) -> Result<Association, StoreError> {
        self.with_conn("insert", move |conn| {
            let tx = conn
                .transaction()
                .map_err(|e| StoreError::storage("insert", e))?;

            let superseded = tx
                .execute(
                    "UPDATE discussion_associations SET is_tracking = 0
                     WHERE issue_id = ?1 AND is_tracking = 1",
                    params![record.issue_id.as_str()],
                )
                .map_err(|e| StoreError::storage("insert", e))?;
            if superseded > 0 {
                debug!(issue = %record.issue_id, superseded, "Superseded active association");
            }

            let id: i64 = tx
                .query_row(
                    "INSERT INTO discussion_associations
                         (repo_id, discussion_id, issue_id, is_tracking, ref_comment_id)
                     VALUES (?1, ?2, ?3, 1, ?4)
                     RETURNING id",
                    params![
                        record.repo_id.as_str(),
                        record.discussion_id.as_str(),
                        record.issue_id.as_str(),
                        record.ref_comment_id.as_ref().map(|c| c.as_str()),
                    ],
                    |row| row.get(0),
                )
                .map_err(|e| StoreError::storage("insert", e))?;

            tx.commit().map_err(|e| StoreError::storage("insert", e))?;

            Ok(Association {
                id,
                repo_id: record.repo_id,
                discussion_id: record.discussion_id,
                issue_id: record.issue_id,
                is_tracking: true,
                ref_comment_id: record.ref_comment_id,
            })
        })
        .await
    }

    async fn mark_untracked(&self, record: &Association) -> Result<(), StoreError> {
        let id = record.id;
        self.with_conn("mark_untracked", move |conn| {
            let updated = conn
                .execute(
                    "UPDATE discussion_associations SET is_tracking = 0 WHERE id = ?1",
                    params![id],
                )
                .map_err(|e| StoreError::storage("mark_untracked", e))?;
            if updated == 0 {
                return Err(StoreError::NotFound(id));
            }
            Ok(())
        })
        .await
    }
}
