//! src/services/file_repository.rs
//!
//! FileRepository is the persistence side of the virtual filesystem. Every
//! node lives in one flat SQLite table (`files`); directories are rows whose
//! name has no extension. This file owns point lookups, listings, inserts
//! with parent-directory materialization, content updates and archival.
//! It never logs or retries failures; callers decide what to do with them.

use crate::{
    models::file::FileRecord,
    vfs::{
        address::{DirectoryPath, RecordAddress},
        listing::ListingQuery,
    },
};
use chrono::{DateTime, Utc};
use sqlx::{SqliteConnection, SqlitePool};
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("no file at `{path}`")]
    NotFound { path: String },
    #[error("no record with id {0}")]
    RecordNotFound(i64),
    #[error("file {path} already exists")]
    Conflict { path: String },
    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

pub type RepositoryResult<T> = Result<T, RepositoryError>;

/// Content for a file that is about to be created.
#[derive(Debug, Clone)]
pub struct NewFile {
    pub address: RecordAddress,
    pub content: Vec<u8>,
}

/// FileRepository provides the file store operations:
/// - Point lookup of a live record by address
/// - Listing of the live, immediate children of a directory
/// - Create (materializing the parent directory node on the way)
/// - Content update by id
/// - Archival (soft delete)
///
/// Cloning is cheap: all clones share one connection pool.
#[derive(Clone)]
pub struct FileRepository {
    /// Shared SQLite connection pool.
    pub db: Arc<SqlitePool>,
}

impl FileRepository {
    pub fn new(db: Arc<SqlitePool>) -> Self {
        Self { db }
    }

    /// Fetch the live record at `address`, content included.
    ///
    /// Returns NotFound if there is no row or the row is archived.
    pub async fn get_by_file_path(&self, address: &RecordAddress) -> RepositoryResult<FileRecord> {
        sqlx::query_as::<_, FileRecord>(
            "SELECT id, dir, file_name, size, content, is_archived, created_at, last_modified
             FROM files
             WHERE is_archived = 0 AND dir = ? AND file_name = ?",
        )
        .bind(address.dir.as_str())
        .bind(&address.file_name)
        .fetch_one(&*self.db)
        .await
        .map_err(|err| match err {
            sqlx::Error::RowNotFound => RepositoryError::NotFound {
                path: address.to_string(),
            },
            other => RepositoryError::Sqlx(other),
        })
    }

    /// List live, immediate children of `query.dir` (metadata only).
    ///
    /// An empty result is not an error; it does not say whether the
    /// directory itself exists. See [`FileRepository::directory_exists`].
    pub async fn get_by_dir(&self, query: &ListingQuery) -> RepositoryResult<Vec<FileRecord>> {
        let mut builder = query.build();
        let rows = builder
            .build_query_as::<FileRecord>()
            .fetch_all(&*self.db)
            .await?;
        Ok(rows)
    }

    /// Whether `dir` is a known directory: the root always is, anything else
    /// needs a live directory node.
    pub async fn directory_exists(&self, dir: &DirectoryPath) -> RepositoryResult<bool> {
        let Some(node) = dir.node_address() else {
            return Ok(true);
        };
        match self.get_by_file_path(&node).await {
            Ok(_) => Ok(true),
            Err(RepositoryError::NotFound { .. }) => Ok(false),
            Err(err) => Err(err),
        }
    }

    /// Insert a new live file.
    ///
    /// - Materializes the directory node of `dir` in its parent (one level
    ///   only; grandparents are not created).
    /// - Inserts the file with `created_at == last_modified == now`.
    ///
    /// Both steps share a transaction. A live record already at the address
    /// trips the partial unique index and surfaces as Conflict.
    pub async fn create(&self, file: NewFile) -> RepositoryResult<FileRecord> {
        let now = Utc::now();
        let mut tx = self.db.begin().await?;

        if let Some(parent) = file.address.dir.node_address() {
            materialize_directory(&mut tx, &parent, now).await?;
        }

        let inserted = sqlx::query_as::<_, FileRecord>(
            r#"
            INSERT INTO files (dir, file_name, size, content, is_archived, created_at, last_modified)
            VALUES (?, ?, ?, ?, 0, ?, ?)
            RETURNING id, dir, file_name, size, content, is_archived, created_at, last_modified
            "#,
        )
        .bind(file.address.dir.as_str())
        .bind(&file.address.file_name)
        .bind(file.content.len() as i64)
        .bind(file.content.as_slice())
        .bind(now)
        .bind(now)
        .fetch_one(&mut *tx)
        .await;

        let record = match inserted {
            Ok(record) => record,
            Err(err) if is_unique_violation(&err) => {
                return Err(RepositoryError::Conflict {
                    path: file.address.to_string(),
                });
            }
            Err(err) => return Err(RepositoryError::Sqlx(err)),
        };

        tx.commit().await?;
        debug!("created {} ({} bytes, id {})", file.address, record.size, record.id);
        Ok(record)
    }

    /// Overwrite content of the record with `record.id`.
    ///
    /// `size` is recomputed from the content and `last_modified` set to now;
    /// nothing else changes. Returns the row as stored.
    pub async fn update(&self, record: &FileRecord) -> RepositoryResult<FileRecord> {
        let updated = sqlx::query_as::<_, FileRecord>(
            r#"
            UPDATE files SET size = ?, content = ?, last_modified = ?
            WHERE id = ?
            RETURNING id, dir, file_name, size, content, is_archived, created_at, last_modified
            "#,
        )
        .bind(record.content.len() as i64)
        .bind(record.content.as_slice())
        .bind(Utc::now())
        .bind(record.id)
        .fetch_one(&*self.db)
        .await
        .map_err(|err| match err {
            sqlx::Error::RowNotFound => RepositoryError::RecordNotFound(record.id),
            other => RepositoryError::Sqlx(other),
        })?;

        debug!("updated record {} ({} bytes)", updated.id, updated.size);
        Ok(updated)
    }

    /// Archive the live record at `address`. The row stays in the table.
    ///
    /// Returns NotFound when nothing live matched, including a second
    /// archive of the same address.
    pub async fn mark_as_archived(&self, address: &RecordAddress) -> RepositoryResult<()> {
        let result = sqlx::query(
            "UPDATE files SET is_archived = 1
             WHERE is_archived = 0 AND dir = ? AND file_name = ?",
        )
        .bind(address.dir.as_str())
        .bind(&address.file_name)
        .execute(&*self.db)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound {
                path: address.to_string(),
            });
        }

        debug!("archived {}", address);
        Ok(())
    }
}

/// Insert an empty directory node at `node` unless a live one is there.
async fn materialize_directory(
    conn: &mut SqliteConnection,
    node: &RecordAddress,
    now: DateTime<Utc>,
) -> RepositoryResult<()> {
    let result = sqlx::query(
        r#"
        INSERT INTO files (dir, file_name, size, content, is_archived, created_at, last_modified)
        VALUES (?, ?, 0, x'', 0, ?, ?)
        ON CONFLICT (dir, file_name) WHERE is_archived = 0 DO NOTHING
        "#,
    )
    .bind(node.dir.as_str())
    .bind(&node.file_name)
    .bind(now)
    .bind(now)
    .execute(conn)
    .await?;

    if result.rows_affected() > 0 {
        debug!("materialized directory node {}", node);
    }
    Ok(())
}

/// Return true if SQLx error indicates a unique constraint violation.
fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db_err) if db_err.is_unique_violation())
}
