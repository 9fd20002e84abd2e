//! Represents a node (file or directory) of the virtual filesystem.

use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// Soft-delete state. The only transition is `Live -> Archived`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum RecordStatus {
    #[default]
    Live,
    Archived,
}

impl From<bool> for RecordStatus {
    fn from(is_archived: bool) -> Self {
        if is_archived {
            RecordStatus::Archived
        } else {
            RecordStatus::Live
        }
    }
}

/// One row of the `files` table.
///
/// Files and directories share the table. A record whose `file_name` has
/// no extension is a directory node: it has no content and exists so that
/// listings of its parent can show it.
#[derive(Clone, FromRow, Debug)]
pub struct FileRecord {
    /// Surrogate key assigned on insert.
    pub id: i64,

    /// Normalized parent directory (`""` is the root).
    pub dir: String,

    /// Base name within `dir`.
    pub file_name: String,

    /// Byte length of `content`.
    pub size: i64,

    /// File bytes. Left empty by listing queries, which do not select it.
    #[sqlx(default)]
    pub content: Vec<u8>,

    #[sqlx(rename = "is_archived", try_from = "bool")]
    pub status: RecordStatus,

    pub created_at: DateTime<Utc>,

    /// Refreshed on every content update.
    pub last_modified: DateTime<Utc>,
}

impl FileRecord {
    /// Swap in new content, keeping `size` in step with it.
    pub fn replace_content(&mut self, content: impl Into<Vec<u8>>) {
        self.content = content.into();
        self.size = self.content.len() as i64;
    }
}
