//! Directory listing parameters and the query they compile to.
//!
//! Ordering tokens are checked against a closed set and mapped to fixed
//! column names, so caller text never reaches the SQL string. The filter
//! and directory are always bound parameters.

use super::{ValidationError, address::DirectoryPath};
use sqlx::{QueryBuilder, sqlite::Sqlite};
use std::str::FromStr;

/// Columns returned by a listing. Content is deliberately left out.
const LISTING_COLUMNS: &str =
    "SELECT id, dir, file_name, size, is_archived, created_at, last_modified FROM files";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderBy {
    FileName,
    Size,
    LastModified,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderDirection {
    Ascending,
    Descending,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ordering {
    pub by: OrderBy,
    pub direction: OrderDirection,
}

/// A validated request to list the live children of one directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingQuery {
    pub dir: DirectoryPath,
    pub filter: Option<String>,
    pub ordering: Option<Ordering>,
}

impl OrderBy {
    fn column(self) -> &'static str {
        match self {
            OrderBy::FileName => "file_name",
            OrderBy::Size => "size",
            OrderBy::LastModified => "last_modified",
        }
    }
}

impl FromStr for OrderBy {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "fileName" => Ok(OrderBy::FileName),
            "size" => Ok(OrderBy::Size),
            "lastModified" => Ok(OrderBy::LastModified),
            other => Err(ValidationError::OrderByNotAllowed(other.to_string())),
        }
    }
}

impl OrderDirection {
    fn keyword(self) -> &'static str {
        match self {
            OrderDirection::Ascending => "ASC",
            OrderDirection::Descending => "DESC",
        }
    }
}

impl FromStr for OrderDirection {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Ascending" => Ok(OrderDirection::Ascending),
            "Descending" => Ok(OrderDirection::Descending),
            other => Err(ValidationError::OrderDirectionNotAllowed(other.to_string())),
        }
    }
}

impl Ordering {
    /// Validate a raw `orderBy`/`orderDirection` pair. Empty strings count
    /// as absent.
    ///
    /// Checks run in a fixed order: the `orderBy` value, the
    /// `orderDirection` value, then that both or neither were given.
    pub fn parse(
        order_by: Option<&str>,
        order_direction: Option<&str>,
    ) -> Result<Option<Self>, ValidationError> {
        let by = present(order_by).map(OrderBy::from_str).transpose()?;
        let direction = present(order_direction)
            .map(OrderDirection::from_str)
            .transpose()?;

        match (by, direction) {
            (Some(by), Some(direction)) => Ok(Some(Ordering { by, direction })),
            (None, None) => Ok(None),
            _ => Err(ValidationError::UnpairedOrdering),
        }
    }
}

impl ListingQuery {
    /// Validate raw listing parameters for `dir`.
    pub fn new(
        dir: DirectoryPath,
        filter: Option<&str>,
        order_by: Option<&str>,
        order_direction: Option<&str>,
    ) -> Result<Self, ValidationError> {
        Ok(Self {
            dir,
            filter: present(filter).map(str::to_string),
            ordering: Ordering::parse(order_by, order_direction)?,
        })
    }

    /// Compile to a parameterized query over live, immediate children.
    ///
    /// `id` is always the last sort key so results are stable for a given
    /// store state, with or without a requested ordering.
    pub fn build(&self) -> QueryBuilder<'static, Sqlite> {
        let mut builder = QueryBuilder::<Sqlite>::new(LISTING_COLUMNS);
        builder.push(" WHERE is_archived = 0 AND dir = ");
        builder.push_bind(self.dir.as_str().to_string());

        if let Some(filter) = &self.filter {
            // instr() is case-sensitive; LIKE is not for ASCII.
            builder.push(" AND instr(file_name, ");
            builder.push_bind(filter.clone());
            builder.push(") > 0");
        }

        builder.push(" ORDER BY ");
        if let Some(ordering) = self.ordering {
            builder.push(ordering.by.column());
            builder.push(" ");
            builder.push(ordering.direction.keyword());
            builder.push(", ");
        }
        builder.push("id ASC");
        builder
    }
}

fn present(value: Option<&str>) -> Option<&str> {
    value.filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dir(path: &str) -> DirectoryPath {
        DirectoryPath::parse(path).unwrap()
    }

    fn all(dir: DirectoryPath) -> ListingQuery {
        ListingQuery::new(dir, None, None, None).unwrap()
    }

    #[test]
    fn accepts_known_tokens() {
        let q = ListingQuery::new(dir("foo"), None, Some("size"), Some("Descending")).unwrap();
        assert_eq!(
            q.ordering,
            Some(Ordering {
                by: OrderBy::Size,
                direction: OrderDirection::Descending,
            })
        );
    }

    #[test]
    fn rejects_unknown_order_by() {
        let err = ListingQuery::new(dir("foo"), None, Some("foo"), None).unwrap_err();
        assert_eq!(err.to_string(), "[orderBy] field foo is not allowed");
    }

    #[test]
    fn rejects_unknown_order_direction() {
        let err = ListingQuery::new(dir("foo"), None, None, Some("foo")).unwrap_err();
        assert_eq!(err.to_string(), "[orderDirection] field foo is not allowed");
    }

    #[test]
    fn order_tokens_are_case_sensitive() {
        assert!(ListingQuery::new(dir(""), None, Some("FileName"), Some("Ascending")).is_err());
        assert!(ListingQuery::new(dir(""), None, Some("fileName"), Some("asc")).is_err());
    }

    #[test]
    fn ordering_must_be_paired() {
        let only_by = ListingQuery::new(dir("foo"), None, Some("fileName"), None).unwrap_err();
        assert_eq!(only_by, ValidationError::UnpairedOrdering);

        let only_dir = ListingQuery::new(dir("foo"), None, None, Some("Ascending")).unwrap_err();
        assert_eq!(only_dir, ValidationError::UnpairedOrdering);
    }

    #[test]
    fn empty_values_count_as_absent() {
        let q = ListingQuery::new(dir("foo"), Some(""), Some(""), Some("")).unwrap();
        assert_eq!(q, all(dir("foo")));
    }

    #[test]
    fn plain_listing_sql_is_stable_by_id() {
        let builder = all(dir("a/b")).build();
        assert_eq!(
            builder.sql(),
            "SELECT id, dir, file_name, size, is_archived, created_at, last_modified FROM files \
             WHERE is_archived = 0 AND dir = ? ORDER BY id ASC"
        );
    }

    #[test]
    fn filtered_and_ordered_sql_binds_values() {
        let q = ListingQuery::new(dir("a"), Some("rep"), Some("lastModified"), Some("Descending"))
            .unwrap();
        let builder = q.build();
        assert_eq!(
            builder.sql(),
            "SELECT id, dir, file_name, size, is_archived, created_at, last_modified FROM files \
             WHERE is_archived = 0 AND dir = ? AND instr(file_name, ?) > 0 \
             ORDER BY last_modified DESC, id ASC"
        );
    }
}
