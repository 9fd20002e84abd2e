//! Path resolution: request path -> `(dir, file_name)` address.
//!
//! Whether a path names a file or a directory is decided here, once, from
//! the syntax of the last segment alone. A name containing a `.` is a file;
//! anything else is a directory listing.

use super::ValidationError;
use std::fmt;

const MAX_PATH_LEN: usize = 1024;

/// A resolved request path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Address {
    File(RecordAddress),
    Directory(DirectoryPath),
}

/// Normalized directory path. Segments are joined by `/` with no leading or
/// trailing slash; the root is the empty string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct DirectoryPath(String);

/// The `(dir, file_name)` pair identifying one row of the store.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RecordAddress {
    pub dir: DirectoryPath,
    pub file_name: String,
}

/// Resolve a slash-separated path into a tagged address.
pub fn resolve(path: &str) -> Result<Address, ValidationError> {
    let mut segments = segments(path)?;
    let Some(last) = segments.pop() else {
        return Ok(Address::Directory(DirectoryPath::root()));
    };

    if has_extension(last) {
        Ok(Address::File(RecordAddress {
            dir: DirectoryPath(segments.join("/")),
            file_name: last.to_string(),
        }))
    } else {
        segments.push(last);
        Ok(Address::Directory(DirectoryPath(segments.join("/"))))
    }
}

/// True when `name` carries an extension (`a.txt`, `.env`, `foo.`), which
/// makes it a file node rather than a directory node. A trailing dot counts
/// as an extension of its own.
pub fn has_extension(name: &str) -> bool {
    name.rfind('.').is_some()
}

/// Split and clean a path. Empty and `.` segments vanish; `..` and control
/// characters are refused.
fn segments(path: &str) -> Result<Vec<&str>, ValidationError> {
    let invalid = |reason| ValidationError::InvalidPath {
        path: path.to_string(),
        reason,
    };

    if path.len() > MAX_PATH_LEN {
        return Err(invalid("path is too long"));
    }
    if path.chars().any(|c| c.is_control() || c == '\\') {
        return Err(invalid("path contains control characters or backslashes"));
    }

    let mut out = Vec::new();
    for segment in path.split('/') {
        match segment {
            "" | "." => continue,
            ".." => return Err(invalid("parent segments are not allowed")),
            s => out.push(s),
        }
    }
    Ok(out)
}

impl DirectoryPath {
    pub fn root() -> Self {
        Self(String::new())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    /// Address of the directory node that makes this directory visible in
    /// its parent's listing. The root has no node.
    pub fn node_address(&self) -> Option<RecordAddress> {
        if self.is_root() {
            return None;
        }
        let (parent, base) = match self.0.rfind('/') {
            Some(idx) => (&self.0[..idx], &self.0[idx + 1..]),
            None => ("", self.0.as_str()),
        };
        Some(RecordAddress {
            dir: DirectoryPath(parent.to_string()),
            file_name: base.to_string(),
        })
    }
}

impl fmt::Display for DirectoryPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "/{}", self.0)
    }
}

impl fmt::Display for RecordAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.dir.is_root() {
            write!(f, "/{}", self.file_name)
        } else {
            write!(f, "/{}/{}", self.dir.as_str(), self.file_name)
        }
    }
}

#[cfg(test)]
impl DirectoryPath {
    /// Normalize an arbitrary directory string (`"/a//b/"` -> `"a/b"`).
    pub fn parse(path: &str) -> Result<Self, ValidationError> {
        Ok(Self(segments(path)?.join("/")))
    }
}

#[cfg(test)]
impl RecordAddress {
    pub fn new(dir: &str, file_name: impl Into<String>) -> Result<Self, ValidationError> {
        let file_name = file_name.into();
        if file_name.is_empty() || file_name.contains('/') || matches!(file_name.as_str(), "." | "..")
        {
            return Err(ValidationError::InvalidPath {
                path: file_name,
                reason: "file name must be a single path segment",
            });
        }
        Ok(Self {
            dir: DirectoryPath::parse(dir)?,
            file_name,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_file_with_extension() {
        let addr = resolve("/foo/bar.txt").unwrap();
        assert_eq!(
            addr,
            Address::File(RecordAddress {
                dir: DirectoryPath("foo".into()),
                file_name: "bar.txt".into(),
            })
        );
    }

    #[test]
    fn resolves_extensionless_name_as_directory() {
        assert_eq!(
            resolve("foo/report").unwrap(),
            Address::Directory(DirectoryPath("foo/report".into()))
        );
    }

    #[test]
    fn last_dot_decides_extension() {
        assert!(has_extension("foo.bar.txt"));
        assert!(has_extension(".env"));
        assert!(has_extension("foo."));
        assert!(!has_extension("foo"));
    }

    #[test]
    fn trailing_dot_resolves_to_file() {
        assert_eq!(
            resolve("dir/foo.").unwrap(),
            Address::File(RecordAddress::new("dir", "foo.").unwrap())
        );
    }

    #[test]
    fn empty_and_slash_resolve_to_root() {
        for path in ["", "/", "//", "/./"] {
            assert_eq!(
                resolve(path).unwrap(),
                Address::Directory(DirectoryPath::root())
            );
        }
    }

    #[test]
    fn redundant_separators_are_collapsed() {
        assert_eq!(
            resolve("//a/./b//c.txt").unwrap(),
            Address::File(RecordAddress::new("a/b", "c.txt").unwrap())
        );
    }

    #[test]
    fn parent_segments_are_rejected() {
        let err = resolve("/a/../etc/passwd.txt").unwrap_err();
        assert!(matches!(err, ValidationError::InvalidPath { .. }));
    }

    #[test]
    fn control_characters_are_rejected() {
        assert!(resolve("a/b\0.txt").is_err());
        assert!(resolve("a\\b.txt").is_err());
    }

    #[test]
    fn node_address_splits_parent_and_base() {
        let nested = DirectoryPath::parse("a/b").unwrap();
        assert_eq!(
            nested.node_address(),
            Some(RecordAddress::new("a", "b").unwrap())
        );

        let top = DirectoryPath::parse("docs").unwrap();
        assert_eq!(top.node_address(), Some(RecordAddress::new("", "docs").unwrap()));

        assert_eq!(DirectoryPath::root().node_address(), None);
    }

    #[test]
    fn record_address_rejects_multi_segment_names() {
        assert!(RecordAddress::new("a", "b/c.txt").is_err());
        assert!(RecordAddress::new("a", "").is_err());
    }

    #[test]
    fn display_renders_absolute_paths() {
        assert_eq!(RecordAddress::new("", "a.txt").unwrap().to_string(), "/a.txt");
        assert_eq!(RecordAddress::new("x/y", "a.txt").unwrap().to_string(), "/x/y/a.txt");
        assert_eq!(DirectoryPath::root().to_string(), "/");
    }
}
