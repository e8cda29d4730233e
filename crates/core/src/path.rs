//! Path helpers for `/`-separated repository paths

use crate::error::ValidationError;
use crate::model::ROOT_ID;
use smallvec::SmallVec;

/// Path separator used by change records
pub const SEPARATOR: char = '/';

/// Normalize a record path
///
/// - Converts `\` to `/`
/// - Removes `./` prefixes, `.` segments and a trailing `/`
/// - Rejects empty paths, absolute paths, `..` and empty segments
///
/// Errors carry index 0; callers attach the record index.
pub fn normalize_path(raw: &str) -> Result<String, ValidationError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::EmptyPath { index: 0 });
    }

    let unified = trimmed.replace('\\', "/");
    if unified.starts_with(SEPARATOR) {
        return Err(ValidationError::AbsolutePath {
            index: 0,
            path: raw.to_string(),
        });
    }

    let body = unified.strip_suffix(SEPARATOR).unwrap_or(&unified);
    let mut segments: SmallVec<[&str; 8]> = SmallVec::new();
    for segment in body.split(SEPARATOR) {
        match segment {
            "" => {
                return Err(ValidationError::EmptySegment {
                    index: 0,
                    path: raw.to_string(),
                })
            }
            "." => continue,
            ".." => {
                return Err(ValidationError::ParentTraversal {
                    index: 0,
                    path: raw.to_string(),
                })
            }
            s => segments.push(s),
        }
    }

    if segments.is_empty() {
        return Err(ValidationError::EmptyPath { index: 0 });
    }
    Ok(segments.join("/"))
}

/// Last segment of a path
pub fn basename(path: &str) -> &str {
    if path == ROOT_ID {
        return ROOT_ID;
    }
    path.rsplit(SEPARATOR).next().unwrap_or(path)
}

/// Immediate parent directory, `None` for top-level paths
pub fn parent(path: &str) -> Option<&str> {
    path.rfind(SEPARATOR).map(|idx| &path[..idx])
}

/// Every non-trailing prefix of a path, shortest first
///
/// `a/b/c.rs` yields `a`, `a/b`.
pub fn ancestors(path: &str) -> SmallVec<[&str; 8]> {
    path.match_indices(SEPARATOR)
        .map(|(idx, _)| &path[..idx])
        .collect()
}
