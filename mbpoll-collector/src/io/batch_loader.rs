//! Batch file loader.
//!
//! Format:
//! - One target per line: `object_name<TAB>attribute_name`
//! - Blank lines are ignored
//! - `\r\n` line endings are accepted
//! - Surrounding whitespace in each field is trimmed
//! - Any other line shape is an error reported with its line number

use std::path::{Path, PathBuf};

use mbpoll_fs::{Filesystem, FsError};
use thiserror::Error;

use crate::target::ObjectAttributeRef;

/// Field separator within a batch line.
pub const FIELD_SEPARATOR: char = '\t';

/// Errors from batch file loading.
#[derive(Debug, Error)]
pub enum BatchLoadError {
    #[error("batch file not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("failed to read batch file {}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: FsError,
    },

    #[error("line {line}: expected 2 tab-separated fields, found {fields}: {content:?}")]
    Malformed {
        line: usize,
        fields: usize,
        content: String,
    },

    #[error("line {line}: empty {field}")]
    EmptyField { line: usize, field: &'static str },
}

/// Load targets from a batch file.
pub fn load_batch<F: Filesystem + ?Sized>(
    fs: &F,
    path: &Path,
) -> Result<Vec<ObjectAttributeRef>, BatchLoadError> {
    if !fs.exists(path) {
        return Err(BatchLoadError::NotFound(path.to_path_buf()));
    }
    let content = fs.read_file(path).map_err(|source| BatchLoadError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let targets = parse_batch(&content)?;
    log::info!("loaded {} target(s) from {}", targets.len(), path.display());
    Ok(targets)
}

/// Parse batch content from a string.
pub fn parse_batch(content: &str) -> Result<Vec<ObjectAttributeRef>, BatchLoadError> {
    let mut targets = Vec::new();

    for (index, line) in content.lines().enumerate() {
        let line_num = index + 1;
        if line.trim().is_empty() {
            continue;
        }

        let fields: Vec<&str> = line.split(FIELD_SEPARATOR).collect();
        let &[object, attribute] = fields.as_slice() else {
            return Err(BatchLoadError::Malformed {
                line: line_num,
                fields: fields.len(),
                content: line.to_string(),
            });
        };

        let (object, attribute) = (object.trim(), attribute.trim());
        if object.is_empty() {
            return Err(BatchLoadError::EmptyField {
                line: line_num,
                field: "object name",
            });
        }
        if attribute.is_empty() {
            return Err(BatchLoadError::EmptyField {
                line: line_num,
                field: "attribute name",
            });
        }

        targets.push(ObjectAttributeRef::new(object, attribute));
    }

    Ok(targets)
}
