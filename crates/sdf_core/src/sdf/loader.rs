//! Loading SDF files from disk.

use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::model::Model;
use crate::sdf::parser::{parse_sdf_str, ParseError};

/// Errors that can occur while loading an SDF file.
///
/// Both variants carry the offending path so callers can report it as is.
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("Cannot read SDF file {}: {source}", .path.display())]
    Unreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed SDF file {}: {source}", .path.display())]
    Malformed {
        path: PathBuf,
        #[source]
        source: ParseError,
    },
}

/// Result type for loading operations.
pub type LoadResult<T> = Result<T, LoadError>;

/// Load an SDF file and return its first model.
///
/// Fails as a whole: a missing file, unreadable file, malformed XML, a
/// document without a `<model>` or a bad number never yields a partial model.
///
/// # Example
///
/// ```ignore
/// use sdf_core::sdf::load_sdf;
///
/// let model = load_sdf("plant/model.sdf")?;
/// println!("{} links", model.link_count());
/// ```
pub fn load_sdf<P: AsRef<Path>>(path: P) -> LoadResult<Model> {
    let path = path.as_ref();
    log::info!("Loading SDF: {}", path.display());

    let content = std::fs::read_to_string(path).map_err(|source| LoadError::Unreadable {
        path: path.to_path_buf(),
        source,
    })?;

    parse_sdf_str(&content).map_err(|source| LoadError::Malformed {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.sdf");

        let err = load_sdf(&path).unwrap_err();
        assert!(matches!(err, LoadError::Unreadable { .. }));
        assert!(err.to_string().contains("missing.sdf"));
    }

    #[test]
    fn test_load_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.sdf");
        std::fs::write(&path, r#"<sdf><model name="pot"><link name="base"/></model></sdf>"#)
            .unwrap();

        let model = load_sdf(&path).unwrap();
        assert_eq!(model.name, "pot");
        assert_eq!(model.link_count(), 1);
    }

    #[test]
    fn test_load_without_model_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.sdf");
        std::fs::write(&path, "<sdf/>").unwrap();

        let err = load_sdf(&path).unwrap_err();
        assert!(matches!(
            err,
            LoadError::Malformed {
                source: ParseError::NoModel,
                ..
            }
        ));
        assert!(err.to_string().contains("empty.sdf"));
    }
}
