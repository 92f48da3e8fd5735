//! Content store holding imported meshes by name.

use std::io;
use std::path::{Path, PathBuf};

use serde::Serialize;

use super::naming::extension_of;

/// Reference to imported mesh content.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ContentHandle {
    pub name: String,
    pub path: PathBuf,
}

/// Destination for imported meshes.
pub trait ContentStore {
    /// Look up already-imported content by mesh name.
    fn find(&self, name: &str) -> Option<ContentHandle>;

    /// Import the file at `source` under `name`.
    fn import(&self, source: &Path, name: &str) -> io::Result<()>;
}

/// Stores each mesh as `<root>/<name>.<extension>`.
#[derive(Clone, Debug)]
pub struct DirectoryStore {
    root: PathBuf,
    extension: String,
}

impl DirectoryStore {
    pub fn new(root: impl Into<PathBuf>, extension: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            extension: extension.into(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path that content named `name` occupies once imported.
    pub fn destination(&self, name: &str) -> PathBuf {
        self.root.join(format!("{}.{}", name, self.extension))
    }
}

impl ContentStore for DirectoryStore {
    fn find(&self, name: &str) -> Option<ContentHandle> {
        let path = self.destination(name);
        path.is_file().then(|| ContentHandle {
            name: name.to_string(),
            path,
        })
    }

    fn import(&self, source: &Path, name: &str) -> io::Result<()> {
        std::fs::create_dir_all(&self.root)?;

        // Keep the source's own extension so a file of the wrong format never
        // masquerades as imported content.
        let ext = extension_of(&source.to_string_lossy()).unwrap_or_default();
        let dest = self.root.join(format!("{}.{}", name, ext));

        std::fs::copy(source, &dest)?;
        log::debug!("Imported {} as {}", source.display(), dest.display());
        Ok(())
    }
}
