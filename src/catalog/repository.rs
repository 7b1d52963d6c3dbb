//! The repository root and identifier-to-path mapping.

use std::ffi::OsString;
use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};

use crate::error::CatalogError;

use super::DatasetId;

/// A directory whose immediate children are datasets.
#[derive(Clone, Debug)]
pub struct Repository {
    root: PathBuf,
}

impl Repository {
    /// Open an existing repository root.
    pub fn open(root: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let root = root.as_ref();
        let canonical = root.canonicalize().map_err(|source| {
            CatalogError::Config(format!(
                "repository root {} is not accessible: {}",
                root.display(),
                source
            ))
        })?;

        if !canonical.is_dir() {
            return Err(CatalogError::Config(format!(
                "repository root {} is not a directory",
                root.display()
            )));
        }

        Ok(Self { root: canonical })
    }

    /// Open a repository root, creating the directory first if it is absent.
    pub fn create(root: impl AsRef<Path>) -> Result<Self, CatalogError> {
        fs::create_dir_all(root.as_ref())?;
        Self::open(root)
    }

    /// The canonical root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Map an identifier to its storage location under the root.
    ///
    /// The joined path is canonicalized so that `..` segments and symlinks
    /// cannot point outside the root.
    pub fn locate(&self, id: &DatasetId) -> Result<PathBuf, CatalogError> {
        let relative = Path::new(id.as_str());
        let lexically_escapes = relative.components().any(|component| {
            matches!(
                component,
                Component::ParentDir | Component::RootDir | Component::Prefix(_)
            )
        });
        if lexically_escapes {
            return Err(CatalogError::TraversalRejected {
                id: id.to_string(),
            });
        }

        let canonical = match self.root.join(relative).canonicalize() {
            Ok(path) => path,
            Err(source) if source.kind() == io::ErrorKind::NotFound => {
                return Err(CatalogError::NotFound {
                    id: id.to_string(),
                });
            }
            Err(source) => return Err(CatalogError::Io(source)),
        };

        if !canonical.starts_with(&self.root) {
            return Err(CatalogError::TraversalRejected {
                id: id.to_string(),
            });
        }
        if canonical == self.root {
            return Err(CatalogError::NotFound {
                id: id.to_string(),
            });
        }

        Ok(canonical)
    }

    /// Snapshot the names of the root's immediate children.
    ///
    /// Names starting with `.` or `_` are hidden or marker entries and are
    /// left out.
    pub fn entry_names(&self, sorted: bool) -> Result<Vec<OsString>, CatalogError> {
        let mut names = Vec::new();
        for entry in fs::read_dir(&self.root)? {
            let name = entry?.file_name();
            if is_hidden_name(&name.to_string_lossy()) {
                continue;
            }
            names.push(name);
        }

        if sorted {
            names.sort();
        }
        Ok(names)
    }
}

/// Entries the catalog and the store both ignore.
pub(crate) fn is_hidden_name(name: &str) -> bool {
    name.starts_with('.') || name.starts_with('_')
}
