//! Resource store module
//!
//! Read-only access to the files of one directory, addressed by bare file name.
//! The router only talks to this trait so tests can swap in an in-memory store.

use std::fs;
use std::io;
use std::path::PathBuf;

/// Read-only view over a flat set of named resources
pub trait ResourceStore: Send + Sync {
    /// Whether `name` exists
    fn exists(&self, name: &str) -> bool;

    /// Size in bytes of `name`, `None` if it does not exist or is not a regular file
    fn size(&self, name: &str) -> Option<u64>;

    /// Full contents of `name`
    fn read(&self, name: &str) -> io::Result<Vec<u8>>;
}

/// Store backed by a directory on the local filesystem
#[derive(Debug, Clone)]
pub struct FsStore {
    root: PathBuf,
}

impl FsStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Join a bare file name onto the root.
    ///
    /// Names carrying a separator or a parent component never resolve, so the
    /// result always stays directly inside `root`.
    fn resolve(&self, name: &str) -> Option<PathBuf> {
        if !is_bare_name(name) {
            return None;
        }
        Some(self.root.join(name))
    }
}

impl ResourceStore for FsStore {
    fn exists(&self, name: &str) -> bool {
        self.resolve(name).is_some_and(|path| path.exists())
    }

    fn size(&self, name: &str) -> Option<u64> {
        let path = self.resolve(name)?;
        let meta = fs::metadata(path).ok()?;
        meta.is_file().then(|| meta.len())
    }

    fn read(&self, name: &str) -> io::Result<Vec<u8>> {
        let Some(path) = self.resolve(name) else {
            return Err(io::Error::from(io::ErrorKind::NotFound));
        };
        fs::read(path)
    }
}

fn is_bare_name(name: &str) -> bool {
    !name.is_empty()
        && name != "."
        && name != ".."
        && !name.contains(['/', '\\', '\0'])
}
