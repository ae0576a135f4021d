use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

pub mod objects;
pub mod refs;

/// Name of the metadata directory searched for by [`Repository::discover`].
pub const GIT_DIR_NAME: &str = ".git";

pub struct Repository {
    pub git_dir: PathBuf,
}

impl Repository {
    /// Locate the repository enclosing `start`, walking up towards the filesystem root.
    pub fn discover<P: AsRef<Path>>(start: P) -> Result<Self> {
        let start = fs::canonicalize(start)?;
        let git_dir = find_git_dir(&start)?;
        Ok(Self { git_dir })
    }

    pub fn objects_dir(&self) -> PathBuf {
        self.git_dir.join("objects")
    }

    pub fn heads_dir(&self) -> PathBuf {
        self.git_dir.join("refs").join("heads")
    }
}

/// Find the .git directory by looking up the directory tree
fn find_git_dir(start_path: &Path) -> Result<PathBuf> {
    let mut current = start_path.to_path_buf();

    loop {
        let git_dir = current.join(GIT_DIR_NAME);
        if git_dir.is_dir() {
            return Ok(git_dir);
        }

        if !current.pop() {
            return Err(Error::NotARepository);
        }
    }
}
