use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::Path;
use tracing::debug;
use walkdir::WalkDir;

use crate::error::{is_valid_hash, Error, Result};

/// Local branches grouped by the commit their head ref points at.
///
/// Several branches may share one head. Name lists are kept in discovery
/// order; the accessors sort before handing anything out.
#[derive(Debug, Clone, Default)]
pub struct BranchMap {
    by_head: HashMap<String, Vec<String>>,
}

impl BranchMap {
    pub fn insert(&mut self, head: String, branch_name: String) {
        self.by_head.entry(head).or_default().push(branch_name);
    }

    /// Head commit hashes, ascending.
    pub fn heads(&self) -> Vec<String> {
        let mut heads: Vec<String> = self.by_head.keys().cloned().collect();
        heads.sort();
        heads
    }

    /// Sorted names of the branches whose head is `hash`.
    pub fn names_at(&self, hash: &str) -> Vec<&str> {
        let mut names: Vec<&str> = self
            .by_head
            .get(hash)
            .map(|names| names.iter().map(String::as_str).collect())
            .unwrap_or_default();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.by_head.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.by_head.is_empty()
    }
}

/// Read every branch head under `heads_dir` (normally `.git/refs/heads`).
///
/// Nested directories become `/`-separated branch names, so
/// `refs/heads/feature/x` is the branch `feature/x`. A missing directory
/// means there are no branches.
pub fn read_branches<P: AsRef<Path>>(heads_dir: P) -> Result<BranchMap> {
    let heads_dir = heads_dir.as_ref();
    let mut branches = BranchMap::default();

    if !heads_dir.is_dir() {
        return Ok(branches);
    }

    for entry in WalkDir::new(heads_dir).min_depth(1) {
        let entry = entry.map_err(io::Error::from)?;
        if !entry.file_type().is_file() {
            continue;
        }

        let branch_name = branch_name(heads_dir, entry.path())?;
        let head = read_head(&branch_name, entry.path())?;
        debug!(branch = %branch_name, head = %head, "read branch ref");

        branches.insert(head, branch_name);
    }

    Ok(branches)
}

// Path of a ref file relative to the heads directory, joined with '/'
fn branch_name(heads_dir: &Path, ref_path: &Path) -> Result<String> {
    let relative = ref_path.strip_prefix(heads_dir).map_err(|_| {
        Error::malformed_ref(
            &ref_path.to_string_lossy(),
            "ref file is outside the heads directory",
        )
    })?;

    let parts: Vec<String> = relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect();

    Ok(parts.join("/"))
}

fn read_head(branch_name: &str, ref_path: &Path) -> Result<String> {
    let content = fs::read_to_string(ref_path)
        .map_err(|e| Error::malformed_ref(branch_name, e.to_string()))?;
    let head = content.trim();

    if !is_valid_hash(head) {
        return Err(Error::malformed_ref(
            branch_name,
            format!("expected a 40-character commit hash, found '{}'", head),
        ));
    }

    Ok(head.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    const COMMIT_A: &str = "abcdef0123456789abcdef0123456789abcdef01";
    const COMMIT_B: &str = "0123456789abcdef0123456789abcdef01234567";

    fn setup_heads_dir() -> Result<tempfile::TempDir> {
        let temp_dir = tempdir()?;
        fs::create_dir_all(temp_dir.path().join("refs/heads"))?;
        Ok(temp_dir)
    }

    fn write_ref(heads_dir: &Path, name: &str, content: &str) -> Result<()> {
        let path = heads_dir.join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, content)?;
        Ok(())
    }

    #[test]
    fn test_read_flat_and_nested_branches() -> Result<()> {
        let temp_dir = setup_heads_dir()?;
        let heads_dir = temp_dir.path().join("refs/heads");

        write_ref(&heads_dir, "master", &format!("{}\n", COMMIT_A))?;
        write_ref(&heads_dir, "feature/x", &format!("{}\n", COMMIT_B))?;
        write_ref(&heads_dir, "feature/deep/y", COMMIT_B)?;

        let branches = read_branches(&heads_dir)?;

        assert_eq!(branches.len(), 3);
        assert_eq!(branches.names_at(COMMIT_A), vec!["master"]);
        assert_eq!(branches.names_at(COMMIT_B), vec!["feature/deep/y", "feature/x"]);

        let mut expected_heads = vec![COMMIT_A.to_string(), COMMIT_B.to_string()];
        expected_heads.sort();
        assert_eq!(branches.heads(), expected_heads);

        Ok(())
    }

    #[test]
    fn test_shared_head_names_are_sorted() -> Result<()> {
        let temp_dir = setup_heads_dir()?;
        let heads_dir = temp_dir.path().join("refs/heads");

        for name in ["zeta", "alpha", "main"] {
            write_ref(&heads_dir, name, &format!("{}\n", COMMIT_A))?;
        }

        let branches = read_branches(&heads_dir)?;
        assert_eq!(branches.heads(), vec![COMMIT_A.to_string()]);
        assert_eq!(branches.names_at(COMMIT_A), vec!["alpha", "main", "zeta"]);
        assert!(branches.names_at(COMMIT_B).is_empty());

        Ok(())
    }

    #[test]
    fn test_missing_heads_dir_is_empty() -> Result<()> {
        let temp_dir = tempdir()?;
        let branches = read_branches(temp_dir.path().join("refs/heads"))?;
        assert!(branches.is_empty());
        assert!(branches.heads().is_empty());
        Ok(())
    }

    #[test]
    fn test_symbolic_ref_is_malformed() -> Result<()> {
        let temp_dir = setup_heads_dir()?;
        let heads_dir = temp_dir.path().join("refs/heads");
        write_ref(&heads_dir, "topic", "ref: refs/heads/master\n")?;

        match read_branches(&heads_dir) {
            Err(Error::MalformedRef { name, .. }) => assert_eq!(name, "topic"),
            other => panic!("expected MalformedRef, got {:?}", other),
        }

        Ok(())
    }

    #[test]
    fn test_empty_ref_is_malformed() -> Result<()> {
        let temp_dir = setup_heads_dir()?;
        let heads_dir = temp_dir.path().join("refs/heads");
        write_ref(&heads_dir, "empty", "")?;

        assert!(matches!(
            read_branches(&heads_dir),
            Err(Error::MalformedRef { .. })
        ));

        Ok(())
    }
}
