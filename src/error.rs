use std::path::PathBuf;
use thiserror::Error;

/// Failures raised while reading the repository and building the commit graph.
///
/// Every variant is fatal for a run; nothing is retried.
#[derive(Error, Debug)]
pub enum Error {
    /// No `.git` directory exists in the start directory or any of its parents.
    #[error("Not inside a Git repository")]
    NotARepository,

    /// The loose object for a referenced commit is missing.
    #[error("object {hash} not found at {}", path.display())]
    ObjectNotFound { hash: String, path: PathBuf },

    /// The object exists but could not be decompressed or parsed as a commit.
    #[error("corrupt object {hash}: {reason}")]
    CorruptObject { hash: String, reason: String },

    /// A branch head ref could not be read or does not hold a commit hash.
    #[error("malformed ref {name}: {reason}")]
    MalformedRef { name: String, reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub(crate) fn corrupt(hash: &str, reason: impl Into<String>) -> Self {
        Error::CorruptObject {
            hash: hash.to_string(),
            reason: reason.into(),
        }
    }

    pub(crate) fn malformed_ref(name: &str, reason: impl Into<String>) -> Self {
        Error::MalformedRef {
            name: name.to_string(),
            reason: reason.into(),
        }
    }
}

/// Length of a hex-encoded SHA-1 object id.
pub const HASH_LEN: usize = 40;

/// Check that `hash` is a full 40-character hex object id.
pub fn is_valid_hash(hash: &str) -> bool {
    hash.len() == HASH_LEN && hash.bytes().all(|b| b.is_ascii_hexdigit())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_valid_hash() {
        assert!(is_valid_hash("abcdef0123456789abcdef0123456789abcdef01"));
        assert!(!is_valid_hash("abcdef"));
        assert!(!is_valid_hash("zzcdef0123456789abcdef0123456789abcdef01"));
        assert!(!is_valid_hash("ref: refs/heads/master"));
    }

    #[test]
    fn test_not_a_repository_message() {
        assert_eq!(Error::NotARepository.to_string(), "Not inside a Git repository");
    }
}
