use flate2::read::ZlibDecoder;
use std::collections::HashSet;
use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::str;
use tracing::debug;

use crate::error::{is_valid_hash, Error, Result};
use crate::graph::ParentSource;

const PARENT_PREFIX: &[u8] = b"parent ";

/// Read-only view of the loose objects under `.git/objects`.
#[derive(Debug, Clone)]
pub struct LooseObjectStore {
    objects_dir: PathBuf,
}

impl LooseObjectStore {
    pub fn new<P: AsRef<Path>>(objects_dir: P) -> Self {
        Self {
            objects_dir: objects_dir.as_ref().to_path_buf(),
        }
    }

    /// Parent hashes of the commit `object_id`.
    pub fn commit_parents(&self, object_id: &str) -> Result<HashSet<String>> {
        let (object_type, data) = read_object(&self.objects_dir, object_id)?;
        if object_type != "commit" {
            return Err(Error::corrupt(
                object_id,
                format!("expected a commit, found a {}", object_type),
            ));
        }

        let parents = parse_parents(object_id, &data)?;
        debug!(commit = %object_id, parents = parents.len(), "read commit");
        Ok(parents)
    }
}

impl ParentSource for LooseObjectStore {
    fn parents(&self, hash: &str) -> Result<HashSet<String>> {
        self.commit_parents(hash)
    }
}

/// Location of a loose object: `<objects>/<first 2 hex>/<remaining 38 hex>`.
pub fn object_path<P: AsRef<Path>>(objects_dir: P, object_id: &str) -> PathBuf {
    let (dir_name, file_name) = object_id.split_at(2);
    objects_dir.as_ref().join(dir_name).join(file_name)
}

/// Read a raw git object (header + data) from the object store.
fn read_raw_git_object(objects_dir: &Path, object_id: &str) -> Result<Vec<u8>> {
    if !is_valid_hash(object_id) {
        return Err(Error::corrupt(object_id, "not a 40-character hex object id"));
    }

    let object_path = object_path(objects_dir, object_id);
    let compressed = match fs::read(&object_path) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            return Err(Error::ObjectNotFound {
                hash: object_id.to_string(),
                path: object_path,
            })
        }
        Err(e) => return Err(e.into()),
    };

    let mut decoder = ZlibDecoder::new(&compressed[..]);
    let mut decompressed = Vec::new();
    decoder
        .read_to_end(&mut decompressed)
        .map_err(|e| Error::corrupt(object_id, format!("decompression failed: {}", e)))?;
    Ok(decompressed)
}

/// Read an object from the object store and parse its `<type> <size>\0` header.
pub fn read_object<P: AsRef<Path>>(objects_dir: P, object_id: &str) -> Result<(String, Vec<u8>)> {
    let decompressed = read_raw_git_object(objects_dir.as_ref(), object_id)?;

    let null_pos = decompressed
        .iter()
        .position(|&b| b == 0)
        .ok_or_else(|| Error::corrupt(object_id, "no null byte after header"))?;

    let header = str::from_utf8(&decompressed[..null_pos])
        .map_err(|_| Error::corrupt(object_id, "header is not valid UTF-8"))?;
    let (object_type, size) = header
        .split_once(' ')
        .ok_or_else(|| Error::corrupt(object_id, format!("invalid header '{}'", header)))?;
    let size: usize = size
        .parse()
        .map_err(|_| Error::corrupt(object_id, format!("invalid object size '{}'", size)))?;

    let data = decompressed[null_pos + 1..].to_vec();
    if data.len() != size {
        return Err(Error::corrupt(
            object_id,
            format!("header says {} bytes but data is {} bytes", size, data.len()),
        ));
    }

    Ok((object_type.to_string(), data))
}

/// Collect `parent <hash>` lines from a commit's header block.
///
/// Scanning stops at the first blank line, so the commit message is never
/// consulted. Repeated parent lines collapse into a single parent.
pub fn parse_parents(object_id: &str, data: &[u8]) -> Result<HashSet<String>> {
    let mut parents = HashSet::new();

    for line in data.split(|&b| b == b'\n') {
        if line.is_empty() {
            break;
        }

        if let Some(rest) = line.strip_prefix(PARENT_PREFIX) {
            let parent = str::from_utf8(rest)
                .ok()
                .map(str::trim_end)
                .filter(|parent| is_valid_hash(parent))
                .ok_or_else(|| {
                    Error::corrupt(
                        object_id,
                        format!("invalid parent line '{}'", String::from_utf8_lossy(line)),
                    )
                })?;
            parents.insert(parent.to_string());
        }
    }

    Ok(parents)
}
