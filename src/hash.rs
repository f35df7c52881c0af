//! BLAKE3 hashing of source trees and target roots

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use blake3::Hasher;
use walkdir::WalkDir;

use crate::error::{Result, read_failed};

/// Hash prefix for BLAKE3 hashes
pub const HASH_PREFIX: &str = "blake3:";

/// Top-level directories of a source tree that make up installable content
const CONTENT_DIRS: &[&str] = &["skills", "agents", "hooks", "plugins"];

/// Hash the installable content of a source root.
///
/// Only `skills/`, `agents/`, `hooks/` and `plugins/` count, so a checkout's
/// `.git` directory or README edits do not look like content updates. Paths
/// and contents both feed the hash, so renames change it too. A missing
/// directory hashes like an empty one.
pub fn hash_source(root: &Path) -> Result<String> {
    let mut hasher = Hasher::new();
    for dir in CONTENT_DIRS {
        update_tree(&mut hasher, root, &root.join(dir))?;
    }
    Ok(format!("{}{}", HASH_PREFIX, hasher.finalize().to_hex()))
}

fn update_tree(hasher: &mut Hasher, base: &Path, path: &Path) -> Result<()> {
    if !path.exists() {
        return Ok(());
    }

    let mut files: Vec<_> = WalkDir::new(path)
        .into_iter()
        .filter_map(std::result::Result::ok)
        .filter(|e| e.file_type().is_file())
        .map(walkdir::DirEntry::into_path)
        .collect();
    files.sort();

    for file_path in files {
        let relative_path = file_path.strip_prefix(base).unwrap_or(&file_path);
        hasher.update(relative_path.to_string_lossy().as_bytes());
        hasher.update(b"\0");
        hash_contents(hasher, &file_path)?;
        hasher.update(b"\0");
    }
    Ok(())
}

fn hash_contents(hasher: &mut Hasher, path: &Path) -> Result<()> {
    let file = File::open(path).map_err(|e| read_failed(path, e))?;
    let mut reader = BufReader::new(file);
    let mut buffer = [0u8; 8192];

    loop {
        let bytes_read = reader.read(&mut buffer).map_err(|e| read_failed(path, e))?;
        if bytes_read == 0 {
            break;
        }
        hasher.update(&buffer[..bytes_read]);
    }
    Ok(())
}
