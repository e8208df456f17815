//! Deterministic content fingerprinting for change detection.
//!
//! A fingerprint is the executor's sole signal that a step's target changed
//! since the last successful run. Files hash to the blake3 of their bytes; a
//! directory hashes to the blake3 of a sorted per-file digest listing, so the
//! result is independent of traversal order and stable across platforms.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

use super::ignore::IgnoreList;

/// The fingerprint target could not be read.
///
/// Fatal for the step that requested the fingerprint; the executor never runs
/// a command against a target it could not hash.
#[derive(Debug, Error)]
#[error("failed to fingerprint {path}")]
pub struct FingerprintError {
    pub path: PathBuf,
    #[source]
    pub source: io::Error,
}

impl FingerprintError {
    fn new(path: &Path, source: io::Error) -> Self {
        Self {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Compute the content fingerprint of a file or directory tree.
///
/// # Algorithm
/// - Regular file: hex blake3 of its raw bytes.
/// - Directory: enumerate files recursively, drop any whose slash-separated
///   path relative to `path` matches an ignore prefix, emit one line
///   `"<hex blake3>  <relative path>"` per kept file, sort the lines
///   lexicographically, and hash the newline-joined listing.
///
/// Ignore filtering happens during traversal, so ignored content is never
/// read. Symlinks are not followed and produce an error.
pub fn fingerprint(path: &Path, ignore: &IgnoreList) -> Result<String, FingerprintError> {
    let meta = fs::metadata(path).map_err(|source| FingerprintError::new(path, source))?;
    if meta.is_dir() {
        fingerprint_dir(path, ignore)
    } else {
        hash_file(path)
    }
}

fn fingerprint_dir(root: &Path, ignore: &IgnoreList) -> Result<String, FingerprintError> {
    let mut lines = Vec::new();
    collect_file_lines(root, root, ignore, &mut lines)?;
    lines.sort();
    Ok(blake3::hash(lines.join("\n").as_bytes())
        .to_hex()
        .to_string())
}

fn collect_file_lines(
    root: &Path,
    dir: &Path,
    ignore: &IgnoreList,
    lines: &mut Vec<String>,
) -> Result<(), FingerprintError> {
    let entries = fs::read_dir(dir).map_err(|source| FingerprintError::new(dir, source))?;
    for entry in entries {
        let entry = entry.map_err(|source| FingerprintError::new(dir, source))?;
        let path = entry.path();
        let relative = relative_path(root, &path);
        if ignore.matches(&relative) {
            continue;
        }

        let ty = entry
            .file_type()
            .map_err(|source| FingerprintError::new(&path, source))?;
        if ty.is_dir() {
            collect_file_lines(root, &path, ignore, lines)?;
        } else if ty.is_file() {
            lines.push(format!("{}  {}", hash_file(&path)?, relative));
        } else {
            return Err(FingerprintError::new(
                &path,
                io::Error::new(io::ErrorKind::Unsupported, "symlinks are not supported"),
            ));
        }
    }
    Ok(())
}

fn hash_file(path: &Path) -> Result<String, FingerprintError> {
    let bytes = fs::read(path).map_err(|source| FingerprintError::new(path, source))?;
    Ok(blake3::hash(&bytes).to_hex().to_string())
}

/// Relative path with `/` separators regardless of platform, so fingerprints
/// agree across operating systems.
fn relative_path(root: &Path, path: &Path) -> String {
    let relative = path.strip_prefix(root).unwrap_or(path);
    relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect::<Vec<_>>()
        .join("/")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write_file(path: &Path, content: &str) {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("create_dir_all should succeed in test temp dirs");
        }
        fs::write(path, content).expect("write should succeed in test temp dirs");
    }

    fn no_ignores() -> IgnoreList {
        IgnoreList::default()
    }

    #[test]
    fn file_fingerprint_is_content_hash() {
        let tmp = TempDir::new().expect("tempdir should succeed");
        let file = tmp.path().join("values.yaml");
        write_file(&file, "replicas: 3");

        let sha = fingerprint(&file, &no_ignores()).expect("fingerprint should succeed");
        assert_eq!(sha, blake3::hash(b"replicas: 3").to_hex().to_string());
    }

    #[test]
    fn directory_fingerprint_is_deterministic() {
        let tmp = TempDir::new().expect("tempdir should succeed");
        write_file(&tmp.path().join("a.tf"), "module a");
        write_file(&tmp.path().join("nested").join("b.tf"), "module b");

        let first = fingerprint(tmp.path(), &no_ignores()).expect("fingerprint should succeed");
        let second = fingerprint(tmp.path(), &no_ignores()).expect("fingerprint should succeed");
        assert_eq!(first, second);
        assert_eq!(first.len(), 64);
    }

    #[test]
    fn directory_fingerprint_independent_of_creation_order() {
        let tmp1 = TempDir::new().expect("tempdir should succeed");
        write_file(&tmp1.path().join("a.tf"), "content a");
        write_file(&tmp1.path().join("b.tf"), "content b");

        let tmp2 = TempDir::new().expect("tempdir should succeed");
        write_file(&tmp2.path().join("b.tf"), "content b");
        write_file(&tmp2.path().join("a.tf"), "content a");

        let sha1 = fingerprint(tmp1.path(), &no_ignores()).expect("fingerprint should succeed");
        let sha2 = fingerprint(tmp2.path(), &no_ignores()).expect("fingerprint should succeed");
        assert_eq!(sha1, sha2);
    }

    #[test]
    fn mutating_a_file_changes_the_fingerprint() {
        let tmp = TempDir::new().expect("tempdir should succeed");
        write_file(&tmp.path().join("main.tf"), "original");
        let before = fingerprint(tmp.path(), &no_ignores()).expect("fingerprint should succeed");

        write_file(&tmp.path().join("main.tf"), "modified");
        let after = fingerprint(tmp.path(), &no_ignores()).expect("fingerprint should succeed");
        assert_ne!(before, after);
    }

    #[test]
    fn renaming_a_file_changes_the_fingerprint() {
        let tmp = TempDir::new().expect("tempdir should succeed");
        write_file(&tmp.path().join("a.tf"), "content");
        let before = fingerprint(tmp.path(), &no_ignores()).expect("fingerprint should succeed");

        fs::remove_file(tmp.path().join("a.tf")).expect("remove should succeed");
        write_file(&tmp.path().join("b.tf"), "content");
        let after = fingerprint(tmp.path(), &no_ignores()).expect("fingerprint should succeed");
        assert_ne!(before, after);
    }

    #[test]
    fn ignored_files_do_not_influence_the_fingerprint() {
        let ignore = IgnoreList::new(vec!["terraform/.terraform".to_string()]);

        let tmp = TempDir::new().expect("tempdir should succeed");
        write_file(&tmp.path().join("terraform").join("main.tf"), "module");
        let before = fingerprint(tmp.path(), &ignore).expect("fingerprint should succeed");

        write_file(
            &tmp.path()
                .join("terraform")
                .join(".terraform")
                .join("plugins.lock"),
            "cache state",
        );
        let after = fingerprint(tmp.path(), &ignore).expect("fingerprint should succeed");
        assert_eq!(before, after, "ignored cache churn must not change the sha");

        write_file(&tmp.path().join("terraform").join("main.tf"), "module v2");
        let changed = fingerprint(tmp.path(), &ignore).expect("fingerprint should succeed");
        assert_ne!(after, changed);
    }

    #[test]
    fn nonexistent_target_fails() {
        let tmp = TempDir::new().expect("tempdir should succeed");
        let err = fingerprint(&tmp.path().join("missing"), &no_ignores())
            .expect_err("fingerprint should fail");
        assert_eq!(err.path, tmp.path().join("missing"));
    }
}
