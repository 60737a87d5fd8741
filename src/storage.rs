//! Filesystem layer: path sanitization and directory preparation.
//!
//! Artifact paths are derived from human-readable suite, browser, and spec
//! names, so every segment passes through [`sanitize_segment`] before it
//! touches the filesystem. Directory creation is synthesized segment by
//! segment because the layout is built incrementally across events and must
//! tolerate whatever prefix a previous spec already created.

use std::io;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tokio::fs;

/// Map an arbitrary display name to a single legal path segment.
///
/// Every character that is forbidden in a folder name on at least one
/// common filesystem (whitespace, `\`, `/`, `:`, `*`, `?`, `"`, `<`, `>`,
/// `|`, `.`) becomes exactly one underscore. Total: never fails, never
/// collapses neighbors.
pub fn sanitize_segment(text: &str) -> String {
    text.chars()
        .map(|c| if is_reserved(c) { '_' } else { c })
        .collect()
}

fn is_reserved(c: char) -> bool {
    c.is_whitespace() || matches!(c, '\\' | '/' | ':' | '*' | '?' | '"' | '<' | '>' | '|' | '.')
}

/// Create `path` and every missing ancestor, one component at a time.
///
/// Pre-existing directories along the way are fine; a pre-existing
/// non-directory entry fails with an error naming the collision. Idempotent:
/// a second call on the same path is a no-op.
pub async fn ensure_directory(path: &Path) -> io::Result<()> {
    let mut prefix = PathBuf::new();
    for component in path.components() {
        prefix.push(component);
        match fs::create_dir(&prefix).await {
            Ok(()) => {}
            Err(err) if err.kind() == ErrorKind::AlreadyExists => {
                let meta = fs::metadata(&prefix).await?;
                if !meta.is_dir() {
                    return Err(io::Error::other(format!(
                        "path collision: expected directory at {}",
                        prefix.display()
                    )));
                }
            }
            Err(err) => return Err(err),
        }
    }
    Ok(())
}

/// Make the destination root ready for a run.
///
/// With `clean` set, any previous contents are removed first; a missing
/// root is not an error. The root itself always exists afterwards.
pub async fn prepare_destination(dest: &Path, clean: bool) -> io::Result<()> {
    if clean {
        match fs::remove_dir_all(dest).await {
            Ok(()) => {}
            Err(err) if err.kind() == ErrorKind::NotFound => {}
            Err(err) => return Err(err),
        }
    }
    ensure_directory(dest).await
}
