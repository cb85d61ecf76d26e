//! File discovery and traversal

use crate::analyze::{ClassBlob, InputFailure, InputFailureKind};
use ignore::WalkBuilder;
use std::path::{Path, PathBuf};

/// Finds all compiled class files under the given root directory.
/// Respects .gitignore rules automatically; results are sorted so every
/// run sees the same input order.
pub fn find_class_files(root: &Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = WalkBuilder::new(root)
        .hidden(false)
        .git_ignore(true)
        .build()
        .filter_map(Result::ok)
        .filter(|entry| entry.file_type().is_some_and(|ft| ft.is_file()))
        .map(|entry| entry.into_path())
        .filter(|path| path.extension().is_some_and(|ext| ext == "class"))
        .collect();
    files.sort();
    files
}

/// Reads discovered files into `(identifier, bytes)` blobs. Unreadable
/// files are tagged as resource failures; the rest of the batch loads.
pub fn load_class_files(paths: &[PathBuf]) -> (Vec<ClassBlob>, Vec<InputFailure>) {
    let mut blobs = Vec::with_capacity(paths.len());
    let mut failures = Vec::new();
    for path in paths {
        let id = path.display().to_string();
        match std::fs::read(path) {
            Ok(bytes) => blobs.push(ClassBlob { id, bytes }),
            Err(err) => failures.push(InputFailure {
                id,
                kind: InputFailureKind::Resource,
                message: err.to_string(),
            }),
        }
    }
    (blobs, failures)
}
