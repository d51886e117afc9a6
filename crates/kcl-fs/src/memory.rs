//! In-memory `FileSystem`, backed by a plain path -> contents map. Used by
//! tests and by LSP callers that need to overlay unsaved buffer contents
//! without touching disk. Every path is normalised through [`crate::path`]
//! before lookup, so `file://` URIs, repeated `/`, and `.`/`..` all collapse
//! to the same key.

use std::collections::BTreeMap;

use globset::Glob;

use crate::path::normalize;
use crate::{FileKind, FileStat, FileSystem, FsError, FsResult};

#[derive(Debug, Default, Clone)]
pub struct InMemoryFileSystem {
    files: BTreeMap<String, String>,
}

impl InMemoryFileSystem {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_file(mut self, path: &str, contents: impl Into<String>) -> Self {
        self.files.insert(normalize(path), contents.into());
        self
    }
}

fn not_found(path: String) -> FsError {
    FsError { path: path.clone(), message: format!("no such file or directory: {path}") }
}

impl FileSystem for InMemoryFileSystem {
    fn read_file(&self, path: &str) -> FsResult<String> {
        let key = normalize(path);
        self.files.get(&key).cloned().ok_or_else(|| not_found(key))
    }

    fn write_file(&mut self, path: &str, contents: &str) -> FsResult<()> {
        self.files.insert(normalize(path), contents.to_string());
        Ok(())
    }

    fn exists(&self, path: &str) -> bool {
        let key = normalize(path);
        let prefix = format!("{key}/");
        self.files.contains_key(&key) || self.files.keys().any(|p| p.starts_with(&prefix))
    }

    fn stat(&self, path: &str) -> FsResult<FileStat> {
        let key = normalize(path);
        if let Some(contents) = self.files.get(&key) {
            return Ok(FileStat { kind: FileKind::File, len: contents.len() as u64 });
        }
        let prefix = format!("{key}/");
        if self.files.keys().any(|p| p.starts_with(&prefix)) {
            return Ok(FileStat { kind: FileKind::Directory, len: 0 });
        }
        Err(not_found(key))
    }

    fn read_directory(&self, path: &str) -> FsResult<Vec<String>> {
        let key = normalize(path);
        let prefix = format!("{key}/");
        let mut names: Vec<String> = self
            .files
            .keys()
            .filter_map(|p| p.strip_prefix(&prefix))
            .map(|rest| rest.split('/').next().unwrap_or(rest).to_string())
            .collect();
        names.sort();
        names.dedup();
        if names.is_empty() {
            return Err(not_found(key));
        }
        Ok(names)
    }

    fn expand_glob(&self, pattern: &str) -> FsResult<Vec<String>> {
        let matcher = Glob::new(pattern)
            .map_err(|e| FsError { path: pattern.to_string(), message: e.to_string() })?
            .compile_matcher();
        let mut matched: Vec<String> =
            self.files.keys().filter(|p| matcher.is_match(p.as_str())).cloned().collect();
        matched.sort();
        Ok(matched)
    }
}
