//! Host-backed `FileSystem`: a thin wrapper over `std::fs`.

use std::path::Path;

use globset::Glob;

use crate::{FileKind, FileStat, FileSystem, FsError, FsResult};

#[derive(Debug, Default)]
pub struct HostFileSystem;

impl HostFileSystem {
    pub fn new() -> Self {
        Self
    }
}

fn io_err(path: &str, err: std::io::Error) -> FsError {
    FsError { path: path.to_string(), message: err.to_string() }
}

fn walk_dir(dir: &Path, out: &mut Vec<String>) -> std::io::Result<()> {
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        if path.is_dir() {
            walk_dir(&path, out)?;
        } else {
            out.push(path.to_string_lossy().into_owned());
        }
    }
    Ok(())
}

impl FileSystem for HostFileSystem {
    fn read_file(&self, path: &str) -> FsResult<String> {
        std::fs::read_to_string(path).map_err(|e| io_err(path, e))
    }

    fn write_file(&mut self, path: &str, contents: &str) -> FsResult<()> {
        std::fs::write(path, contents).map_err(|e| io_err(path, e))
    }

    fn exists(&self, path: &str) -> bool {
        Path::new(path).exists()
    }

    fn stat(&self, path: &str) -> FsResult<FileStat> {
        let meta = std::fs::metadata(path).map_err(|e| io_err(path, e))?;
        let kind = if meta.is_dir() { FileKind::Directory } else { FileKind::File };
        Ok(FileStat { kind, len: meta.len() })
    }

    fn read_directory(&self, path: &str) -> FsResult<Vec<String>> {
        let entries = std::fs::read_dir(path).map_err(|e| io_err(path, e))?;
        let mut names = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| io_err(path, e))?;
            names.push(entry.file_name().to_string_lossy().into_owned());
        }
        names.sort();
        Ok(names)
    }

    fn expand_glob(&self, pattern: &str) -> FsResult<Vec<String>> {
        let matcher = Glob::new(pattern)
            .map_err(|e| FsError { path: pattern.to_string(), message: e.to_string() })?
            .compile_matcher();
        let mut candidates = Vec::new();
        walk_dir(Path::new("."), &mut candidates).map_err(|e| io_err(".", e))?;
        let mut matched: Vec<String> = candidates
            .into_iter()
            .map(|p| p.trim_start_matches("./").to_string())
            .filter(|p| matcher.is_match(p))
            .collect();
        matched.sort();
        Ok(matched)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn write_then_read_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.kcl");
        let path = path.to_str().unwrap();
        let mut fs = HostFileSystem::new();
        fs.write_file(path, "let x = 1").unwrap();
        assert_eq!(fs.read_file(path).unwrap(), "let x = 1");
        assert!(fs.exists(path));
    }

    #[test]
    fn stat_distinguishes_files_from_directories() {
        let dir = tempfile::tempdir().unwrap();
        let file_path = dir.path().join("a.kcl");
        std::fs::write(&file_path, "x").unwrap();
        let fs = HostFileSystem::new();
        assert_eq!(fs.stat(file_path.to_str().unwrap()).unwrap().kind, FileKind::File);
        assert_eq!(fs.stat(dir.path().to_str().unwrap()).unwrap().kind, FileKind::Directory);
    }

    #[test]
    fn read_directory_lists_entry_names_sorted() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("b.kcl"), "").unwrap();
        std::fs::write(dir.path().join("a.kcl"), "").unwrap();
        let fs = HostFileSystem::new();
        assert_eq!(fs.read_directory(dir.path().to_str().unwrap()).unwrap(), vec!["a.kcl", "b.kcl"]);
    }

    #[test]
    fn reading_a_missing_file_reports_the_path() {
        let fs = HostFileSystem::new();
        let err = fs.read_file("/no/such/file.kcl").unwrap_err();
        assert_eq!(err.path, "/no/such/file.kcl");
    }
}
