//! Abstractions for filesystem access used by the log writer.
//!
//! The `LogFileSystem` trait allows the writer and the startup archival to
//! run against a real log directory or a scripted implementation in tests.

use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use zip::ZipWriter;
use zip::write::SimpleFileOptions;

/// Filesystem operations the log writer needs.
pub trait LogFileSystem: Send {
    /// Creates the directory and its parents if they do not exist.
    fn ensure_dir(&self, path: &Path) -> io::Result<()>;

    /// Lists regular files directly under `path` whose extension is `ext`.
    fn files_with_extension(&self, path: &Path, ext: &str) -> io::Result<Vec<PathBuf>>;

    /// Checks if a path exists.
    fn exists(&self, path: &Path) -> bool;

    /// Moves a file.
    fn rename(&self, from: &Path, to: &Path) -> io::Result<()>;

    /// Deletes a directory and everything under it.
    fn remove_dir_all(&self, path: &Path) -> io::Result<()>;

    /// Appends `line` plus a newline to `path`, creating the file if needed.
    fn append_line(&self, path: &Path, line: &str) -> io::Result<()>;

    /// Creation time of `path`.
    ///
    /// Falls back to the modification time on filesystems that do not
    /// record a birth time.
    fn created(&self, path: &Path) -> io::Result<SystemTime>;

    /// Bundles the regular files under `dir` into a zip archive at
    /// `archive`. Entries are named after the files, without directories.
    fn zip_dir(&self, dir: &Path, archive: &Path) -> io::Result<()>;
}

/// Real filesystem implementation backed by `std::fs` and the `zip` crate.
#[derive(Debug, Default, Clone, Copy)]
pub struct RealFs;

impl RealFs {
    pub fn new() -> Self {
        Self
    }
}

impl LogFileSystem for RealFs {
    fn ensure_dir(&self, path: &Path) -> io::Result<()> {
        fs::create_dir_all(path)
    }

    fn files_with_extension(&self, path: &Path, ext: &str) -> io::Result<Vec<PathBuf>> {
        let mut files = Vec::new();
        for entry in fs::read_dir(path)? {
            let entry = entry?.path();
            if entry.is_file() && entry.extension().is_some_and(|e| e == ext) {
                files.push(entry);
            }
        }
        files.sort();
        Ok(files)
    }

    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn rename(&self, from: &Path, to: &Path) -> io::Result<()> {
        fs::rename(from, to)
    }

    fn remove_dir_all(&self, path: &Path) -> io::Result<()> {
        fs::remove_dir_all(path)
    }

    fn append_line(&self, path: &Path, line: &str) -> io::Result<()> {
        let mut file = OpenOptions::new().create(true).append(true).open(path)?;
        writeln!(file, "{line}")
    }

    fn created(&self, path: &Path) -> io::Result<SystemTime> {
        let metadata = fs::metadata(path)?;
        metadata.created().or_else(|_| metadata.modified())
    }

    fn zip_dir(&self, dir: &Path, archive: &Path) -> io::Result<()> {
        let mut files = Vec::new();
        for entry in fs::read_dir(dir)? {
            let entry = entry?.path();
            if entry.is_file() {
                files.push(entry);
            }
        }
        files.sort();

        let mut zip = ZipWriter::new(File::create(archive)?);
        let options = SimpleFileOptions::default();
        for path in files {
            let Some(name) = path.file_name() else { continue };
            zip.start_file(name.to_string_lossy(), options)
                .map_err(io::Error::other)?;
            zip.write_all(&fs::read(&path)?)?;
        }
        zip.finish().map_err(io::Error::other)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn append_line_creates_and_appends() {
        let dir = tempfile::tempdir().unwrap();
        let fs = RealFs::new();
        let path = dir.path().join("out.log");

        fs.append_line(&path, "first").unwrap();
        fs.append_line(&path, "second").unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content, "first\nsecond\n");
    }

    #[test]
    fn files_with_extension_filters_and_sorts() {
        let dir = tempfile::tempdir().unwrap();
        let fs = RealFs::new();
        std::fs::write(dir.path().join("b.log"), "b").unwrap();
        std::fs::write(dir.path().join("a.log"), "a").unwrap();
        std::fs::write(dir.path().join("c.zip"), "c").unwrap();
        std::fs::create_dir(dir.path().join("sub.log")).unwrap();

        let files = fs.files_with_extension(dir.path(), "log").unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["a.log", "b.log"]);
    }

    #[test]
    fn created_returns_a_time_for_fresh_files() {
        let dir = tempfile::tempdir().unwrap();
        let fs = RealFs::new();
        let path = dir.path().join("x.log");
        std::fs::write(&path, "x").unwrap();

        let created = fs.created(&path).unwrap();
        assert!(created <= SystemTime::now());
    }

    #[test]
    fn zip_dir_bundles_all_files() {
        let dir = tempfile::tempdir().unwrap();
        let fs = RealFs::new();
        let src = dir.path().join("temp");
        std::fs::create_dir(&src).unwrap();
        std::fs::write(src.join("one.log"), "one").unwrap();
        std::fs::write(src.join("two.log"), "two").unwrap();

        let archive = dir.path().join("bundle.zip");
        fs.zip_dir(&src, &archive).unwrap();

        let mut zip = zip::ZipArchive::new(File::open(&archive).unwrap()).unwrap();
        assert_eq!(zip.len(), 2);
        let mut names: Vec<String> = (0..zip.len())
            .map(|i| zip.by_index(i).unwrap().name().to_string())
            .collect();
        names.sort();
        assert_eq!(names, vec!["one.log", "two.log"]);
    }
}
