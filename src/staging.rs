//! Staging of candidate files to scratch space, and SQLite header sniffing.

use std::fs::File;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use tracing::{debug, warn};
use uuid::Uuid;

use crate::case::{DataSource, FileEntry};
use crate::error::StagingError;

/// The first 15 bytes of every SQLite 3 database file.
pub const SQLITE_HEADER: &[u8; 15] = b"SQLite format 3";

/// Per-run scratch directory, `<base>/<job id>`. Removed with its contents
/// on drop.
#[derive(Debug)]
pub struct ScratchDir {
    path: PathBuf,
}

impl ScratchDir {
    pub fn for_job(base: &Path, job_id: Uuid) -> Self {
        Self {
            path: base.join(job_id.to_string()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for ScratchDir {
    fn drop(&mut self) {
        match std::fs::remove_dir_all(&self.path) {
            Ok(()) => debug!("Removed scratch directory {}", self.path.display()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => warn!(
                "Failed to remove scratch directory {}: {}",
                self.path.display(),
                e
            ),
        }
    }
}

/// A staged copy of a data source file. Deleted on drop.
#[derive(Debug)]
pub struct ScratchFile {
    path: PathBuf,
}

impl ScratchFile {
    /// Copy `file` out of `source` into `<scratch_dir>/<file id>.db`.
    pub fn stage(
        source: &dyn DataSource,
        file: &FileEntry,
        scratch_dir: &Path,
    ) -> Result<Self, StagingError> {
        std::fs::create_dir_all(scratch_dir).map_err(|source| StagingError::CreateDirectory {
            path: scratch_dir.to_path_buf(),
            source,
        })?;

        let mut reader = source.open(file).map_err(|source| StagingError::Read {
            name: file.name.clone(),
            source,
        })?;

        let path = scratch_dir.join(format!("{}.db", file.id));
        let mut out = File::create(&path).map_err(|source| StagingError::Write {
            path: path.clone(),
            source,
        })?;
        // From here on the guard owns the path, so every exit removes it.
        let staged = Self { path };

        io::copy(&mut reader, &mut out).map_err(|source| StagingError::Write {
            path: staged.path.clone(),
            source,
        })?;
        out.sync_all().map_err(|source| StagingError::Write {
            path: staged.path.clone(),
            source,
        })?;

        debug!("Staged {} to {}", file.unique_path(), staged.path.display());
        Ok(staged)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn has_sqlite_header(&self) -> io::Result<bool> {
        has_sqlite_header(&self.path)
    }
}

impl Drop for ScratchFile {
    fn drop(&mut self) {
        match std::fs::remove_file(&self.path) {
            Ok(()) => debug!("Removed scratch file {}", self.path.display()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => warn!("Failed to remove scratch file {}: {}", self.path.display(), e),
        }
    }
}

/// True when the file starts with exactly `SQLite format 3`.
///
/// Files shorter than the header are simply not SQLite.
pub fn has_sqlite_header(path: &Path) -> io::Result<bool> {
    let mut header = [0u8; 15];
    let mut file = File::open(path)?;
    match file.read_exact(&mut header) {
        Ok(()) => Ok(&header == SQLITE_HEADER),
        Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => Ok(false),
        Err(e) => Err(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::case::DirectoryDataSource;

    fn source_with(content: &[u8]) -> (tempfile::TempDir, DirectoryDataSource, FileEntry) {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("proton.db"), content).unwrap();
        let source = DirectoryDataSource::new(dir.path());
        let file = source.find_files("proton.db").unwrap().remove(0);
        (dir, source, file)
    }

    #[test]
    fn test_header_sniff() {
        let dir = tempfile::tempdir().unwrap();

        let good = dir.path().join("good");
        std::fs::write(&good, b"SQLite format 3\0rest of page").unwrap();
        assert!(has_sqlite_header(&good).unwrap());

        let bad = dir.path().join("bad");
        std::fs::write(&bad, b"SQLite format 2\0rest of page").unwrap();
        assert!(!has_sqlite_header(&bad).unwrap());

        let short = dir.path().join("short");
        std::fs::write(&short, b"SQLite").unwrap();
        assert!(!has_sqlite_header(&short).unwrap());

        let empty = dir.path().join("empty");
        std::fs::write(&empty, b"").unwrap();
        assert!(!has_sqlite_header(&empty).unwrap());
    }

    #[test]
    fn test_stage_names_file_by_id_and_removes_on_drop() {
        let (_dir, source, file) = source_with(b"SQLite format 3\0");
        let scratch = tempfile::tempdir().unwrap();

        let staged = ScratchFile::stage(&source, &file, scratch.path()).unwrap();
        let path = staged.path().to_path_buf();
        assert_eq!(path, scratch.path().join(format!("{}.db", file.id)));
        assert!(staged.has_sqlite_header().unwrap());
        assert!(path.exists());

        drop(staged);
        assert!(!path.exists());
    }

    #[test]
    fn test_rejected_file_is_still_cleaned_up() {
        let (_dir, source, file) = source_with(b"not a database at all");
        let scratch = tempfile::tempdir().unwrap();

        let path = {
            let staged = ScratchFile::stage(&source, &file, scratch.path()).unwrap();
            assert!(!staged.has_sqlite_header().unwrap());
            staged.path().to_path_buf()
        };
        assert!(!path.exists());
    }

    #[test]
    fn test_stage_missing_file_is_read_error() {
        let (dir, source, file) = source_with(b"SQLite format 3\0");
        std::fs::remove_file(dir.path().join("proton.db")).unwrap();
        let scratch = tempfile::tempdir().unwrap();

        let err = ScratchFile::stage(&source, &file, scratch.path()).unwrap_err();
        assert!(matches!(err, StagingError::Read { .. }));
        assert_eq!(std::fs::read_dir(scratch.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_scratch_dirs_are_per_job_and_removed_on_drop() {
        let (_dir, source, file) = source_with(b"SQLite format 3\0");
        let base = tempfile::tempdir().unwrap();

        let first = ScratchDir::for_job(base.path(), Uuid::new_v4());
        let second = ScratchDir::for_job(base.path(), Uuid::new_v4());
        assert_ne!(first.path(), second.path());

        let a = ScratchFile::stage(&source, &file, first.path()).unwrap();
        let b = ScratchFile::stage(&source, &file, second.path()).unwrap();
        assert_ne!(a.path(), b.path());

        drop(a);
        assert!(b.path().exists());
        drop(b);

        drop(first);
        drop(second);
        assert_eq!(std::fs::read_dir(base.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_unused_scratch_dir_drops_quietly() {
        let base = tempfile::tempdir().unwrap();
        let scratch = ScratchDir::for_job(base.path(), Uuid::new_v4());
        assert!(!scratch.path().exists());
        drop(scratch);
        assert_eq!(std::fs::read_dir(base.path()).unwrap().count(), 0);
    }
}
