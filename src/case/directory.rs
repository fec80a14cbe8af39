//! Directory-backed data source.
//!
//! Treats a directory tree (an exported or mounted image) as the data
//! source. File ids are 1-based positions in a sorted walk, so they stay
//! stable across runs against the same tree.

use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};
use walkdir::{DirEntry, WalkDir};

use super::{DataSource, FileEntry};

pub struct DirectoryDataSource {
    root: PathBuf,
    name: String,
}

impl DirectoryDataSource {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        let root = root.as_ref().to_path_buf();
        let name = root
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| root.display().to_string());
        Self { root, name }
    }

    /// Host path of a file inside this data source.
    pub fn host_path(&self, file: &FileEntry) -> PathBuf {
        self.root
            .join(file.parent_path.trim_start_matches('/'))
            .join(&file.name)
    }
}

impl DataSource for DirectoryDataSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn find_files(&self, file_name: &str) -> std::io::Result<Vec<FileEntry>> {
        // An unreadable root is fatal; anything below it is skipped.
        std::fs::read_dir(&self.root)?;

        let walker = WalkDir::new(&self.root).min_depth(1).sort_by_file_name();
        Ok(matching_entries(&self.root, walker, file_name))
    }

    fn open(&self, file: &FileEntry) -> std::io::Result<Box<dyn Read + '_>> {
        Ok(Box::new(File::open(self.host_path(file))?))
    }
}

/// Files named `file_name` among `entries`, ids by walk position.
///
/// Entries the walk could not read are logged and skipped.
fn matching_entries<I, E>(root: &Path, entries: I, file_name: &str) -> Vec<FileEntry>
where
    I: IntoIterator<Item = Result<DirEntry, E>>,
    E: std::fmt::Display,
{
    let mut found = Vec::new();

    for (index, entry) in entries.into_iter().enumerate() {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn!("Skipping unreadable entry under {}: {}", root.display(), e);
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }
        let name = entry.file_name().to_string_lossy();
        if !name.eq_ignore_ascii_case(file_name) {
            continue;
        }

        let parent = entry
            .path()
            .parent()
            .and_then(|p| p.strip_prefix(root).ok())
            .map(|p| {
                let components: Vec<String> = p
                    .components()
                    .map(|c| c.as_os_str().to_string_lossy().into_owned())
                    .collect();
                format!("/{}", components.join("/"))
            })
            .unwrap_or_else(|| "/".to_string());

        debug!("Found candidate: {}/{}", parent, name);
        found.push(FileEntry {
            id: index as i64 + 1,
            name: name.into_owned(),
            parent_path: parent,
        });
    }

    found
}
