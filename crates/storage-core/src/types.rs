//! Core type definitions for the storage adapter

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unix epoch seconds as reported by the remote filesystem
pub type EpochSeconds = i64;

/// Kind of a remote directory entry
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    /// Regular file
    File,

    /// Directory
    Directory,
}

impl fmt::Display for EntryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntryKind::File => f.write_str("file"),
            EntryKind::Directory => f.write_str("directory"),
        }
    }
}

/// Snapshot of a remote entry returned by a stat call
///
/// The remote filesystem does not record creation time, so there is no
/// `created` field.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RemoteEntry {
    /// Absolute remote path
    pub path: String,

    /// File or directory
    pub kind: EntryKind,

    /// Size in bytes (0 for directories)
    pub size: u64,

    /// Last modification time
    pub last_modified: EpochSeconds,

    /// Last access time
    pub last_accessed: EpochSeconds,
}

impl RemoteEntry {
    pub fn is_dir(&self) -> bool {
        self.kind == EntryKind::Directory
    }

    pub fn is_file(&self) -> bool {
        self.kind == EntryKind::File
    }

    /// Final path component
    pub fn name(&self) -> &str {
        let trimmed = self.path.trim_end_matches('/');
        trimmed.rsplit('/').next().unwrap_or(trimmed)
    }
}

/// Mode used when opening a stored file
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub enum OpenMode {
    /// Read from the start of the file
    #[default]
    Read,

    /// Truncate and write
    Write,

    /// Write at the end of the file
    Append,
}

impl OpenMode {
    /// Python-style mode string (`rb`, `wb`, `ab`)
    pub fn as_str(&self) -> &'static str {
        match self {
            OpenMode::Read => "rb",
            OpenMode::Write => "wb",
            OpenMode::Append => "ab",
        }
    }
}

/// Children of a directory, partitioned by kind
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct DirListing {
    /// Names of child directories
    pub directories: Vec<String>,

    /// Names of child files
    pub files: Vec<String>,
}

impl DirListing {
    pub fn is_empty(&self) -> bool {
        self.directories.is_empty() && self.files.is_empty()
    }

    pub fn len(&self) -> usize {
        self.directories.len() + self.files.len()
    }
}
