//! Local directory standing in for a distributed filesystem
//!
//! Remote absolute paths map onto a local directory tree, so the adapter can
//! run against a workstation or a test fixture without a cluster.
//! Uploads are atomic (write to .tmp, then rename).

use std::path::{Path, PathBuf};
use std::time::SystemTime;

use async_trait::async_trait;
use bytes::Bytes;
use storage_core::{path, EntryKind, Error, OpenMode, RemoteEntry, Result};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info, instrument};
use uuid::Uuid;

use crate::client::{ConnectionParams, DfsClient, DfsConnector, RemoteFile};

/// [`DfsClient`] over a local directory
#[derive(Debug, Clone)]
pub struct LocalDfs {
    /// Local directory that plays the role of the remote `/`
    base_path: PathBuf,
}

impl LocalDfs {
    /// Create a new LocalDfs instance
    ///
    /// # Arguments
    /// * `base_path` - Directory to use as the remote filesystem root
    pub fn new<P: AsRef<Path>>(base_path: P) -> Self {
        Self {
            base_path: base_path.as_ref().to_path_buf(),
        }
    }

    /// Get the base path
    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    /// Map a remote path onto the local tree
    ///
    /// Relative paths are taken from the remote root and `..` never climbs
    /// above it.
    fn resolve_path(&self, remote: &str) -> PathBuf {
        let normalized = path::normalize(&path::join(&["/", remote]));
        self.base_path.join(normalized.trim_start_matches('/'))
    }

    /// Generate a unique temporary file path next to `full_path`
    fn temp_path(full_path: &Path) -> PathBuf {
        let temp_name = format!(
            ".{}.{}.tmp",
            full_path.file_name().unwrap_or_default().to_string_lossy(),
            Uuid::new_v4()
        );
        full_path.with_file_name(temp_name)
    }

    fn map_err(operation: &str, remote: &str, e: std::io::Error) -> Error {
        if e.kind() == std::io::ErrorKind::NotFound {
            Error::RemotePathNotFound {
                path: remote.to_string(),
            }
        } else {
            Error::Remote {
                operation: operation.to_string(),
                path: remote.to_string(),
                message: e.to_string(),
            }
        }
    }
}

fn epoch_seconds(time: std::io::Result<SystemTime>) -> Option<i64> {
    let time = time.ok()?;
    match time.duration_since(SystemTime::UNIX_EPOCH) {
        Ok(after) => i64::try_from(after.as_secs()).ok(),
        Err(before) => i64::try_from(before.duration().as_secs()).ok().map(|s| -s),
    }
}

#[async_trait]
impl DfsClient for LocalDfs {
    #[instrument(skip(self), fields(client = "local"))]
    async fn open(&self, path: &str, mode: OpenMode) -> Result<Box<dyn RemoteFile>> {
        let full_path = self.resolve_path(path);
        debug!(?full_path, mode = mode.as_str(), "Opening file");

        let mut options = fs::OpenOptions::new();
        match mode {
            OpenMode::Read => options.read(true),
            OpenMode::Write => options.write(true).create(true).truncate(true),
            OpenMode::Append => options.append(true).create(true),
        };

        let file = options
            .open(&full_path)
            .await
            .map_err(|e| Self::map_err("open", path, e))?;
        Ok(Box::new(file))
    }

    #[instrument(skip(self, content), fields(client = "local", size = content.len()))]
    async fn upload(&self, path: &str, content: Bytes) -> Result<u64> {
        let full_path = self.resolve_path(path);
        let temp_path = Self::temp_path(&full_path);
        let size = content.len() as u64;

        debug!(?full_path, ?temp_path, size, "Uploading file atomically");

        if let Some(parent) = full_path.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| Self::map_err("upload", path, e))?;
        }

        let mut file = fs::File::create(&temp_path)
            .await
            .map_err(|e| Self::map_err("upload", path, e))?;

        file.write_all(&content)
            .await
            .map_err(|e| Self::map_err("upload", path, e))?;

        file.sync_all()
            .await
            .map_err(|e| Self::map_err("upload", path, e))?;

        fs::rename(&temp_path, &full_path)
            .await
            .map_err(|e| Self::map_err("upload", path, e))?;

        debug!(?full_path, size, "File uploaded");
        Ok(size)
    }

    #[instrument(skip(self), fields(client = "local"))]
    async fn mkdir(&self, path: &str) -> Result<()> {
        let full_path = self.resolve_path(path);
        fs::create_dir_all(&full_path)
            .await
            .map_err(|e| Self::map_err("mkdir", path, e))
    }

    #[instrument(skip(self), fields(client = "local"))]
    async fn exists(&self, path: &str) -> Result<bool> {
        let full_path = self.resolve_path(path);
        Ok(fs::metadata(&full_path).await.is_ok())
    }

    #[instrument(skip(self), fields(client = "local"))]
    async fn delete(&self, path: &str, recursive: bool) -> Result<()> {
        let full_path = self.resolve_path(path);
        debug!(?full_path, recursive, "Deleting");

        let metadata = fs::metadata(&full_path)
            .await
            .map_err(|e| Self::map_err("delete", path, e))?;

        let result = if !metadata.is_dir() {
            fs::remove_file(&full_path).await
        } else if recursive {
            fs::remove_dir_all(&full_path).await
        } else {
            fs::remove_dir(&full_path).await
        };
        result.map_err(|e| Self::map_err("delete", path, e))
    }

    #[instrument(skip(self), fields(client = "local"))]
    async fn ls(&self, path: &str) -> Result<Vec<String>> {
        let full_path = self.resolve_path(path);
        let parent = path::normalize(&path::join(&["/", path]));
        let mut results = Vec::new();

        let mut entries = fs::read_dir(&full_path)
            .await
            .map_err(|e| Self::map_err("ls", path, e))?;

        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| Self::map_err("ls", path, e))?
        {
            let name = entry.file_name().to_string_lossy().to_string();
            // In-flight uploads
            if name.starts_with('.') && name.ends_with(".tmp") {
                continue;
            }
            results.push(path::join(&[&parent, &name]));
        }

        results.sort();
        debug!(count = results.len(), "Listed directory");
        Ok(results)
    }

    #[instrument(skip(self), fields(client = "local"))]
    async fn info(&self, path: &str) -> Result<RemoteEntry> {
        let full_path = self.resolve_path(path);
        let metadata = fs::metadata(&full_path)
            .await
            .map_err(|e| Self::map_err("info", path, e))?;

        let kind = if metadata.is_dir() {
            EntryKind::Directory
        } else {
            EntryKind::File
        };
        let last_modified = epoch_seconds(metadata.modified()).unwrap_or_default();
        let last_accessed = epoch_seconds(metadata.accessed()).unwrap_or(last_modified);

        Ok(RemoteEntry {
            path: path::normalize(&path::join(&["/", path])),
            kind,
            size: if metadata.is_dir() { 0 } else { metadata.len() },
            last_modified,
            last_accessed,
        })
    }
}

/// Connects every request to the same local directory
#[derive(Debug, Clone)]
pub struct LocalConnector {
    base_path: PathBuf,
}

impl LocalConnector {
    pub fn new<P: AsRef<Path>>(base_path: P) -> Self {
        Self {
            base_path: base_path.as_ref().to_path_buf(),
        }
    }
}

#[async_trait]
impl DfsConnector for LocalConnector {
    type Client = LocalDfs;

    async fn connect(&self, params: &ConnectionParams) -> Result<LocalDfs> {
        fs::create_dir_all(&self.base_path).await?;
        info!(
            namenode = %params.namenode_uri(),
            user = %params.user,
            base_path = ?self.base_path,
            "Connected local filesystem client"
        );
        Ok(LocalDfs::new(&self.base_path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use storage_core::StorageOptions;
    use tempfile::TempDir;
    use std::time::Duration;
    use tokio::io::AsyncReadExt;

    async fn setup() -> (TempDir, LocalDfs) {
        let temp_dir = TempDir::new().unwrap();
        let client = LocalDfs::new(temp_dir.path());
        (temp_dir, client)
    }

    #[tokio::test]
    async fn test_upload_and_open() {
        let (_temp_dir, client) = setup().await;
        let data = Bytes::from("hello world");

        let written = client.upload("/media/test.txt", data.clone()).await.unwrap();
        assert_eq!(written, 11);

        let mut file = client.open("/media/test.txt", OpenMode::Read).await.unwrap();
        let mut buf = Vec::new();
        file.read_to_end(&mut buf).await.unwrap();
        assert_eq!(buf, data.to_vec());
    }

    #[tokio::test]
    async fn test_open_missing() {
        let (_temp_dir, client) = setup().await;

        let result = client.open("/media/missing.txt", OpenMode::Read).await;
        assert!(matches!(result, Err(Error::RemotePathNotFound { .. })));
    }

    #[tokio::test]
    async fn test_mkdir_and_exists() {
        let (_temp_dir, client) = setup().await;

        assert!(!client.exists("/media/a/b").await.unwrap());
        client.mkdir("/media/a/b").await.unwrap();
        assert!(client.exists("/media/a/b").await.unwrap());
        assert!(client.info("/media/a/b").await.unwrap().is_dir());
    }

    #[tokio::test]
    async fn test_delete() {
        let (_temp_dir, client) = setup().await;

        client.upload("/media/x.txt", Bytes::from("x")).await.unwrap();
        client.delete("/media/x.txt", false).await.unwrap();
        assert!(!client.exists("/media/x.txt").await.unwrap());

        let result = client.delete("/media/x.txt", false).await;
        assert!(matches!(result, Err(Error::RemotePathNotFound { .. })));
    }

    #[tokio::test]
    async fn test_delete_directory_requires_recursive() {
        let (_temp_dir, client) = setup().await;

        client.upload("/media/dir/x.txt", Bytes::from("x")).await.unwrap();
        assert!(client.delete("/media/dir", false).await.is_err());
        client.delete("/media/dir", true).await.unwrap();
        assert!(!client.exists("/media/dir").await.unwrap());
    }

    #[tokio::test]
    async fn test_ls_and_info() {
        let (_temp_dir, client) = setup().await;

        client.upload("/media/uploads/a.txt", Bytes::from("abc")).await.unwrap();
        client.mkdir("/media/uploads/nested").await.unwrap();

        let children = client.ls("/media/uploads").await.unwrap();
        assert_eq!(
            children,
            vec!["/media/uploads/a.txt", "/media/uploads/nested"]
        );

        let entry = client.info("/media/uploads/a.txt").await.unwrap();
        assert_eq!(entry.kind, EntryKind::File);
        assert_eq!(entry.size, 3);
        assert_eq!(entry.name(), "a.txt");
        assert!(entry.last_modified > 0);
    }

    #[tokio::test]
    async fn test_paths_stay_under_base() {
        let (temp_dir, client) = setup().await;

        let resolved = client.resolve_path("/../../etc/passwd");
        assert!(resolved.starts_with(temp_dir.path()));
    }

    #[tokio::test]
    async fn test_atomic_upload_leaves_no_temp_files() {
        let (temp_dir, client) = setup().await;

        client.upload("/atomic.txt", Bytes::from("complete data")).await.unwrap();

        let entries: Vec<_> = std::fs::read_dir(temp_dir.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name().to_string_lossy().contains(".tmp"))
            .collect();
        assert!(entries.is_empty(), "Temp files should be cleaned up");
    }

    #[tokio::test]
    async fn test_connector() {
        let temp_dir = TempDir::new().unwrap();
        let connector = LocalConnector::new(temp_dir.path().join("cluster"));
        let params = ConnectionParams::from_options(&StorageOptions::default());

        let client = connector.connect(&params).await.unwrap();
        assert!(client.base_path().is_dir());
    }

    #[test]
    fn test_epoch_seconds() {
        let epoch = SystemTime::UNIX_EPOCH;
        assert_eq!(epoch_seconds(Ok(epoch + Duration::from_secs(90))), Some(90));
        assert_eq!(epoch_seconds(Ok(epoch - Duration::from_secs(90))), Some(-90));
        assert_eq!(
            epoch_seconds(Err(std::io::Error::from(std::io::ErrorKind::Unsupported))),
            None
        );
    }
}
