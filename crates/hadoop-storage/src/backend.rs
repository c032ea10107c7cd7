//! File storage trait definition
//!
//! Defines the interface a web application's file-storage layer drives.
//! Any backend implementing [`FileStorage`] can be swapped in for another.

use std::fmt;
use std::io;
use std::pin::Pin;
use std::task::{Context, Poll};

use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, FixedOffset};
use storage_core::{DirListing, OpenMode, Result};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, ReadBuf};

use crate::client::RemoteFile;

/// Async trait for file storage backends
///
/// Names are relative to the backend's root location and use `/` as the
/// separator.
#[async_trait]
pub trait FileStorage: Send + Sync {
    /// Open a stored file
    ///
    /// # Errors
    /// Returns error if the name escapes the root or the file can't be opened
    async fn open(&self, name: &str, mode: OpenMode) -> Result<StoredFile>;

    /// Store `content` under an available name derived from `name`
    ///
    /// # Returns
    /// The name the content was actually stored under
    async fn save(&self, name: &str, content: Bytes, max_length: Option<usize>) -> Result<String> {
        let name = self.get_available_name(name, max_length)?;
        self.save_exact(&name, content).await
    }

    /// Store `content` under exactly `name`, creating the parent directory
    /// when missing
    async fn save_exact(&self, name: &str, content: Bytes) -> Result<String>;

    /// Delete a stored file; deleting a missing file is not an error
    ///
    /// # Errors
    /// Returns [`storage_core::Error::EmptyName`] for an empty name
    async fn delete(&self, name: &str) -> Result<()>;

    /// Check if a name exists
    async fn exists(&self, name: &str) -> Result<bool>;

    /// Derive a name that does not collide with existing files
    fn get_available_name(&self, name: &str, max_length: Option<usize>) -> Result<String>;

    /// List a directory, split into subdirectories and files
    async fn listdir(&self, name: &str) -> Result<DirListing>;

    /// Absolute remote path for a name
    ///
    /// # Errors
    /// Returns [`storage_core::Error::SuspiciousOperation`] if the name
    /// escapes the root location
    fn path(&self, name: &str) -> Result<String>;

    /// Size in bytes
    async fn size(&self, name: &str) -> Result<u64>;

    /// Public URL for a name
    ///
    /// # Errors
    /// Returns [`storage_core::Error::NoBaseUrl`] when no base URL is configured
    fn url(&self, name: &str) -> Result<String>;

    async fn get_accessed_time(&self, name: &str) -> Result<DateTime<FixedOffset>>;

    async fn get_created_time(&self, name: &str) -> Result<DateTime<FixedOffset>>;

    async fn get_modified_time(&self, name: &str) -> Result<DateTime<FixedOffset>>;
}

/// A stored file opened through a [`FileStorage`]
pub struct StoredFile {
    name: String,
    mode: OpenMode,
    inner: Box<dyn RemoteFile>,
}

impl StoredFile {
    pub fn new(name: impl Into<String>, mode: OpenMode, inner: Box<dyn RemoteFile>) -> Self {
        Self {
            name: name.into(),
            mode,
            inner,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn mode(&self) -> OpenMode {
        self.mode
    }

    /// Read the rest of the stream into memory
    pub async fn read_all(&mut self) -> Result<Bytes> {
        let mut buf = Vec::new();
        self.inner.read_to_end(&mut buf).await?;
        Ok(Bytes::from(buf))
    }

    pub fn into_inner(self) -> Box<dyn RemoteFile> {
        self.inner
    }
}

impl fmt::Debug for StoredFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StoredFile")
            .field("name", &self.name)
            .field("mode", &self.mode)
            .finish_non_exhaustive()
    }
}

impl AsyncRead for StoredFile {
    fn poll_read(
        mut self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        Pin::new(&mut self.inner).poll_read(cx, buf)
    }
}

impl AsyncWrite for StoredFile {
    fn poll_write(
        mut self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &[u8],
    ) -> Poll<io::Result<usize>> {
        Pin::new(&mut self.inner).poll_write(cx, buf)
    }

    fn poll_flush(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Pin::new(&mut self.inner).poll_flush(cx)
    }

    fn poll_shutdown(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Pin::new(&mut self.inner).poll_shutdown(cx)
    }
}
