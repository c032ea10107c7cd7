//! HDFS storage adapter
//!
//! [`HadoopStorage`] implements [`FileStorage`] by delegating to an injected
//! [`DfsClient`]. The adapter itself only generates names, resolves paths
//! safely and builds URLs; every remote call goes straight to the client,
//! without retries or caching.

use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, FixedOffset, Local};
use parking_lot::RwLock;
use storage_core::{
    path, DirListing, EntryKind, Error, MediaSettings, OpenMode, RemoteEntry, ResolvedConfig,
    Result, StorageOptions,
};
use tracing::{debug, info, instrument};

use crate::backend::{FileStorage, StoredFile};
use crate::client::{ConnectionParams, DfsClient, DfsConnector};
use crate::naming::{self, Clock, SystemClock};
use crate::uri;

/// File storage on a distributed filesystem
///
/// Stored names are prefixed with a microsecond timestamp so uploads with
/// the same file name don't overwrite each other. Two saves of the same
/// stem within one microsecond still collide.
#[derive(Debug)]
pub struct HadoopStorage<C> {
    client: C,
    options: StorageOptions,
    config: RwLock<Arc<ResolvedConfig>>,
    clock: Option<Arc<dyn Clock>>,
}

impl<C: DfsClient> HadoopStorage<C> {
    /// Create an adapter over an already connected client
    ///
    /// # Errors
    /// Returns error if neither `options.location` nor `MEDIA_ROOT` is set
    pub fn new(client: C, options: StorageOptions, settings: &MediaSettings) -> Result<Self> {
        let config = ResolvedConfig::resolve(&options, settings)?;
        debug!(location = %config.location, base_url = ?config.base_url, "Resolved storage config");

        Ok(Self {
            client,
            options,
            config: RwLock::new(Arc::new(config)),
            clock: None,
        })
    }

    /// Connect a client with `connector` and wrap it
    pub async fn connect<K>(connector: &K, options: StorageOptions, settings: &MediaSettings) -> Result<Self>
    where
        K: DfsConnector<Client = C>,
    {
        // Resolve first so a bad config fails before any network traffic
        ResolvedConfig::resolve(&options, settings)?;

        let params = ConnectionParams::from_options(&options);
        let client = connector.connect(&params).await?;
        info!(namenode = %params.namenode_uri(), user = %params.user, "Connected storage client");

        Self::new(client, options, settings)
    }

    /// Use `clock` for generated names instead of the wall clock
    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Some(Arc::new(clock));
        self
    }

    /// Recompute derived configuration after the host settings changed
    ///
    /// On error the previous configuration stays in place.
    pub fn reconfigure(&self, settings: &MediaSettings) -> Result<()> {
        let config = ResolvedConfig::resolve(&self.options, settings)?;
        info!(location = %config.location, base_url = ?config.base_url, "Storage reconfigured");
        *self.config.write() = Arc::new(config);
        Ok(())
    }

    /// Snapshot of the current configuration
    pub fn config(&self) -> Arc<ResolvedConfig> {
        self.config.read().clone()
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    pub fn options(&self) -> &StorageOptions {
        &self.options
    }

    pub fn location(&self) -> String {
        self.config().location.clone()
    }

    pub fn base_url(&self) -> Option<String> {
        self.config().base_url.clone()
    }

    /// Advisory only; the client does not apply it
    pub fn file_permissions_mode(&self) -> Option<u32> {
        self.config().file_permissions_mode
    }

    /// Advisory only; the client does not apply it
    pub fn directory_permissions_mode(&self) -> Option<u32> {
        self.config().directory_permissions_mode
    }

    /// Prefix for generated names, used to partition uploads per tenant
    pub fn path_prefix(&self) -> String {
        self.config().path_prefix.clone()
    }

    fn now(&self, use_tz: bool) -> chrono::NaiveDateTime {
        match &self.clock {
            Some(clock) => clock.now(),
            None => SystemClock { use_tz }.now(),
        }
    }

    async fn entry(&self, name: &str) -> Result<RemoteEntry> {
        let full_path = self.path(name)?;
        self.client.info(&full_path).await
    }

    /// UTC when `use_tz` is set, local time otherwise
    fn datetime(&self, entry: &RemoteEntry, timestamp: i64) -> Result<DateTime<FixedOffset>> {
        let utc = DateTime::from_timestamp(timestamp, 0).ok_or_else(|| Error::InvalidTimestamp {
            path: entry.path.clone(),
            timestamp,
        })?;

        if self.config().use_tz {
            Ok(utc.fixed_offset())
        } else {
            Ok(utc.with_timezone(&Local).fixed_offset())
        }
    }
}

#[async_trait]
impl<C: DfsClient> FileStorage for HadoopStorage<C> {
    #[instrument(skip(self), fields(backend = "hdfs"))]
    async fn open(&self, name: &str, mode: OpenMode) -> Result<StoredFile> {
        let full_path = self.path(name)?;
        let stream = self.client.open(&full_path, mode).await?;
        Ok(StoredFile::new(name, mode, stream))
    }

    #[instrument(skip(self, content), fields(backend = "hdfs", size = content.len()))]
    async fn save_exact(&self, name: &str, content: Bytes) -> Result<String> {
        let full_path = self.path(name)?;

        let (directory, _) = path::split(&full_path);
        if !directory.is_empty() && !self.client.exists(directory).await? {
            debug!(%directory, "Creating directory");
            self.client.mkdir(directory).await?;
        }

        let size = self.client.upload(&full_path, content).await?;
        debug!(%full_path, size, "Saved file");

        Ok(name.replace('\\', "/"))
    }

    #[instrument(skip(self), fields(backend = "hdfs"))]
    async fn delete(&self, name: &str) -> Result<()> {
        if name.is_empty() {
            return Err(Error::EmptyName);
        }

        let full_path = self.path(name)?;
        if self.client.exists(&full_path).await? {
            debug!(%full_path, "Deleting file");
            self.client.delete(&full_path, false).await?;
        }
        Ok(())
    }

    #[instrument(skip(self), fields(backend = "hdfs"))]
    async fn exists(&self, name: &str) -> Result<bool> {
        let full_path = self.path(name)?;
        self.client.exists(&full_path).await
    }

    fn get_available_name(&self, name: &str, max_length: Option<usize>) -> Result<String> {
        let config = self.config();
        naming::available_name(
            name,
            max_length,
            &config.path_prefix,
            self.now(config.use_tz),
        )
    }

    #[instrument(skip(self), fields(backend = "hdfs"))]
    async fn listdir(&self, name: &str) -> Result<DirListing> {
        let full_path = self.path(name)?;
        let mut listing = DirListing::default();

        for child in self.client.ls(&full_path).await? {
            let entry = self.client.info(&child).await?;
            match entry.kind {
                EntryKind::Directory => listing.directories.push(entry.name().to_string()),
                EntryKind::File => listing.files.push(entry.name().to_string()),
            }
        }

        debug!(
            directories = listing.directories.len(),
            files = listing.files.len(),
            "Listed directory"
        );
        Ok(listing)
    }

    fn path(&self, name: &str) -> Result<String> {
        path::safe_join(&self.config().location, name)
    }

    #[instrument(skip(self), fields(backend = "hdfs"))]
    async fn size(&self, name: &str) -> Result<u64> {
        Ok(self.entry(name).await?.size)
    }

    fn url(&self, name: &str) -> Result<String> {
        let config = self.config();
        let base_url = config.base_url.as_deref().ok_or(Error::NoBaseUrl)?;
        let escaped = uri::filepath_to_uri(name);
        Ok(uri::url_join(base_url, escaped.trim_start_matches('/')))
    }

    #[instrument(skip(self), fields(backend = "hdfs"))]
    async fn get_accessed_time(&self, name: &str) -> Result<DateTime<FixedOffset>> {
        let entry = self.entry(name).await?;
        self.datetime(&entry, entry.last_accessed)
    }

    /// Same as the modified time: the remote filesystem keeps no creation time
    #[instrument(skip(self), fields(backend = "hdfs"))]
    async fn get_created_time(&self, name: &str) -> Result<DateTime<FixedOffset>> {
        let entry = self.entry(name).await?;
        self.datetime(&entry, entry.last_modified)
    }

    #[instrument(skip(self), fields(backend = "hdfs"))]
    async fn get_modified_time(&self, name: &str) -> Result<DateTime<FixedOffset>> {
        let entry = self.entry(name).await?;
        self.datetime(&entry, entry.last_modified)
    }
}
