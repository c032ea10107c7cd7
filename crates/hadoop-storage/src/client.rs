//! Remote filesystem client interface
//!
//! The adapter never talks to the cluster itself; it drives an injected
//! [`DfsClient`]. Errors returned by a client are passed to callers as-is.

use std::collections::BTreeMap;
use std::fmt::Debug;
use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use storage_core::{OpenMode, RemoteEntry, Result, StorageOptions};
use tokio::io::{AsyncRead, AsyncWrite};

/// Byte stream returned by [`DfsClient::open`]
pub trait RemoteFile: AsyncRead + AsyncWrite + Send + Unpin {}

impl<T: AsyncRead + AsyncWrite + Send + Unpin> RemoteFile for T {}

/// Async interface to a distributed filesystem
///
/// All paths are absolute remote paths.
#[async_trait]
pub trait DfsClient: Send + Sync + Debug {
    /// Open a stream on `path`
    async fn open(&self, path: &str, mode: OpenMode) -> Result<Box<dyn RemoteFile>>;

    /// Store `content` at `path`, replacing any existing file
    ///
    /// # Returns
    /// Number of bytes written
    async fn upload(&self, path: &str, content: Bytes) -> Result<u64>;

    /// Create a directory, including missing parents
    async fn mkdir(&self, path: &str) -> Result<()>;

    /// Check if a path exists
    async fn exists(&self, path: &str) -> Result<bool>;

    /// Remove a file or directory
    async fn delete(&self, path: &str, recursive: bool) -> Result<()>;

    /// List the absolute paths of the children of a directory
    async fn ls(&self, path: &str) -> Result<Vec<String>>;

    /// Stat a single path
    async fn info(&self, path: &str) -> Result<RemoteEntry>;
}

#[async_trait]
impl<C: DfsClient + ?Sized> DfsClient for Arc<C> {
    async fn open(&self, path: &str, mode: OpenMode) -> Result<Box<dyn RemoteFile>> {
        (**self).open(path, mode).await
    }

    async fn upload(&self, path: &str, content: Bytes) -> Result<u64> {
        (**self).upload(path, content).await
    }

    async fn mkdir(&self, path: &str) -> Result<()> {
        (**self).mkdir(path).await
    }

    async fn exists(&self, path: &str) -> Result<bool> {
        (**self).exists(path).await
    }

    async fn delete(&self, path: &str, recursive: bool) -> Result<()> {
        (**self).delete(path, recursive).await
    }

    async fn ls(&self, path: &str) -> Result<Vec<String>> {
        (**self).ls(path).await
    }

    async fn info(&self, path: &str) -> Result<RemoteEntry> {
        (**self).info(path).await
    }
}

/// Everything a client needs to reach the namenode
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionParams {
    pub host: String,
    pub port: u16,
    pub user: String,

    /// Root of the client runtime (`HADOOP_HOME`)
    pub home: String,

    /// Extra client configuration, e.g. `dfs.replication`
    pub extra_conf: BTreeMap<String, String>,
}

impl ConnectionParams {
    pub fn from_options(options: &StorageOptions) -> Self {
        let mut extra_conf = BTreeMap::new();
        extra_conf.insert(
            "dfs.replication".to_string(),
            options.replication.to_string(),
        );

        Self {
            host: options.host.clone(),
            port: options.port,
            user: options.user.clone(),
            home: options.home.clone(),
            extra_conf,
        }
    }

    pub fn namenode_uri(&self) -> String {
        format!("hdfs://{}:{}", self.host, self.port)
    }

    /// Environment variables a native client expects
    pub fn environment(&self) -> Vec<(String, String)> {
        vec![("HADOOP_HOME".to_string(), self.home.clone())]
    }

    /// Command whose output is the `CLASSPATH` for a native client
    pub fn classpath_command(&self) -> Vec<String> {
        vec![
            format!("{}/bin/hdfs", self.home.trim_end_matches('/')),
            "classpath".to_string(),
            "--glob".to_string(),
        ]
    }
}

/// Builds a connected [`DfsClient`]
#[async_trait]
pub trait DfsConnector: Send + Sync {
    type Client: DfsClient;

    async fn connect(&self, params: &ConnectionParams) -> Result<Self::Client>;
}
