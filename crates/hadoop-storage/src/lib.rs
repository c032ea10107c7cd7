//! Hadoop Storage - File storage on a distributed filesystem
//!
//! Provides a [`FileStorage`] implementation that stores uploads on HDFS
//! through an injected [`DfsClient`], with:
//! - Collision-resistant, ASCII-safe upload names (timestamp + sanitized stem)
//! - Path resolution that refuses names escaping the root location
//! - Public URL construction from a base URL
//! - A [`LocalDfs`] client that maps the remote tree onto a local directory
//!
//! # Example
//!
//! ```no_run
//! use bytes::Bytes;
//! use hadoop_storage::{FileStorage, HadoopStorage, LocalConnector};
//! use storage_core::{MediaSettings, StorageOptions};
//!
//! # async fn example() -> storage_core::Result<()> {
//! let settings = MediaSettings {
//!     media_root: Some("/data/media".to_string()),
//!     media_url: Some("https://cdn.example.com/media/".to_string()),
//!     ..Default::default()
//! };
//! let connector = LocalConnector::new("/tmp/cluster");
//! let storage = HadoopStorage::connect(&connector, StorageOptions::default(), &settings).await?;
//!
//! let name = storage.save("uploads/report.pdf", Bytes::from_static(b"%PDF"), Some(100)).await?;
//! println!("{}", storage.url(&name)?);
//! # Ok(())
//! # }
//! ```

mod backend;
mod client;
mod hadoop;
mod local;
pub mod naming;
pub mod uri;

pub use backend::{FileStorage, StoredFile};
pub use client::{ConnectionParams, DfsClient, DfsConnector, RemoteFile};
pub use hadoop::HadoopStorage;
pub use local::{LocalConnector, LocalDfs};
pub use naming::{Clock, FixedClock, SystemClock, DEFAULT_MAX_LENGTH};
