//! Storage Core - Foundation for the HDFS file storage adapter
//!
//! Provides configuration, error handling and remote entry types shared by
//! the storage adapter, its clients and its tooling.

pub mod config;
pub mod error;
pub mod path;
pub mod types;

pub use config::{MediaSettings, ResolvedConfig, StorageOptions};
pub use error::{Error, Result};
pub use types::*;
