//! End-to-end storage flow over a local cluster directory
//!
//! Exercises the adapter the way a web application does: save uploads,
//! list them, stat them, build URLs and delete them, all through the
//! `FileStorage` trait object.

use anyhow::Result;
use bytes::Bytes;
use chrono::NaiveDate;
use hadoop_storage::{FileStorage, FixedClock, HadoopStorage, LocalConnector, LocalDfs};
use std::sync::Arc;
use storage_core::{Error, MediaSettings, OpenMode, StorageOptions};
use tempfile::TempDir;

fn media_settings() -> MediaSettings {
    MediaSettings {
        media_root: Some("/data/media".to_string()),
        media_url: Some("https://cdn.example.com/media/".to_string()),
        ..Default::default()
    }
}

fn init_tracing() {
    // Only the first test to run installs the subscriber
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_test_writer()
        .try_init();
}

async fn start_storage(cluster: &TempDir) -> Result<Arc<dyn FileStorage>> {
    init_tracing();
    let connector = LocalConnector::new(cluster.path());
    let storage =
        HadoopStorage::connect(&connector, StorageOptions::default(), &media_settings()).await?;
    Ok(Arc::new(storage))
}

#[tokio::test]
async fn test_full_upload_flow() -> Result<()> {
    let cluster = TempDir::new()?;
    let storage = start_storage(&cluster).await?;

    // 1. Save two uploads with the same original name
    let first = storage
        .save("uploads/Quarterly Report.pdf", Bytes::from("v1"), Some(100))
        .await?;
    tokio::time::sleep(std::time::Duration::from_millis(2)).await;
    let second = storage
        .save("uploads/Quarterly Report.pdf", Bytes::from("v2"), Some(100))
        .await?;

    assert_ne!(first, second, "timestamp token should keep names apart");
    for name in [&first, &second] {
        assert!(name.starts_with("uploads/"));
        assert!(name.ends_with("_Quarterly Report.pdf"));
        assert!(name.len() <= 100);
    }

    // 2. Both are on the cluster, under the media root
    assert!(cluster.path().join("data/media").join(&first).is_file());
    assert!(storage.exists(&second).await?);

    // 3. Contents are intact
    let mut file = storage.open(&first, OpenMode::Read).await?;
    assert_eq!(file.read_all().await?, Bytes::from("v1"));
    assert_eq!(storage.size(&second).await?, 2);

    // 4. Listing partitions by kind
    storage.save_exact("uploads/thumbs/t.png", Bytes::from("t")).await?;
    let listing = storage.listdir("uploads").await?;
    assert_eq!(listing.directories, vec!["thumbs"]);
    assert_eq!(listing.files.len(), 2);

    // 5. URLs are escaped
    let url = storage.url(&first)?;
    assert!(url.starts_with("https://cdn.example.com/media/uploads/"));
    assert!(url.ends_with("_Quarterly%20Report.pdf"));

    // 6. Delete
    tracing::info!(name = %first, "Deleting upload");
    storage.delete(&first).await?;
    assert!(!storage.exists(&first).await?);
    storage.delete(&first).await?;

    Ok(())
}

#[tokio::test]
async fn test_timestamps() -> Result<()> {
    let cluster = TempDir::new()?;
    let storage = start_storage(&cluster).await?;

    let name = storage.save("notes.txt", Bytes::from("n"), None).await?;
    let modified = storage.get_modified_time(&name).await?;
    let created = storage.get_created_time(&name).await?;
    let accessed = storage.get_accessed_time(&name).await?;

    assert_eq!(created, modified);
    assert!(accessed.timestamp() > 0);
    assert!((chrono::Utc::now().timestamp() - modified.timestamp()).abs() < 3600);
    Ok(())
}

#[tokio::test]
async fn test_unsafe_names_are_rejected() -> Result<()> {
    let cluster = TempDir::new()?;
    let storage = start_storage(&cluster).await?;

    for name in ["../../etc/passwd", "/etc/passwd", "uploads/../../secret"] {
        let result = storage.path(name);
        assert!(
            matches!(result, Err(Error::SuspiciousOperation { .. })),
            "{} should be rejected",
            name
        );
    }

    let result = storage.delete("").await;
    assert!(matches!(result, Err(Error::EmptyName)));

    let result = storage.save_exact("../escape.txt", Bytes::from("x")).await;
    assert!(result.is_err());
    assert!(!cluster.path().join("data/escape.txt").exists());
    tracing::info!("Unsafe names rejected");
    Ok(())
}

#[tokio::test]
async fn test_deterministic_names_with_fixed_clock() -> Result<()> {
    init_tracing();
    let cluster = TempDir::new()?;
    let instant = NaiveDate::from_ymd_opt(2024, 2, 29)
        .unwrap()
        .and_hms_micro_opt(23, 59, 59, 999_999)
        .unwrap();
    let storage = HadoopStorage::new(
        LocalDfs::new(cluster.path()),
        StorageOptions::default(),
        &media_settings(),
    )?
    .with_clock(FixedClock(instant));

    assert_eq!(
        storage.get_available_name("report.pdf", Some(100))?,
        "29022024_235959999999_report.pdf"
    );
    assert_eq!(
        storage.get_available_name("in/my,weird;name!.txt", Some(100))?,
        "in/29022024_235959999999_my_weird_name_.txt"
    );
    assert_eq!(
        storage.get_available_name("café-crème.jpg", None)?,
        "29022024_235959999999_cafe_creme.jpg"
    );
    assert_eq!(
        storage.get_available_name("uploads/“draft” – v2….txt", Some(100))?,
        "uploads/29022024_235959999999__draft_ _ v2___.txt"
    );
    Ok(())
}

#[tokio::test]
async fn test_reconfigure_moves_root() -> Result<()> {
    init_tracing();
    let cluster = TempDir::new()?;
    let storage = HadoopStorage::new(
        LocalDfs::new(cluster.path()),
        StorageOptions::default(),
        &media_settings(),
    )?;

    storage.save_exact("a.txt", Bytes::from("a")).await?;

    let mut settings = media_settings();
    settings.media_root = Some("/data/archive".to_string());
    settings.media_url = None;
    storage.reconfigure(&settings)?;

    assert!(!storage.exists("a.txt").await?);
    assert!(matches!(storage.url("a.txt"), Err(Error::NoBaseUrl)));
    storage.save_exact("a.txt", Bytes::from("archived")).await?;
    assert!(cluster.path().join("data/archive/a.txt").is_file());
    Ok(())
}
