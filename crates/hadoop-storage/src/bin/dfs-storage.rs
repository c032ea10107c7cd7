//! dfs-storage binary entry point
//!
//! Drives the storage adapter over a local directory standing in for the
//! cluster. Connection and media settings come from the environment
//! (`HADOOP_*`, `MEDIA_ROOT`, `MEDIA_URL`, `USE_TZ`); `--location` and
//! `--base-url` override the media root and URL.
//!
//! ```text
//! dfs-storage --root <cluster-dir> [--location <dir>] [--base-url <url>] <command>
//!
//!   save <name> <local-file>
//!   ls [dir]
//!   stat <name>
//!   cat <name>
//!   url <name>
//!   rm <name>
//! ```

use bytes::Bytes;
use tokio::io::AsyncWriteExt;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use hadoop_storage::{FileStorage, HadoopStorage, LocalConnector, DEFAULT_MAX_LENGTH};
use storage_core::{MediaSettings, OpenMode, StorageOptions};

const USAGE: &str = "usage: dfs-storage --root <cluster-dir> [--location <dir>] [--base-url <url>] \
                     <save|ls|stat|cat|url|rm> [args...]";

struct Cli {
    root: String,
    location: Option<String>,
    base_url: Option<String>,
    command: Vec<String>,
}

fn parse_args(mut args: impl Iterator<Item = String>) -> Result<Cli, &'static str> {
    let mut root = None;
    let mut location = None;
    let mut base_url = None;
    let mut command = Vec::new();

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--root" if command.is_empty() => root = Some(args.next().ok_or(USAGE)?),
            "--location" if command.is_empty() => location = Some(args.next().ok_or(USAGE)?),
            "--base-url" if command.is_empty() => base_url = Some(args.next().ok_or(USAGE)?),
            _ => command.push(arg),
        }
    }

    match (root, command.is_empty()) {
        (Some(root), false) => Ok(Cli {
            root,
            location,
            base_url,
            command,
        }),
        _ => Err(USAGE),
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "hadoop_storage=info,storage_core=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = parse_args(std::env::args().skip(1))?;
    let args = &cli.command;
    let arg = |i: usize| args.get(i).map(String::as_str).ok_or(USAGE);

    let mut options = StorageOptions::from_env()?;
    if let Some(location) = cli.location {
        options = options.with_location(location);
    }
    if let Some(base_url) = cli.base_url {
        options = options.with_base_url(base_url);
    }
    // A missing MEDIA_ROOT without --location is a configuration error
    let settings = MediaSettings::from_env()?;

    let connector = LocalConnector::new(&cli.root);
    let storage = HadoopStorage::connect(&connector, options, &settings).await?;

    match args[0].as_str() {
        "save" => {
            let content = tokio::fs::read(arg(2)?).await?;
            let name = storage
                .save(arg(1)?, Bytes::from(content), Some(DEFAULT_MAX_LENGTH))
                .await?;
            println!("{}", name);
        }
        "ls" => {
            let listing = storage.listdir(args.get(1).map(String::as_str).unwrap_or("")).await?;
            for directory in &listing.directories {
                println!("{}/", directory);
            }
            for file in &listing.files {
                println!("{}", file);
            }
        }
        "stat" => {
            let name = arg(1)?;
            println!("path     {}", storage.path(name)?);
            println!("size     {}", storage.size(name).await?);
            println!("modified {}", storage.get_modified_time(name).await?);
            println!("accessed {}", storage.get_accessed_time(name).await?);
        }
        "cat" => {
            let mut file = storage.open(arg(1)?, OpenMode::Read).await?;
            let content = file.read_all().await?;
            tokio::io::stdout().write_all(&content).await?;
        }
        "url" => println!("{}", storage.url(arg(1)?)?),
        "rm" => storage.delete(arg(1)?).await?,
        _ => return Err(USAGE.into()),
    }

    Ok(())
}
