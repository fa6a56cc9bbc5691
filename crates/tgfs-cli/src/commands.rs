use std::path::Path;

use anyhow::Context;
use chrono::{DateTime, Utc};
use colored::Colorize;
use serde::Serialize;
use tgfs_store::{
    BotConfig, CancellationToken, ChatStore, Operation, SizeSource, StoreError, StoredObject,
};

use crate::cli::*;

pub async fn run_command(cli: Cli) -> anyhow::Result<()> {
    let config = load_config(cli.config.as_deref())?;
    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            trigger.cancel();
        }
    });

    let store = ChatStore::connect(cli.name.as_str(), &config, &cancel)
        .await
        .context("cannot connect to the chat")?;

    match cli.command {
        Command::Put(args) => cmd_put(&store, &cancel, args, &cli.format).await,
        Command::Cat(args) => cmd_cat(&store, &cancel, args).await,
        Command::Get(args) => cmd_get(&store, &cancel, args).await,
        Command::Rm(args) => cmd_rm(&store, &cancel, args).await,
        Command::Stat(args) => cmd_stat(&store, &cancel, args, &cli.format).await,
        Command::Info => cmd_info(&store, &cli.format),
    }
}

fn load_config(path: Option<&Path>) -> anyhow::Result<BotConfig> {
    let config = match path {
        Some(path) => BotConfig::from_file(path)?,
        None => BotConfig::from_env()?,
    };
    Ok(config)
}

#[derive(Serialize)]
struct ObjectSummary<'a> {
    remote: String,
    name: &'a str,
    size: u64,
    size_source: &'static str,
    mod_time: DateTime<Utc>,
}

impl<'a> ObjectSummary<'a> {
    fn of(obj: &'a StoredObject<'_>) -> Self {
        Self {
            remote: obj.remote().to_string(),
            name: obj.name(),
            size: obj.size(),
            size_source: match obj.size_source() {
                SizeSource::Declared => "declared",
                SizeSource::Reported => "reported",
            },
            mod_time: obj.mod_time(),
        }
    }
}

fn print_object(obj: &StoredObject<'_>, format: &OutputFormat) -> anyhow::Result<()> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&ObjectSummary::of(obj))?),
        OutputFormat::Text => {
            println!("  Remote: {}", obj.remote().to_string().yellow());
            println!("  Name: {}", obj.name().bold());
            println!("  Size: {} bytes ({:?})", obj.size(), obj.size_source());
            println!("  Sent: {}", obj.mod_time().to_rfc3339().dimmed());
        }
    }
    Ok(())
}

async fn cmd_put(
    store: &ChatStore,
    cancel: &CancellationToken,
    args: PutArgs,
    format: &OutputFormat,
) -> anyhow::Result<()> {
    let file = tokio::fs::File::open(&args.local)
        .await
        .with_context(|| format!("cannot open {}", args.local.display()))?;
    let size = file.metadata().await?.len();
    let remote_name = match args.remote_name {
        Some(name) => name,
        None => args
            .local
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .context("local path has no file name")?,
    };

    let obj = store.put(cancel, file, size, &remote_name).await?;
    if matches!(format, OutputFormat::Text) {
        println!("{} Uploaded {} to {}", "✓".green().bold(), args.local.display(), store);
    }
    print_object(&obj, format)
}

async fn cmd_cat(store: &ChatStore, cancel: &CancellationToken, args: RemoteArgs) -> anyhow::Result<()> {
    let obj = store.new_object(cancel, &args.remote).await?;
    let mut reader = obj.open(cancel).await?;
    let mut stdout = tokio::io::stdout();
    tokio::io::copy(&mut reader, &mut stdout)
        .await
        .map_err(StoreError::from_read)?;
    Ok(())
}

async fn cmd_get(store: &ChatStore, cancel: &CancellationToken, args: GetArgs) -> anyhow::Result<()> {
    let obj = store.new_object(cancel, &args.remote).await?;
    let mut reader = obj.open(cancel).await?;
    let mut file = tokio::fs::File::create(&args.local)
        .await
        .with_context(|| format!("cannot create {}", args.local.display()))?;
    let written = tokio::io::copy(&mut reader, &mut file)
        .await
        .map_err(StoreError::from_read)?;
    println!(
        "{} {} → {} ({} bytes)",
        "✓".green().bold(),
        args.remote.yellow(),
        args.local.display(),
        written
    );
    Ok(())
}

async fn cmd_rm(store: &ChatStore, cancel: &CancellationToken, args: RemoteArgs) -> anyhow::Result<()> {
    let obj = store.new_object(cancel, &args.remote).await?;
    obj.remove(cancel).await?;
    println!("{} Removed {}", "✓".green().bold(), args.remote.yellow());
    Ok(())
}

async fn cmd_stat(
    store: &ChatStore,
    cancel: &CancellationToken,
    args: RemoteArgs,
    format: &OutputFormat,
) -> anyhow::Result<()> {
    let obj = store.new_object(cancel, &args.remote).await?;
    print_object(&obj, format)
}

#[derive(Serialize)]
struct Info<'a> {
    name: &'a str,
    destination: i64,
    root: &'a str,
    hashes: Vec<String>,
    precision_ms: Option<u128>,
    supported: Vec<&'static str>,
    unsupported: Vec<&'static str>,
}

fn cmd_info(store: &ChatStore, format: &OutputFormat) -> anyhow::Result<()> {
    let (supported, unsupported): (Vec<Operation>, Vec<Operation>) =
        Operation::ALL.into_iter().partition(|op| op.is_supported());
    match format {
        OutputFormat::Json => {
            let info = Info {
                name: store.name(),
                destination: store.destination().get(),
                root: store.root(),
                hashes: store.hashes().iter().map(|h| h.to_string()).collect(),
                precision_ms: store.precision().map(|p| p.as_millis()),
                supported: supported.iter().map(|op| op.name()).collect(),
                unsupported: unsupported.iter().map(|op| op.name()).collect(),
            };
            println!("{}", serde_json::to_string_pretty(&info)?);
        }
        OutputFormat::Text => {
            println!("{}", store.to_string().bold());
            println!("  Destination: {}", store.destination().to_string().cyan());
            println!("  Hashes: {}", hashes_label(store).dimmed());
            println!("  Mod time precision: {}", precision_label(store).dimmed());
            for op in supported {
                println!("  {} {}", "✓".green(), op);
            }
            for op in unsupported {
                println!("  {} {}", "✗".red(), op);
            }
        }
    }
    Ok(())
}

fn hashes_label(store: &ChatStore) -> String {
    match store.hashes() {
        [] => "none".to_string(),
        kinds => kinds
            .iter()
            .map(|h| h.to_string())
            .collect::<Vec<_>>()
            .join(", "),
    }
}

fn precision_label(store: &ChatStore) -> String {
    match store.precision() {
        Some(p) => format!("{p:?}"),
        None => "not supported".to_string(),
    }
}
