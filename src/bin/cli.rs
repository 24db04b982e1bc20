//! CLI binary for docport.

use std::io::Write as _;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use docport::DocbaseClient;
use docport::config::MigrationConfig;
use docport::migrate::driver::{MigrationDriver, MigrationOptions};
use tracing_subscriber::EnvFilter;

/// docport: tenant-to-tenant migration for DocBase memos.
#[derive(Parser)]
#[command(name = "docport", version, about)]
struct Cli {
    /// Path to TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Subcommand to run.
    #[command(subcommand)]
    command: Command,
}

/// Available commands.
#[derive(Subcommand)]
enum Command {
    /// Copy every not-yet-exported memo from the source tenant to the
    /// destination tenant.
    Migrate,

    /// Delete every memo matching a query (asks for confirmation first).
    Remove {
        /// Search query selecting the memos to delete.
        query: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Users can override with RUST_LOG=debug to see request-level detail.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("docport=info")),
        )
        .init();

    let cli = Cli::parse();

    let config_path = cli
        .config
        .unwrap_or_else(MigrationConfig::default_config_path);
    let config = MigrationConfig::from_file(&config_path)?;

    match cli.command {
        Command::Migrate => run_migrate(config).await,
        Command::Remove { query } => run_remove(config, &query).await,
    }
}

async fn run_migrate(config: MigrationConfig) -> anyhow::Result<()> {
    println!("docport v{}", env!("CARGO_PKG_VERSION"));

    let source = DocbaseClient::new(config.source.client_config());
    let destination = DocbaseClient::new(config.destination.client_config());
    let driver = MigrationDriver::new(
        source,
        destination,
        MigrationOptions {
            groups: config.destination.groups.clone(),
            author_id: config.destination.author_id,
            page_size: config.page_size,
        },
    );

    println!(
        "migrating {} -> {} (run tag: {})",
        config.source.domain,
        config.destination.domain,
        driver.imported_tag()
    );

    let migrated = driver.run().await?;
    println!("migrated {migrated} memos");
    Ok(())
}

async fn run_remove(config: MigrationConfig, query: &str) -> anyhow::Result<()> {
    let tenant = config.remove.as_ref().unwrap_or(&config.source);
    let client = DocbaseClient::new(tenant.client_config());

    let memos = docport::remove::find_memos(&client, query).await?;
    if memos.is_empty() {
        println!("no memos match {query:?}");
        return Ok(());
    }

    println!("memos matching {query:?} on {}:", tenant.domain);
    for memo in &memos {
        println!("  [{}] {}", memo.id, memo.title);
    }

    print!(
        "Delete these {} memos? Type \"remove them\" to confirm: ",
        memos.len()
    );
    std::io::stdout().flush()?;
    let mut answer = String::new();
    std::io::stdin().read_line(&mut answer)?;
    if answer.trim() != "remove them" {
        println!("aborted");
        return Ok(());
    }

    docport::remove::remove_memos(&client, &memos).await?;
    Ok(())
}
