//! Demo data maintenance: `grainbridge-seed import` / `grainbridge-seed destroy`.

use anyhow::{bail, Context};
use chrono::Utc;
use clap::{Parser, Subcommand};

use grainbridge_infra::{seed, AppConfig, PostgresStore};

#[derive(Debug, Parser)]
#[command(name = "grainbridge-seed", about = "Load or remove GrainBridge demo data")]
struct Cli {
    /// Overrides DATABASE_URL.
    #[arg(long)]
    database_url: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Replace inventory and orders with the demo catalog and order history.
    Import,
    /// Remove all inventory and orders (users are kept).
    Destroy,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    grainbridge_observability::init();
    let cli = Cli::parse();

    let url = match cli.database_url {
        Some(url) => url,
        None => {
            let config = AppConfig::load().context("failed to load configuration")?;
            match config.database_url {
                Some(url) => url,
                None => bail!("DATABASE_URL is not set; the in-memory store is seeded with SEED_DEMO_DATA=true instead"),
            }
        }
    };

    let store = PostgresStore::connect(&url)
        .await
        .context("failed to connect to Postgres")?;

    match cli.command {
        Command::Import => {
            let report = seed::import_demo_data(&store, Utc::now()).await?;
            println!("Data Imported! {} items, {} orders", report.items, report.orders);
        }
        Command::Destroy => {
            let report = seed::destroy_demo_data(&store).await?;
            println!("Data Destroyed! {} items, {} orders", report.items, report.orders);
        }
    }
    Ok(())
}
