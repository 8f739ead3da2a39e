use anyhow::Context;
use clap::{Parser, Subcommand};
use mongodb::Client;

use triad_server::config::MongoSettings;
use triad_server::migrations::{self, Migrator};

#[derive(Parser)]
#[command(name = "migrate", about = "Apply or revert document database migrations")]
struct Cli {
    #[command(flatten)]
    mongo: MongoSettings,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Apply every pending migration
    Up,
    /// Revert the last applied migration
    Down,
    /// Show which migrations are applied
    Status,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    triad_server::telemetry::init("info", triad_server::config::LogFormat::Pretty);

    let client = Client::with_uri_str(&cli.mongo.mongodb_uri)
        .await
        .context("MongoDB connection failed")?;
    let migrator = Migrator::for_database(client.database(&cli.mongo.database()), migrations::all());

    match cli.command {
        Command::Up => {
            let applied = migrator.up().await.context("migration failed")?;
            if applied.is_empty() {
                println!("Nothing to migrate.");
            }
            for name in applied {
                println!("MIGRATED UP: {name}");
            }
        }
        Command::Down => match migrator.down().await.context("rollback failed")? {
            Some(name) => println!("MIGRATED DOWN: {name}"),
            None => println!("Nothing to roll back."),
        },
        Command::Status => {
            println!("{:<40} Applied At", "Filename");
            for status in migrator.status().await.context("status failed")? {
                let applied = status
                    .applied_at
                    .map(|at| at.to_rfc3339())
                    .unwrap_or_else(|| "PENDING".to_string());
                println!("{:<40} {}", status.file_name, applied);
            }
        }
    }

    client.shutdown().await;
    Ok(())
}
