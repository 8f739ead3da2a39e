use anyhow::Context;
use clap::Parser;
use colored::Colorize;
use rdkafka::config::{ClientConfig, RDKafkaLogLevel};
use rdkafka::consumer::{Consumer, StreamConsumer};
use rdkafka::Message;

use triad_server::config::KafkaSettings;
use triad_server::{shutdown, viewer};

const GROUP_ID: &str = "log-viewer-group";
const CLIENT_ID: &str = "log-viewer";

#[derive(Parser)]
#[command(name = "view-logs", about = "Print log records shipped to Kafka")]
struct Cli {
    #[command(flatten)]
    kafka: KafkaSettings,

    /// Start from the oldest retained record instead of new ones only.
    #[arg(long)]
    from_beginning: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let offset_reset = if cli.from_beginning { "earliest" } else { "latest" };
    let consumer: StreamConsumer = ClientConfig::new()
        .set("group.id", GROUP_ID)
        .set("client.id", CLIENT_ID)
        .set("bootstrap.servers", cli.kafka.bootstrap_servers())
        .set("auto.offset.reset", offset_reset)
        .set_log_level(RDKafkaLogLevel::Error)
        .create()
        .context("failed to create Kafka consumer")?;

    let topic = cli.kafka.kafka_log_topic.as_str();
    consumer
        .subscribe(&[topic])
        .with_context(|| format!("failed to subscribe to {topic}"))?;

    println!("{}", "📋 Kafka Log Viewer Started".bold());
    println!("Listening to topic: {}\n", topic.bold());

    let stop = shutdown::signal();
    tokio::pin!(stop);

    loop {
        tokio::select! {
            message = consumer.recv() => match message {
                Ok(message) => {
                    let Some(payload) = message.payload() else { continue };
                    match viewer::render(payload) {
                        Ok(text) => println!("{text}"),
                        Err(e) => eprintln!("Failed to parse log message: {e}"),
                    }
                }
                Err(e) => eprintln!("Kafka error: {e}"),
            },
            _ = &mut stop => break,
        }
    }

    println!("\n\n👋 Shutting down log viewer...");
    consumer.unsubscribe();
    Ok(())
}
