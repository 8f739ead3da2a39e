use anyhow::Context;
use clap::Parser;
use serde_json::json;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{error, info};
use triad_connect::{Connection, RetryConnector};
use triad_core::ServiceEvent;

use triad_server::{
    app::build_router,
    config::Settings,
    logger::LogShipper,
    services::{DocumentStore, KafkaPublisher, KeyValueCache, LogPublisher, MongoStore, RedisCache},
    shutdown,
    state::AppState,
    telemetry,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let settings = Settings::parse();
    triad_server::telemetry::init(&settings.log_filter, settings.log_format);

    info!("Starting server...");
    if let Err(e) = run(settings).await {
        error!("Failed to start server: {e:#}");
        return Err(e);
    }
    Ok(())
}

async fn run(settings: Settings) -> anyhow::Result<()> {
    // Rejected before MongoDB is even contacted.
    let retry_policy = settings
        .kafka
        .retry_policy()
        .context("invalid Kafka connect settings")?;

    let events = telemetry::service_listeners();

    let store: Arc<dyn DocumentStore> = Arc::new(
        MongoStore::connect(&settings.mongo.mongodb_uri, &settings.mongo.database())
            .await
            .inspect_err(|e| {
                events.emit(&ServiceEvent::unavailable("mongodb", e));
            })
            .context("MongoDB connection failed")?,
    );
    events.emit(&ServiceEvent::connected("mongodb"));

    let cache: Arc<dyn KeyValueCache> = Arc::new(
        RedisCache::connect(&settings.redis_url)
            .await
            .inspect_err(|e| {
                events.emit(&ServiceEvent::unavailable("redis", e));
            })
            .context("Redis connection failed")?,
    );
    events.emit(&ServiceEvent::connected("redis"));

    let fallback_events = events.clone();
    let mut connector = RetryConnector::builder()
        .name("kafka")
        .policy(retry_policy)
        .on_fallback(move |attempts| {
            fallback_events.emit(&ServiceEvent::degraded(
                "kafka",
                format!("all {attempts} connection attempts failed, logging to the console"),
            ));
        })
        .build();

    let kafka = &settings.kafka;
    let sink = tokio::select! {
        outcome = connector.connect(|| KafkaPublisher::connect(kafka)) => outcome,
        _ = shutdown::signal() => {
            info!("Shutdown requested during startup");
            store.shutdown().await;
            events.emit(&ServiceEvent::closed("mongodb"));
            cache.shutdown().await;
            events.emit(&ServiceEvent::closed("redis"));
            return Ok(());
        }
    };
    if sink.is_connected() {
        events.emit(&ServiceEvent::connected("kafka"));
    }
    let sink: Connection<Arc<dyn LogPublisher>> =
        sink.map(|publisher| Arc::new(publisher) as Arc<dyn LogPublisher>);
    let logger = Arc::new(
        LogShipper::new(sink, kafka.kafka_log_topic.clone()).with_events(events.clone()),
    );

    let state = AppState {
        store: Arc::clone(&store),
        cache: Arc::clone(&cache),
        logger: Arc::clone(&logger),
    };
    let app = build_router(state);

    let addr = settings.bind_addr();
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;

    info!("Server is running on http://localhost:{}", settings.port);
    logger
        .info(
            "Server started successfully",
            Some(json!({ "port": settings.port, "environment": settings.environment })),
        )
        .await;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown::signal())
        .await
        .context("server error")?;

    info!("Shutting down gracefully...");
    logger.info("Server shutdown initiated", None).await;
    store.shutdown().await;
    events.emit(&ServiceEvent::closed("mongodb"));
    cache.shutdown().await;
    events.emit(&ServiceEvent::closed("redis"));
    if logger.is_connected() {
        logger.shutdown().await;
        events.emit(&ServiceEvent::closed("kafka"));
    }
    info!("All connections closed");

    Ok(())
}
