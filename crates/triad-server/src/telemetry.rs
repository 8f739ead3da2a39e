use crate::config::LogFormat;
use tracing_subscriber::{fmt, EnvFilter};
use triad_core::{EventListener, EventListeners, LifecycleEvent, ServiceChange, ServiceEvent};

/// Installs the global subscriber.
///
/// `RUST_LOG` wins over the configured filter.
pub fn init(log_filter: &str, format: LogFormat) {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_filter));

    match format {
        LogFormat::Json => fmt()
            .with_env_filter(env_filter)
            .json()
            .with_current_span(true)
            .with_span_list(true)
            .init(),
        LogFormat::Pretty => fmt().with_env_filter(env_filter).with_target(false).init(),
    }
}

/// Writes backing-service lifecycle events to the diagnostics log.
#[derive(Debug, Clone, Copy, Default)]
pub struct ServiceEventLog;

impl EventListener<ServiceEvent> for ServiceEventLog {
    fn on_event(&self, event: &ServiceEvent) {
        let service = event.service();
        match event.change() {
            ServiceChange::Connected => tracing::info!(service, "{service} connected"),
            ServiceChange::Unavailable { error } => {
                tracing::error!(service, %error, "{service} unavailable")
            }
            ServiceChange::Degraded { reason } => {
                tracing::warn!(service, %reason, "continuing without {service}")
            }
            ServiceChange::Closed => tracing::info!(service, "{service} connection closed"),
        }
    }
}

/// Listeners every server process installs.
pub fn service_listeners() -> EventListeners<ServiceEvent> {
    EventListeners::new().with(ServiceEventLog)
}
