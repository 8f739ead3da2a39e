use crate::logger::LogShipper;
use crate::services::{DocumentStore, KeyValueCache};
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn DocumentStore>,
    pub cache: Arc<dyn KeyValueCache>,
    pub logger: Arc<LogShipper>,
}
