use prometheus::Registry;
use shared::ValidationSettings;
use std::sync::Arc;
use std::time::Instant;

use crate::config::{AppConfig, ReferenceConfig};
use crate::reference::{CachedReferenceLookup, HttpReferenceLookup, ReferenceLookup};
use crate::validation::RuleBook;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub started_at: Instant,
    pub rules: Arc<RuleBook>,
    pub lookup: Arc<dyn ReferenceLookup>,
    pub registry: Registry,
}

impl AppState {
    pub fn new(
        settings: &ValidationSettings,
        lookup: Arc<dyn ReferenceLookup>,
        registry: Registry,
    ) -> Self {
        Self {
            started_at: Instant::now(),
            rules: Arc::new(RuleBook::new(settings)),
            lookup,
            registry,
        }
    }

    pub fn from_config(config: &AppConfig, registry: Registry) -> Self {
        Self::new(&config.validation, reference_lookup(&config.reference), registry)
    }
}

/// HTTP lookup against the reference-data service, cached when a TTL is set
pub fn reference_lookup(config: &ReferenceConfig) -> Arc<dyn ReferenceLookup> {
    let http: Arc<dyn ReferenceLookup> =
        Arc::new(HttpReferenceLookup::new(config.base_url.clone(), config.timeout));

    if config.cache_ttl.is_zero() {
        return http;
    }

    tracing::info!(
        "Reference lookup cache enabled: ttl={:?}, capacity={}",
        config.cache_ttl,
        config.cache_capacity
    );
    Arc::new(CachedReferenceLookup::new(http, config.cache_ttl, config.cache_capacity))
}
