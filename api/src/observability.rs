use anyhow::Result;
use prometheus::Registry;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::LogFormat;
use crate::metrics;

pub const METRICS_PREFIX: &str = "docintake";

pub struct Observability {
    pub registry: Registry,
}

impl Observability {
    pub fn init(log_format: LogFormat) -> Result<Self> {
        let registry = Self::registry(METRICS_PREFIX)?;

        let env_filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| "api=debug,tower_http=debug".into());

        match log_format {
            LogFormat::Json => tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().json())
                .try_init()?,
            LogFormat::Pretty => tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer())
                .try_init()?,
        }

        tracing::info!("Observability stack initialized (Prometheus, {:?} logs)", log_format);
        Ok(Self { registry })
    }

    /// Prefixed registry with every service metric registered
    pub fn registry(prefix: &str) -> Result<Registry> {
        let registry = Registry::new_custom(Some(prefix.into()), None)?;
        metrics::register_all(&registry)?;
        Ok(registry)
    }
}
