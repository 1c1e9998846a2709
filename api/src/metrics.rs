use once_cell::sync::Lazy;
use prometheus::{opts, Encoder, HistogramOpts, HistogramVec, IntCounterVec, Registry, TextEncoder};

macro_rules! counter_vec {
    ($name:expr, $help:expr, $labels:expr) => {
        Lazy::new(|| IntCounterVec::new(opts!($name, $help), $labels).unwrap())
    };
}
macro_rules! histogram_vec {
    ($name:expr, $help:expr, $labels:expr) => {
        Lazy::new(|| {
            HistogramVec::new(HistogramOpts::new($name, $help).buckets(LATENCY_BUCKETS.to_vec()), $labels)
                .unwrap()
        })
    };
}

const LATENCY_BUCKETS: [f64; 12] = [
    0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0,
];

// ── HTTP ────────────────────────────────────────────────────────────────────
pub static HTTP_REQUESTS_TOTAL: Lazy<IntCounterVec> =
    counter_vec!("http_requests_total", "Total HTTP requests", &["method", "path", "status"]);
pub static HTTP_REQUEST_DURATION: Lazy<HistogramVec> =
    histogram_vec!("http_request_duration_seconds", "HTTP request latency", &["method", "path"]);

// ── Validation ──────────────────────────────────────────────────────────────
pub static DOCUMENTS_VALIDATED: Lazy<IntCounterVec> = counter_vec!(
    "documents_validated_total",
    "Document submissions by outcome",
    &["document", "outcome"]
);
pub static REFERENCE_LOOKUPS: Lazy<IntCounterVec> = counter_vec!(
    "reference_lookups_total",
    "Reference-data lookups by outcome",
    &["category", "outcome"]
);

pub fn register_all(r: &Registry) -> prometheus::Result<()> {
    r.register(Box::new(HTTP_REQUESTS_TOTAL.clone()))?;
    r.register(Box::new(HTTP_REQUEST_DURATION.clone()))?;
    r.register(Box::new(DOCUMENTS_VALIDATED.clone()))?;
    r.register(Box::new(REFERENCE_LOOKUPS.clone()))?;
    Ok(())
}

pub fn gather_metrics(r: &Registry) -> String {
    let encoder = TextEncoder::new();
    let families = r.gather();
    let mut buf = Vec::new();
    encoder.encode(&families, &mut buf).unwrap_or_default();
    String::from_utf8(buf).unwrap_or_default()
}

pub fn observe_http(method: &str, path: &str, status: u16, duration_secs: f64) {
    HTTP_REQUESTS_TOTAL
        .with_label_values(&[method, path, &status.to_string()])
        .inc();
    HTTP_REQUEST_DURATION
        .with_label_values(&[method, path])
        .observe(duration_secs);
}

pub fn observe_document(document: &str, accepted: bool) {
    let outcome = if accepted { "accepted" } else { "rejected" };
    DOCUMENTS_VALIDATED
        .with_label_values(&[document, outcome])
        .inc();
}

pub fn observe_reference_lookup(category: &str, outcome: &str) {
    REFERENCE_LOOKUPS
        .with_label_values(&[category, outcome])
        .inc();
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fresh_registry() -> Registry {
        let r = Registry::new_custom(Some("t".into()), None).unwrap();
        register_all(&r).unwrap();
        r
    }

    #[test]
    fn test_register_all_is_prefixed() {
        let r = fresh_registry();
        observe_document("passport", true);
        observe_reference_lookup("division", "found");
        observe_http("PUT", "/applications/:application_id/passport", 200, 0.002);

        let families = r.gather();
        assert!(!families.is_empty());
        for fam in &families {
            assert!(fam.get_name().starts_with("t_"), "metric {} missing prefix", fam.get_name());
        }
    }

    #[test]
    fn test_gather_metrics_text() {
        let r = fresh_registry();
        observe_document("pan", false);
        let text = gather_metrics(&r);
        assert!(text.contains("t_documents_validated_total"));
        assert!(text.contains("outcome=\"rejected\""));
        assert!(text.contains("# TYPE"));
    }
}
