use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use prometheus::{IntCounter, IntCounterVec, Opts, Registry};
use std::sync::OnceLock;

pub static METRICS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();
pub static PROMETHEUS_REGISTRY: OnceLock<Registry> = OnceLock::new();
pub static SUBSCRIPTION_CALCULATIONS_TOTAL: OnceLock<IntCounterVec> = OnceLock::new();
pub static SUBSCRIPTION_RECALCULATIONS_TOTAL: OnceLock<IntCounter> = OnceLock::new();
pub static SUBSCRIPTION_ZERO_FEE_TOTAL: OnceLock<IntCounter> = OnceLock::new();

/// Install the metrics recorder and domain counters.
///
/// Safe to call more than once; only the first call installs anything.
pub fn init_metrics() {
    if METRICS_HANDLE.get().is_some() {
        return;
    }

    match PrometheusBuilder::new().install_recorder() {
        Ok(handle) => {
            let _ = METRICS_HANDLE.set(handle);
        }
        Err(e) => {
            tracing::warn!("Prometheus recorder not installed: {}", e);
        }
    }

    let registry = Registry::new();

    let calculations = IntCounterVec::new(
        Opts::new(
            "subscription_calculations_total",
            "Subscription fee calculations by source (cache or fresh)",
        ),
        &["source"],
    );
    let recalculations = IntCounter::new(
        "subscription_recalculations_total",
        "Explicit subscription recalculations",
    );
    let zero_fees = IntCounter::new(
        "subscription_zero_fee_total",
        "Reconciled subscriptions whose monthly fee resolved to zero",
    );

    match (calculations, recalculations, zero_fees) {
        (Ok(calculations), Ok(recalculations), Ok(zero_fees)) => {
            let registered = registry
                .register(Box::new(calculations.clone()))
                .and_then(|_| registry.register(Box::new(recalculations.clone())))
                .and_then(|_| registry.register(Box::new(zero_fees.clone())));
            if let Err(e) = registered {
                tracing::warn!("Failed to register subscription metrics: {}", e);
                return;
            }
            let _ = SUBSCRIPTION_CALCULATIONS_TOTAL.set(calculations);
            let _ = SUBSCRIPTION_RECALCULATIONS_TOTAL.set(recalculations);
            let _ = SUBSCRIPTION_ZERO_FEE_TOTAL.set(zero_fees);
            let _ = PROMETHEUS_REGISTRY.set(registry);
        }
        _ => tracing::warn!("Failed to create subscription metrics"),
    }
}

pub fn get_metrics() -> String {
    let mut output = METRICS_HANDLE
        .get()
        .map(|handle| handle.render())
        .unwrap_or_else(|| "# Metrics recorder not initialized\n".to_string());

    if let Some(registry) = PROMETHEUS_REGISTRY.get() {
        use prometheus::Encoder;
        let encoder = prometheus::TextEncoder::new();
        let metric_families = registry.gather();
        let mut buffer = Vec::new();
        encoder.encode(&metric_families, &mut buffer).ok();
        if let Ok(custom_metrics) = String::from_utf8(buffer) {
            output.push_str(&custom_metrics);
        }
    }

    output
}

/// Record a calculation served from the cache or computed fresh.
pub fn record_calculation(source: &str) {
    if let Some(counter) = SUBSCRIPTION_CALCULATIONS_TOTAL.get() {
        counter.with_label_values(&[source]).inc();
    }
}

pub fn record_recalculation() {
    if let Some(counter) = SUBSCRIPTION_RECALCULATIONS_TOTAL.get() {
        counter.inc();
    }
}

pub fn record_zero_fee() {
    if let Some(counter) = SUBSCRIPTION_ZERO_FEE_TOTAL.get() {
        counter.inc();
    }
}
