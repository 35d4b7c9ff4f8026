/*
 * Copyright (c) 2025 Hermod Contributors
 * Licensed under the MIT License.
 * See LICENSE file in the project root for full license text.
 */

//! # Metrics Module
//!
//! Prometheus metrics for the Hermod server: ingest volume, delivery
//! outcomes and latency, and retention sweep activity. Exposed in text
//! format at `/metrics`.

use once_cell::sync::Lazy;
use prometheus::{
    CounterVec, Encoder, Histogram, HistogramOpts, IntCounter, Opts, Registry, TextEncoder,
};

/// Global Prometheus registry for all server metrics
pub static REGISTRY: Lazy<Registry> = Lazy::new(Registry::new);

/// Total webhooks accepted by the ingest endpoint
pub static WEBHOOKS_INGESTED_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    let counter = IntCounter::new(
        "hermod_webhooks_ingested_total",
        "Total number of webhooks accepted for delivery",
    )
    .expect("Failed to create ingest counter");
    REGISTRY
        .register(Box::new(counter.clone()))
        .expect("Failed to register ingest counter");
    counter
});

/// Delivery attempt counter
/// Labels: outcome (success, retryable, permanent)
pub static DELIVERY_ATTEMPTS_TOTAL: Lazy<CounterVec> = Lazy::new(|| {
    let opts = Opts::new(
        "hermod_delivery_attempts_total",
        "Total number of delivery attempts by outcome",
    );
    let counter =
        CounterVec::new(opts, &["outcome"]).expect("Failed to create delivery attempts counter");
    REGISTRY
        .register(Box::new(counter.clone()))
        .expect("Failed to register delivery attempts counter");
    counter
});

/// Delivery latency histogram
pub static DELIVERY_DURATION_SECONDS: Lazy<Histogram> = Lazy::new(|| {
    let opts = HistogramOpts::new(
        "hermod_delivery_duration_seconds",
        "Outbound delivery latency distribution in seconds",
    )
    .buckets(vec![0.01, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0]);
    let histogram = Histogram::with_opts(opts).expect("Failed to create delivery histogram");
    REGISTRY
        .register(Box::new(histogram.clone()))
        .expect("Failed to register delivery histogram");
    histogram
});

/// Total delivery attempt rows purged by retention sweeps
pub static ATTEMPTS_PURGED_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    let counter = IntCounter::new(
        "hermod_attempts_purged_total",
        "Total number of delivery attempt rows removed by retention sweeps",
    )
    .expect("Failed to create purge counter");
    REGISTRY
        .register(Box::new(counter.clone()))
        .expect("Failed to register purge counter");
    counter
});

/// Encodes all registered metrics in Prometheus text format.
pub fn gather() -> String {
    let encoder = TextEncoder::new();
    let mut buffer = Vec::new();
    if encoder.encode(&REGISTRY.gather(), &mut buffer).is_err() {
        return String::new();
    }
    String::from_utf8(buffer).unwrap_or_default()
}
