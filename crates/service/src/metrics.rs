use once_cell::sync::Lazy;
use prometheus::{register_int_counter, register_int_counter_vec, Encoder, IntCounter, IntCounterVec, TextEncoder};

// Prometheus metrics (default registry)
pub static IDENTIFICATIONS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "voter_identifications_total",
        "Identification attempts by outcome",
        &["outcome"]
    )
    .expect("register identifications_total")
});

pub static VOTES_CAST_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!("votes_cast_total", "Votes durably recorded").expect("register votes_cast_total")
});

pub static VOTE_REJECTIONS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "vote_rejections_total",
        "Vote attempts that did not record a vote, by reason",
        &["reason"]
    )
    .expect("register vote_rejections_total")
});

pub static STORAGE_ERRORS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "voter_storage_errors_total",
        "Voter ledger load/save failures, by kind",
        &["kind"]
    )
    .expect("register voter_storage_errors_total")
});

/// Render the default registry in the Prometheus text format.
pub fn encode_metrics() -> Result<String, prometheus::Error> {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();
    encoder.encode(&metric_families, &mut buffer)?;
    Ok(String::from_utf8(buffer).unwrap_or_default())
}
