//! Query result aggregation
//!
//! Results are owned data produced by the harness; the summary is derived
//! from the full result set each time it is requested and never mutates its
//! input.

use crate::resource::ResourceSnapshot;
use hdrhistogram::Histogram;
use sensegrid_core::Status;
use serde::Serialize;
use std::time::{Duration, Instant};

/// Outcome of one source-instructed query against a target
#[derive(Debug, Clone)]
pub enum QueryOutcome {
    Success { rows: Vec<serde_json::Value> },
    Error { message: String },
}

/// One (source, target) query measurement
#[derive(Debug, Clone)]
pub struct QueryResult {
    pub source: String,
    pub target: String,
    pub latency: Duration,
    pub outcome: QueryOutcome,
}

impl QueryResult {
    pub fn is_success(&self) -> bool {
        matches!(self.outcome, QueryOutcome::Success { .. })
    }

    pub fn status(&self) -> Status {
        if self.is_success() {
            Status::Success
        } else {
            Status::Error
        }
    }

    pub fn row_count(&self) -> usize {
        match &self.outcome {
            QueryOutcome::Success { rows } => rows.len(),
            QueryOutcome::Error { .. } => 0,
        }
    }
}

/// Latency distribution statistics, microsecond resolution
#[derive(Debug, Clone, Default, Serialize)]
pub struct LatencyStats {
    pub count: u64,
    pub min_us: u64,
    pub max_us: u64,
    pub mean_us: u64,
    pub p50_us: u64,
    pub p95_us: u64,
    pub p99_us: u64,
}

impl LatencyStats {
    /// Formats latency as a human-readable string.
    pub fn format_ms(&self) -> String {
        if self.count == 0 {
            "N/A".to_string()
        } else {
            format!(
                "p50={:.1}ms p95={:.1}ms p99={:.1}ms",
                self.p50_us as f64 / 1000.0,
                self.p95_us as f64 / 1000.0,
                self.p99_us as f64 / 1000.0
            )
        }
    }
}

/// Aggregated outcome of one query round
#[derive(Debug, Clone, Serialize)]
pub struct Summary {
    pub total_elapsed: Duration,
    /// Arithmetic mean of recorded latencies; `None` when no results exist
    pub average_latency: Option<Duration>,
    pub result_count: usize,
    pub success_count: usize,
    pub error_count: usize,
    pub latency: LatencyStats,
    pub resources: ResourceSnapshot,
}

/// Aggregate query results into a run summary
pub fn summarize(
    results: &[QueryResult],
    started_at: Instant,
    resources: ResourceSnapshot,
) -> Summary {
    let mut histogram =
        Histogram::<u64>::new_with_bounds(1, 60_000_000, 3).expect("static histogram bounds");
    let mut total_latency = Duration::ZERO;
    let mut success_count = 0;
    let mut error_count = 0;

    for result in results {
        total_latency += result.latency;
        let _ = histogram.record(result.latency.as_micros() as u64);
        match result.status() {
            Status::Success => success_count += 1,
            Status::Error => error_count += 1,
        }
    }

    let average_latency = if results.is_empty() {
        None
    } else {
        Some(total_latency / results.len() as u32)
    };

    Summary {
        total_elapsed: started_at.elapsed(),
        average_latency,
        result_count: results.len(),
        success_count,
        error_count,
        latency: compute_latency_stats(&histogram),
        resources,
    }
}

/// Computes latency statistics from a histogram.
fn compute_latency_stats(histogram: &Histogram<u64>) -> LatencyStats {
    if histogram.is_empty() {
        return LatencyStats::default();
    }

    LatencyStats {
        count: histogram.len(),
        min_us: histogram.min(),
        max_us: histogram.max(),
        mean_us: histogram.mean() as u64,
        p50_us: histogram.value_at_quantile(0.50),
        p95_us: histogram.value_at_quantile(0.95),
        p99_us: histogram.value_at_quantile(0.99),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resource::ResourceProbe;

    fn result(source: &str, target: &str, latency_ms: u64, ok: bool) -> QueryResult {
        QueryResult {
            source: source.to_string(),
            target: target.to_string(),
            latency: Duration::from_millis(latency_ms),
            outcome: if ok {
                QueryOutcome::Success {
                    rows: vec![serde_json::json!({"id": target})],
                }
            } else {
                QueryOutcome::Error {
                    message: "unreachable".to_string(),
                }
            },
        }
    }

    #[test]
    fn test_summarize_empty_results() {
        let probe = ResourceProbe::start();
        let summary = summarize(&[], Instant::now(), probe.snapshot());

        assert_eq!(summary.result_count, 0);
        assert_eq!(summary.average_latency, None);
        assert_eq!(summary.success_count, 0);
        assert_eq!(summary.error_count, 0);
        assert_eq!(summary.latency.format_ms(), "N/A");
    }

    #[test]
    fn test_summarize_counts_and_mean() {
        let results = vec![
            result("a", "b", 10, true),
            result("b", "a", 20, true),
            result("a", "c", 30, false),
            result("c", "a", 40, true),
        ];

        let probe = ResourceProbe::start();
        let summary = summarize(&results, Instant::now(), probe.snapshot());

        assert_eq!(summary.result_count, 4);
        assert_eq!(summary.success_count, 3);
        assert_eq!(summary.error_count, 1);
        assert_eq!(summary.average_latency, Some(Duration::from_millis(25)));
        assert_eq!(summary.latency.count, 4);
        assert!(summary.latency.max_us >= 40_000);
    }

    #[test]
    fn test_summarize_does_not_mutate_results() {
        let results = vec![result("a", "b", 5, true)];
        let before = results.clone();

        let probe = ResourceProbe::start();
        let _ = summarize(&results, Instant::now(), probe.snapshot());
        let _ = summarize(&results, Instant::now(), probe.snapshot());

        assert_eq!(results.len(), before.len());
        assert_eq!(results[0].latency, before[0].latency);
    }

    #[test]
    fn test_query_result_accessors() {
        let ok = result("a", "b", 1, true);
        assert_eq!(ok.status(), Status::Success);
        assert_eq!(ok.row_count(), 1);

        let err = result("a", "b", 1, false);
        assert_eq!(err.status(), Status::Error);
        assert_eq!(err.row_count(), 0);
    }
}
