//! Performance report generation

use sensegrid_core::{QueryExpr, Status, Topology};
use sensegrid_dispatch::{QueryOutcome, QueryResult, RunReport, Summary};
use serde::Serialize;

/// Outcome of one (source, target) query, flattened for rendering
#[derive(Debug, Clone, Serialize)]
pub struct PairOutcome {
    pub source: String,
    pub target: String,
    pub latency_ms: f64,
    pub status: Status,
    /// Row count on success, error text otherwise
    pub detail: String,
}

impl PairOutcome {
    fn from_result(result: &QueryResult) -> Self {
        let detail = match &result.outcome {
            QueryOutcome::Success { rows } => format!("{} rows", rows.len()),
            QueryOutcome::Error { message } => message.clone(),
        };

        Self {
            source: result.source.clone(),
            target: result.target.clone(),
            latency_ms: result.latency.as_secs_f64() * 1000.0,
            status: result.status(),
            detail,
        }
    }
}

/// Complete simulation report
#[derive(Debug, Serialize)]
pub struct Report {
    // Topology
    pub node_count: usize,
    pub edge_count: usize,
    /// Operator query in its display form
    pub query: String,

    // Dispatch statistics
    pub telemetry_seeded: usize,
    pub telemetry_failures: usize,
    pub edges_delivered: usize,
    pub edge_failures: usize,

    // Query round
    pub pairs: Vec<PairOutcome>,
    pub summary: Summary,
}

impl Report {
    pub fn build(
        topology: &Topology,
        run: &RunReport,
        summary: Summary,
        expression: &QueryExpr,
    ) -> Self {
        Self {
            node_count: topology.node_count(),
            edge_count: topology.edge_count(),
            query: expression.to_string(),
            telemetry_seeded: run.telemetry.succeeded,
            telemetry_failures: run.telemetry.failed(),
            edges_delivered: run.edges.succeeded,
            edge_failures: run.edges.failed(),
            pairs: run.results.iter().map(PairOutcome::from_result).collect(),
            summary,
        }
    }

    fn total_failures(&self) -> usize {
        self.telemetry_failures + self.edge_failures + self.summary.error_count
    }

    fn average_latency_ms(&self) -> Option<f64> {
        self.summary
            .average_latency
            .map(|d| d.as_secs_f64() * 1000.0)
    }

    /// Generates a markdown report.
    pub fn to_markdown(&self) -> String {
        let mut md = String::new();

        md.push_str("# SenseGrid Simulation Report\n\n");

        md.push_str("## Topology\n\n");
        md.push_str("| Setting | Value |\n");
        md.push_str("|---------|-------|\n");
        md.push_str(&format!("| Nodes | {} |\n", self.node_count));
        md.push_str(&format!("| Edges | {} |\n", self.edge_count));
        md.push_str(&format!("| Query | `{}` |\n", self.query));
        md.push('\n');

        md.push_str("## Dispatch\n\n");
        md.push_str("| Phase | Succeeded | Failed |\n");
        md.push_str("|-------|-----------|--------|\n");
        md.push_str(&format!(
            "| Telemetry | {} | {} |\n",
            self.telemetry_seeded, self.telemetry_failures
        ));
        md.push_str(&format!(
            "| Edges | {} | {} |\n",
            self.edges_delivered, self.edge_failures
        ));
        md.push('\n');

        md.push_str("## Query Round\n\n");
        md.push_str("| Metric | Value |\n");
        md.push_str("|--------|-------|\n");
        md.push_str(&format!("| Results | {} |\n", self.summary.result_count));
        md.push_str(&format!("| Success | {} |\n", self.summary.success_count));
        md.push_str(&format!("| Errors | {} |\n", self.summary.error_count));
        match self.average_latency_ms() {
            Some(avg) => md.push_str(&format!("| Avg Latency | {:.2}ms |\n", avg)),
            None => md.push_str("| Avg Latency | N/A |\n"),
        }
        md.push_str(&format!(
            "| Latency Distribution | {} |\n",
            self.summary.latency.format_ms()
        ));
        md.push_str(&format!(
            "| Total Elapsed | {:.2}s |\n",
            self.summary.total_elapsed.as_secs_f64()
        ));
        md.push('\n');

        if !self.pairs.is_empty() {
            md.push_str("### Pair Outcomes\n\n");
            md.push_str("| Source | Target | Latency | Status | Detail |\n");
            md.push_str("|--------|--------|---------|--------|--------|\n");
            for pair in &self.pairs {
                md.push_str(&format!(
                    "| {} | {} | {:.1}ms | {} | {} |\n",
                    pair.source, pair.target, pair.latency_ms, pair.status, pair.detail
                ));
            }
            md.push('\n');
        }

        md.push_str("## Resources\n\n");
        md.push_str("| Metric | Value |\n");
        md.push_str("|--------|-------|\n");
        md.push_str(&format!(
            "| CPU | {:.0}% of one core |\n",
            self.summary.resources.cpu_ratio * 100.0
        ));
        md.push_str(&format!(
            "| RSS | {} |\n",
            format_bytes(self.summary.resources.rss_bytes.max(0) as u64)
        ));
        md.push_str(&format!("| Cores | {} |\n", self.summary.resources.cores));
        md.push('\n');

        md.push_str("## Summary\n\n");
        if self.total_failures() > 0 {
            md.push_str(&format!(
                "⚠️ **{} units failed during the run**\n",
                self.total_failures()
            ));
        } else {
            md.push_str("✅ **Run completed without errors**\n");
        }

        md
    }

    /// Generates a JSON report.
    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_else(|_| "{}".to_string())
    }

    /// Prints a summary to stdout.
    pub fn print_summary(&self) {
        println!("\n{}", "=".repeat(60));
        println!("PERFORMANCE SUMMARY");
        println!("{}", "=".repeat(60));

        println!(
            "\nNodes: {} | Edges: {} | Query: {}",
            self.node_count, self.edge_count, self.query
        );

        println!(
            "\nDispatch: {} telemetry, {} edges delivered",
            self.telemetry_seeded, self.edges_delivered
        );
        if self.telemetry_failures + self.edge_failures > 0 {
            println!(
                "   Failures: {} telemetry, {} edges",
                self.telemetry_failures, self.edge_failures
            );
        }

        println!(
            "\nQueries: {} total, {} ok, {} errors",
            self.summary.result_count, self.summary.success_count, self.summary.error_count
        );
        match self.average_latency_ms() {
            Some(avg) => println!("   Avg latency: {:.2}ms", avg),
            None => println!("   Avg latency: N/A"),
        }
        println!("   Distribution: {}", self.summary.latency.format_ms());

        println!(
            "\nTotal time: {:.2}s | CPU: {:.0}% | RSS: {}",
            self.summary.total_elapsed.as_secs_f64(),
            self.summary.resources.cpu_ratio * 100.0,
            format_bytes(self.summary.resources.rss_bytes.max(0) as u64)
        );

        println!("\n{}", "=".repeat(60));
    }
}

/// Formats bytes in human-readable form.
fn format_bytes(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes >= GB {
        format!("{:.2} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.2} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.2} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sensegrid_core::{build_topology, FieldValue, NodeRecord, NodeType, QueryOp};
    use sensegrid_dispatch::{summarize, PhaseReport, ResourceProbe};
    use std::time::{Duration, Instant};

    fn sample_report(results: Vec<QueryResult>) -> Report {
        let topology = build_topology(vec![
            NodeRecord::new("n1", NodeType::Highway, Default::default()),
            NodeRecord::new("n2", NodeType::Default, Default::default()),
        ]);
        let run = RunReport {
            telemetry: PhaseReport {
                attempted: 2,
                succeeded: 2,
                failures: vec![],
            },
            edges: PhaseReport {
                attempted: 2,
                succeeded: 2,
                failures: vec![],
            },
            results,
            started_at: Instant::now(),
        };
        let probe = ResourceProbe::start();
        let summary = summarize(&run.results, run.started_at, probe.snapshot());
        let expression = QueryExpr::new("emergency_cars", QueryOp::Eq, FieldValue::Boolean(true));
        Report::build(&topology, &run, summary, &expression)
    }

    fn ok_result(source: &str, target: &str) -> QueryResult {
        QueryResult {
            source: source.to_string(),
            target: target.to_string(),
            latency: Duration::from_millis(12),
            outcome: QueryOutcome::Success {
                rows: vec![serde_json::json!({"id": target})],
            },
        }
    }

    #[test]
    fn test_markdown_with_results() {
        let report = sample_report(vec![ok_result("n1", "n2"), ok_result("n2", "n1")]);
        let md = report.to_markdown();

        assert!(md.contains("# SenseGrid Simulation Report"));
        assert!(md.contains("| Nodes | 2 |"));
        assert!(md.contains("### Pair Outcomes"));
        assert!(md.contains("| n1 | n2 |"));
        assert!(md.contains("Run completed without errors"));
    }

    #[test]
    fn test_markdown_empty_round_reports_na() {
        let report = sample_report(vec![]);
        let md = report.to_markdown();

        assert!(md.contains("| Avg Latency | N/A |"));
        assert!(!md.contains("### Pair Outcomes"));
    }

    #[test]
    fn test_failures_flagged_in_summary_line() {
        let mut report = sample_report(vec![ok_result("n1", "n2")]);
        report.edge_failures = 3;
        let md = report.to_markdown();
        assert!(md.contains("3 units failed") || md.contains("failed during the run"));
    }

    #[test]
    fn test_json_round_trips() {
        let report = sample_report(vec![ok_result("n1", "n2")]);
        let json = report.to_json();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["node_count"], 2);
        assert_eq!(value["pairs"].as_array().unwrap().len(), 1);
        assert_eq!(value["summary"]["result_count"], 1);
    }

    #[test]
    fn test_format_bytes() {
        assert_eq!(format_bytes(0), "0 B");
        assert_eq!(format_bytes(512), "512 B");
        assert_eq!(format_bytes(1024), "1.00 KB");
        assert_eq!(format_bytes(1048576), "1.00 MB");
        assert_eq!(format_bytes(1073741824), "1.00 GB");
    }
}
