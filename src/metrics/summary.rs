/// Queuing-time statistics in seconds; `None` when nothing was processed
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueuingStats {
    pub mean: Option<f64>,
    pub p50: Option<f64>,
    pub p75: Option<f64>,
    pub p90: Option<f64>,
    pub p99: Option<f64>,
}

/// Summary of all metrics from the simulation
#[derive(Debug, Clone)]
pub struct MetricsSummary {
    pub queuing: QueuingStats,

    /// Mean arrival-to-completion time (seconds)
    pub latency_mean: Option<f64>,

    /// Processed requests per endpoint, by index
    pub endpoint_usage: Vec<u64>,

    // Throughput and utilization over the simulated span
    pub requests_per_sec: f64,
    pub worker_utilization: f64,
    pub simulated_time: f64,

    // Lifetime queue admissions per class
    pub expedited_admitted: u64,
    pub standard_admitted: u64,

    // Request counts
    pub total_requests: u64,
    pub processed_requests: u64,
    pub rejected_requests: u64,
    pub succeeded_requests: u64,
    pub faulted_requests: u64,
    pub unserved_requests: u64,
}

/// Three-decimal rendering of an optional statistic, `n/a` when absent
pub fn fmt_opt(value: Option<f64>) -> String {
    value
        .map(|v| format!("{:.3}", v))
        .unwrap_or_else(|| "n/a".to_string())
}

impl MetricsSummary {
    pub fn print(&self) {
        println!("\n=== Final Metrics ===\n");

        println!("Queuing Time (s):");
        println!(
            "  mean={}, p50={}, p75={}, p90={}, p99={}",
            fmt_opt(self.queuing.mean),
            fmt_opt(self.queuing.p50),
            fmt_opt(self.queuing.p75),
            fmt_opt(self.queuing.p90),
            fmt_opt(self.queuing.p99),
        );
        println!("  End-to-end latency mean: {}", fmt_opt(self.latency_mean));

        println!("\nGateway Usage:");
        for (endpoint, calls) in self.endpoint_usage.iter().enumerate() {
            println!("  Endpoint {}: {} requests", endpoint, calls);
        }
        println!("  Unserved:   {}", self.unserved_requests);
        println!("  Faulted:    {}", self.faulted_requests);

        println!("\nQueues:");
        println!("  Expedited admitted: {}", self.expedited_admitted);
        println!("  Standard admitted:  {}", self.standard_admitted);

        println!("\nThroughput:");
        println!("  Requests/sec:       {:.3}", self.requests_per_sec);
        println!("  Worker utilization: {:.1}%", self.worker_utilization * 100.0);

        println!("\nRequest Statistics:");
        println!(
            "  Processed: {}/{} ({} rejected)",
            self.processed_requests, self.total_requests, self.rejected_requests
        );
        println!("  Simulated time: {:.2}s", self.simulated_time);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fmt_opt() {
        assert_eq!(fmt_opt(Some(1.23456)), "1.235");
        assert_eq!(fmt_opt(Some(0.0)), "0.000");
        assert_eq!(fmt_opt(None), "n/a");
    }
}
