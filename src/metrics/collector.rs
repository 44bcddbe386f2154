use super::summary::{MetricsSummary, QueuingStats};
use crate::queue::QueuePolicy;
use crate::request::Request;
use crate::worker::Worker;

pub struct MetricsCollector {
    // Time between admission and start of service (seconds)
    queuing_samples: Vec<f64>,
    // Time between arrival and completion (seconds)
    latency_samples: Vec<f64>,

    // Processed requests per endpoint, by index
    endpoint_usage: Vec<u64>,

    start_time: f64,

    // Request tracking
    pub total_requests: u64,
    pub processed_requests: u64,
    pub rejected_requests: u64,
    pub faulted_requests: u64,
    pub unserved_requests: u64,
}

impl MetricsCollector {
    pub fn new(start_time: f64, num_endpoints: usize) -> Self {
        Self {
            queuing_samples: Vec::new(),
            latency_samples: Vec::new(),
            endpoint_usage: vec![0; num_endpoints],
            start_time,
            total_requests: 0,
            processed_requests: 0,
            rejected_requests: 0,
            faulted_requests: 0,
            unserved_requests: 0,
        }
    }

    /// Build a collector from a finished record list
    pub fn from_records(records: &[Request], start_time: f64, num_endpoints: usize) -> Self {
        let mut collector = Self::new(start_time, num_endpoints);
        collector.total_requests = records.len() as u64;
        for record in records {
            collector.record_request(record);
        }
        collector
    }

    /// Record a request that left the system, either processed or rejected
    pub fn record_request(&mut self, request: &Request) {
        if request.is_rejected() {
            self.rejected_requests += 1;
            return;
        }

        if let Some(queuing) = request.queuing_time() {
            self.queuing_samples.push(queuing);
        }
        if let Some(latency) = request.latency() {
            self.latency_samples.push(latency);
        }

        match request.endpoint_used {
            Some(endpoint) => {
                if endpoint >= self.endpoint_usage.len() {
                    self.endpoint_usage.resize(endpoint + 1, 0);
                }
                self.endpoint_usage[endpoint] += 1;
            }
            None => self.unserved_requests += 1,
        }
        if request.remote_fault {
            self.faulted_requests += 1;
        }

        self.processed_requests += 1;
    }

    /// Processed requests that an endpoint served
    pub fn succeeded_requests(&self) -> u64 {
        self.processed_requests - self.unserved_requests
    }

    pub fn get_queuing_samples(&self) -> &[f64] {
        &self.queuing_samples
    }

    pub fn get_latency_samples(&self) -> &[f64] {
        &self.latency_samples
    }

    /// Compute final summary statistics
    pub fn compute_summary(
        &self,
        current_time: f64,
        workers: &[Worker],
        queue: &QueuePolicy,
    ) -> MetricsSummary {
        let elapsed = current_time - self.start_time;
        let busy_time: f64 = workers.iter().map(|w| w.busy_time).sum();

        let (requests_per_sec, worker_utilization) = if elapsed > 0.0 {
            (
                self.processed_requests as f64 / elapsed,
                busy_time / (workers.len().max(1) as f64 * elapsed),
            )
        } else {
            (0.0, 0.0)
        };

        MetricsSummary {
            queuing: QueuingStats {
                mean: mean(&self.queuing_samples),
                p50: percentile(&self.queuing_samples, 0.50),
                p75: percentile(&self.queuing_samples, 0.75),
                p90: percentile(&self.queuing_samples, 0.90),
                p99: percentile(&self.queuing_samples, 0.99),
            },
            latency_mean: mean(&self.latency_samples),

            endpoint_usage: self.endpoint_usage.clone(),
            requests_per_sec,
            worker_utilization,
            simulated_time: elapsed.max(0.0),

            expedited_admitted: queue.expedited_admitted(),
            standard_admitted: queue.standard_admitted(),

            total_requests: self.total_requests,
            processed_requests: self.processed_requests,
            rejected_requests: self.rejected_requests,
            succeeded_requests: self.succeeded_requests(),
            faulted_requests: self.faulted_requests,
            unserved_requests: self.unserved_requests,
        }
    }
}

/// Percentile with linear interpolation between closest ranks
fn percentile(samples: &[f64], p: f64) -> Option<f64> {
    let mut sorted: Vec<f64> = samples.iter().filter(|x| !x.is_nan()).copied().collect();
    if sorted.is_empty() {
        return None;
    }
    sorted.sort_by(|a, b| a.total_cmp(b));

    let rank = (sorted.len() - 1) as f64 * p;
    let lo = rank.floor() as usize;
    let hi = rank.ceil() as usize;
    let frac = rank - lo as f64;
    Some(sorted[lo] + (sorted[hi] - sorted[lo]) * frac)
}

fn mean(samples: &[f64]) -> Option<f64> {
    let valid: Vec<f64> = samples.iter().filter(|x| x.is_finite()).copied().collect();
    if valid.is_empty() {
        return None;
    }
    Some(valid.iter().sum::<f64>() / valid.len() as f64)
}
