use super::clock::Clock;
use super::telemetry::{TelemetryPoint, TelemetryRecorder};
use crate::config::Config;
use crate::error::SimError;
use crate::gateway::Gateway;
use crate::metrics::{MetricsCollector, MetricsSummary};
use crate::queue::QueuePolicy;
use crate::request::Request;
use crate::worker::Worker;
use log::{debug, error, info, trace};
use ordered_float::OrderedFloat;
use rand::{rngs::StdRng, SeedableRng};
use std::collections::VecDeque;

const DEFAULT_TELEMETRY_INTERVAL: f64 = 60.0;
const DEFAULT_LOG_INTERVAL: u64 = 1000;

pub struct ProgressInfo<'a> {
    pub current_time: f64,
    pub finished_requests: u64,
    pub total_requests: u64,
    pub queued: usize,
    pub busy_workers: usize,
    pub point: &'a TelemetryPoint,
    pub time_series: &'a [TelemetryPoint],
}

/// Discrete-event driver for the worker pool.
///
/// Owns the pending arrivals, the queue, the gateway and the workers. The
/// clock jumps from event to event (next arrival or next completion); at each
/// instant the driver admits arrivals and steps every worker until nothing
/// changes.
pub struct Simulator {
    /// Requests not yet arrived, in arrival order
    pending: VecDeque<Request>,
    queue: QueuePolicy,
    gateway: Gateway,
    workers: Vec<Worker>,
    clock: Clock,

    /// Processed and rejected requests, in the order they left the system
    records: Vec<Request>,
    metrics: MetricsCollector,
    telemetry: TelemetryRecorder,

    iteration: u64,
    log_interval: u64,
}

impl Simulator {
    /// Build the queue, gateway and worker pool described by `config`.
    ///
    /// Queue selection and fault injection draw from separate streams derived
    /// from the configured seed.
    pub fn new(requests: Vec<Request>, config: &Config) -> Result<Self, SimError> {
        config.validate()?;

        let seed = config.simulation.seed;
        let queue = QueuePolicy::from_config(&config.queue, StdRng::seed_from_u64(seed))?;
        let gateway = Gateway::from_config(
            &config.gateway,
            StdRng::seed_from_u64(seed.wrapping_add(1)),
        );

        let mut simulator =
            Self::with_components(requests, config.simulation.num_workers, queue, gateway)?;
        simulator.telemetry =
            TelemetryRecorder::new(config.simulation.telemetry_interval, simulator.clock.now());
        simulator.log_interval = config.simulation.log_interval.max(1);
        Ok(simulator)
    }

    /// Assemble a simulator from prebuilt parts
    pub fn with_components(
        mut requests: Vec<Request>,
        num_workers: usize,
        queue: QueuePolicy,
        gateway: Gateway,
    ) -> Result<Self, SimError> {
        if num_workers == 0 {
            return Err(SimError::Configuration(
                "num_workers must be at least 1".to_string(),
            ));
        }
        for request in &requests {
            validate_request(request)?;
        }

        requests.sort_by_key(|r| OrderedFloat(r.arrival_time));
        let start_time = requests.first().map(|r| r.arrival_time).unwrap_or(0.0);

        let mut metrics = MetricsCollector::new(start_time, gateway.num_endpoints());
        metrics.total_requests = requests.len() as u64;

        Ok(Self {
            pending: requests.into(),
            queue,
            gateway,
            workers: (0..num_workers).map(Worker::new).collect(),
            clock: Clock::new(start_time),
            records: Vec::new(),
            metrics,
            telemetry: TelemetryRecorder::new(DEFAULT_TELEMETRY_INTERVAL, start_time),
            iteration: 0,
            log_interval: DEFAULT_LOG_INTERVAL,
        })
    }

    /// Run the simulation to completion
    pub fn run(&mut self) -> Result<Vec<Request>, SimError> {
        self.run_with_callback(|_| {})
    }

    /// Run the simulation, handing every telemetry point to `callback`.
    ///
    /// Returns processed requests by completion time, then rejected requests,
    /// ties broken by admission time.
    pub fn run_with_callback<F>(&mut self, mut callback: F) -> Result<Vec<Request>, SimError>
    where
        F: FnMut(ProgressInfo),
    {
        info!(
            "Starting simulation: {} requests, {} workers, {:?} queue, {} endpoints",
            self.pending.len(),
            self.workers.len(),
            self.queue.discipline(),
            self.gateway.num_endpoints()
        );

        loop {
            self.drain();

            let Some(next) = self.next_event_time() else {
                if self.has_outstanding_work() {
                    return Err(self.stalled());
                }
                break;
            };

            self.sample_until(next, &mut callback);
            if !self.clock.advance_to(next) {
                return Err(self.stalled());
            }
            self.iteration += 1;
            trace!("Clock advanced to t={:.4}", next);

            if self.iteration % self.log_interval == 0 {
                self.log_progress();
            }
        }

        let now = self.clock.now();
        let point = self.snapshot(now);
        self.telemetry.record_final(point);
        self.notify(&mut callback);

        self.records.sort_by_key(|r| {
            (
                r.is_rejected(),
                OrderedFloat(r.completion_time.unwrap_or(f64::INFINITY)),
                OrderedFloat(r.enqueue_time.unwrap_or(f64::INFINITY)),
            )
        });

        info!(
            "Simulation complete at t={:.2}: {} processed, {} rejected, {} without endpoint",
            now,
            self.metrics.processed_requests,
            self.metrics.rejected_requests,
            self.metrics.unserved_requests
        );
        Ok(self.records.clone())
    }

    /// Admit arrivals and step workers at the current instant until a full
    /// pass changes nothing
    fn drain(&mut self) {
        let now = self.clock.now();
        loop {
            let mut progressed = false;

            while self.pending.front().is_some_and(|r| r.arrival_time <= now) {
                if let Some(request) = self.pending.pop_front() {
                    self.admit(request, now);
                    progressed = true;
                }
            }

            let mut finished = Vec::new();
            for worker in &mut self.workers {
                let had_task = worker.has_task();
                match worker.advance(now, &mut self.queue, &mut self.gateway) {
                    Some(done) => {
                        finished.push(done);
                        progressed = true;
                    }
                    None if !had_task && worker.has_task() => progressed = true,
                    None => {}
                }
            }
            for done in finished {
                self.finish(done);
            }

            if !progressed {
                break;
            }
        }
    }

    fn admit(&mut self, mut request: Request, now: f64) {
        request.mark_enqueued(now);
        if let Err(mut rejected) = self.queue.classify_and_enqueue(request) {
            rejected.mark_rejected(now);
            debug!(
                "Rejected {} at t={:.2}: queue full ({} waiting)",
                rejected.request_id,
                now,
                self.queue.len()
            );
            self.finish(rejected);
        }
    }

    fn finish(&mut self, record: Request) {
        self.metrics.record_request(&record);
        self.records.push(record);
    }

    /// Earliest pending arrival or busy-worker completion
    fn next_event_time(&self) -> Option<f64> {
        let next_arrival = self.pending.front().map(|r| r.arrival_time);
        let completions = self.workers.iter().filter_map(|w| w.busy_until());
        next_arrival
            .into_iter()
            .chain(completions)
            .map(OrderedFloat)
            .min()
            .map(OrderedFloat::into_inner)
    }

    fn has_outstanding_work(&self) -> bool {
        !self.pending.is_empty() || !self.queue.is_empty() || self.workers.iter().any(Worker::has_task)
    }

    fn stalled(&self) -> SimError {
        let err = SimError::Stalled {
            time: self.clock.now(),
            pending: self.pending.len(),
            queued: self.queue.len(),
            in_service: self.workers.iter().filter(|w| w.has_task()).count(),
        };
        error!("{}", err);
        err
    }

    /// Record telemetry for every interval boundary before `until`
    fn sample_until<F>(&mut self, until: f64, callback: &mut F)
    where
        F: FnMut(ProgressInfo),
    {
        // Between events only the gateway windows change, and they empty out
        let steady_from = self
            .gateway
            .window_clears_at()
            .unwrap_or(f64::NEG_INFINITY);
        while let Some(boundary) = self.telemetry.due_before(until) {
            let point = self.snapshot(boundary);
            self.telemetry.record(point);
            self.notify(callback);
            if boundary >= steady_from {
                self.telemetry.skip_to_last_before(until);
            }
        }
    }

    fn snapshot(&self, time: f64) -> TelemetryPoint {
        TelemetryPoint {
            time,
            expedited_depth: self.queue.expedited_depth(),
            standard_depth: self.queue.standard_depth(),
            busy_workers: self.workers.iter().filter(|w| w.is_busy(time)).count(),
            cumulative_rejected: self.metrics.rejected_requests,
            cumulative_succeeded: self.metrics.succeeded_requests(),
            cumulative_faulted: self.metrics.faulted_requests,
            gateway_calls_per_minute: self.gateway.calls_per_minute(time),
        }
    }

    fn notify<F>(&self, callback: &mut F)
    where
        F: FnMut(ProgressInfo),
    {
        if let Some(point) = self.telemetry.latest() {
            callback(ProgressInfo {
                current_time: point.time,
                finished_requests: self.records.len() as u64,
                total_requests: self.metrics.total_requests,
                queued: self.queue.len(),
                busy_workers: point.busy_workers,
                point,
                time_series: self.telemetry.points(),
            });
        }
    }

    pub fn get_metrics_summary(&self) -> MetricsSummary {
        self.metrics
            .compute_summary(self.clock.now(), &self.workers, &self.queue)
    }

    pub fn get_time_series_data(&self) -> &[TelemetryPoint] {
        self.telemetry.points()
    }

    pub fn get_current_time(&self) -> f64 {
        self.clock.now()
    }

    pub fn records(&self) -> &[Request] {
        &self.records
    }

    pub fn workers(&self) -> &[Worker] {
        &self.workers
    }

    pub fn gateway(&self) -> &Gateway {
        &self.gateway
    }

    pub fn queue(&self) -> &QueuePolicy {
        &self.queue
    }

    fn log_progress(&self) {
        info!(
            "[t={:.2}] step {}: {}/{} finished, {} queued, {} busy workers",
            self.clock.now(),
            self.iteration,
            self.records.len(),
            self.metrics.total_requests,
            self.queue.len(),
            self.workers
                .iter()
                .filter(|w| w.is_busy(self.clock.now()))
                .count()
        );
    }
}

fn validate_request(request: &Request) -> Result<(), SimError> {
    let invalid = |reason: String| SimError::InvalidRequest {
        id: request.request_id.clone(),
        reason,
    };
    if !(request.arrival_time.is_finite() && request.arrival_time >= 0.0) {
        return Err(invalid(format!(
            "arrival time {} must be finite and non-negative",
            request.arrival_time
        )));
    }
    if !request.has_usable_duration() {
        return Err(invalid(format!(
            "service duration {} must be finite and non-negative",
            request.service_duration
        )));
    }
    Ok(())
}
