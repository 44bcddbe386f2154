use super::endpoint::{Endpoint, EndpointId};
use crate::config::GatewayConfig;
use crate::request::Request;
use log::{debug, warn};
use rand::{rngs::StdRng, Rng};

/// Result of one gateway attempt cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GatewayOutcome {
    /// An endpoint answered successfully
    Served { endpoint: EndpointId },
    /// Every endpoint was throttled or faulted.
    /// `remote_fault` is the request's fault flag after the cycle.
    Exhausted { remote_fault: bool },
}

impl GatewayOutcome {
    pub fn endpoint(&self) -> Option<EndpointId> {
        match self {
            GatewayOutcome::Served { endpoint } => Some(*endpoint),
            GatewayOutcome::Exhausted { .. } => None,
        }
    }

    pub fn is_served(&self) -> bool {
        matches!(self, GatewayOutcome::Served { .. })
    }
}

/// Rate-limited front for a set of simulated external endpoints.
///
/// Calls rotate round-robin starting after the last endpoint that served a
/// request. An endpoint over its window limit is skipped; an admitted call
/// may fail with a simulated server error, in which case the next endpoint
/// is tried. One instance is shared by the whole worker pool.
pub struct Gateway {
    endpoints: Vec<Endpoint>,

    /// Index the next attempt cycle starts from
    cursor: usize,

    /// Probability that an admitted call fails
    fault_probability: f64,

    window_secs: f64,

    /// Fault injection stream
    rng: StdRng,

    /// Attempt cycles that found no endpoint
    pub exhausted: u64,
}

impl Gateway {
    pub fn new(
        num_endpoints: usize,
        rate_limit: usize,
        window_secs: f64,
        fault_probability: f64,
        rng: StdRng,
    ) -> Self {
        Self {
            endpoints: (0..num_endpoints)
                .map(|id| Endpoint::new(id, rate_limit, window_secs))
                .collect(),
            cursor: 0,
            fault_probability,
            window_secs,
            rng,
            exhausted: 0,
        }
    }

    pub fn from_config(config: &GatewayConfig, rng: StdRng) -> Self {
        Self::new(
            config.num_endpoints,
            config.rate_limit_per_minute,
            config.window_secs,
            config.fault_probability,
            rng,
        )
    }

    pub fn num_endpoints(&self) -> usize {
        self.endpoints.len()
    }

    pub fn endpoints(&self) -> &[Endpoint] {
        &self.endpoints
    }

    /// Whether `endpoint` can take a call at `now`
    pub fn admissible(&mut self, endpoint: EndpointId, now: f64) -> bool {
        self.endpoints
            .get_mut(endpoint)
            .map(|e| e.admissible(now))
            .unwrap_or(false)
    }

    /// Run one attempt cycle for `task` at simulated time `now`.
    ///
    /// Sets `endpoint_used` and clears the fault flag on success. A simulated
    /// server error sets the fault flag; a throttled endpoint never touches it.
    pub fn attempt(&mut self, task: &mut Request, now: f64) -> GatewayOutcome {
        let n = self.endpoints.len();
        let start = self.cursor;

        for offset in 0..n {
            let idx = (start + offset) % n;
            let endpoint = &mut self.endpoints[idx];

            if !endpoint.admissible(now) {
                endpoint.throttled += 1;
                debug!(
                    "Endpoint {} rate limited for request {} at t={:.2}, trying next",
                    idx, task.request_id, now
                );
                continue;
            }

            endpoint.record_call(now);
            let fault = self.rng.gen::<f64>() < self.fault_probability;

            if fault {
                endpoint.faults += 1;
                task.remote_fault = true;
                warn!(
                    "Endpoint {} returned a server error for request {} at t={:.2}, trying next",
                    idx, task.request_id, now
                );
                continue;
            }

            endpoint.successes += 1;
            task.endpoint_used = Some(idx);
            task.remote_fault = false;
            self.cursor = (idx + 1) % n;
            debug!(
                "Endpoint {} served request {} at t={:.2}",
                idx, task.request_id, now
            );
            return GatewayOutcome::Served { endpoint: idx };
        }

        self.exhausted += 1;
        warn!(
            "All {} endpoints unavailable for request {} at t={:.2} (server fault: {})",
            n, task.request_id, now, task.remote_fault
        );
        GatewayOutcome::Exhausted {
            remote_fault: task.remote_fault,
        }
    }

    /// Calls across all endpoints inside the trailing window at `now`
    pub fn calls_in_window(&self, now: f64) -> usize {
        self.endpoints.iter().map(|e| e.calls_in_window(now)).sum()
    }

    /// Trailing-window call count scaled to calls per minute
    pub fn calls_per_minute(&self, now: f64) -> f64 {
        self.calls_in_window(now) as f64 * 60.0 / self.window_secs
    }

    /// Time from which, absent new calls, every window is empty.
    /// `None` when no endpoint holds a call.
    pub fn window_clears_at(&self) -> Option<f64> {
        self.endpoints
            .iter()
            .filter_map(|e| e.last_call())
            .map(|ts| ts + self.window_secs)
            .max_by(f64::total_cmp)
    }

    pub fn total_calls(&self) -> u64 {
        self.endpoints.iter().map(|e| e.calls).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    fn gateway(num_endpoints: usize, rate_limit: usize, fault_probability: f64) -> Gateway {
        Gateway::new(
            num_endpoints,
            rate_limit,
            60.0,
            fault_probability,
            StdRng::seed_from_u64(1),
        )
    }

    #[test]
    fn test_round_robin_rotation() {
        let mut gw = gateway(3, 100, 0.0);
        let used: Vec<_> = (0..7)
            .map(|i| {
                let mut req = Request::new(format!("r{}", i), 0.0, 1.0);
                gw.attempt(&mut req, i as f64).endpoint().unwrap()
            })
            .collect();
        assert_eq!(used, vec![0, 1, 2, 0, 1, 2, 0]);
    }

    #[test]
    fn test_fallback_then_exhaustion_without_fault() {
        let mut gw = gateway(2, 1, 0.0);

        let mut first = Request::new("r1", 0.0, 1.0);
        assert_eq!(gw.attempt(&mut first, 0.0), GatewayOutcome::Served { endpoint: 0 });
        assert_eq!(first.endpoint_used, Some(0));

        let mut second = Request::new("r2", 0.1, 1.0);
        assert_eq!(gw.attempt(&mut second, 0.1), GatewayOutcome::Served { endpoint: 1 });
        assert_eq!(second.endpoint_used, Some(1));

        let mut third = Request::new("r3", 0.2, 1.0);
        assert_eq!(
            gw.attempt(&mut third, 0.2),
            GatewayOutcome::Exhausted { remote_fault: false }
        );
        assert!(third.endpoint_used.is_none());
        assert!(!third.remote_fault);
        assert_eq!(gw.exhausted, 1);
        assert_eq!(gw.endpoints()[0].throttled, 1);
        assert_eq!(gw.endpoints()[1].throttled, 1);
    }

    #[test]
    fn test_throttled_skip_keeps_sticky_fault() {
        let mut gw = gateway(2, 1, 0.0);
        let mut req = Request::new("r1", 0.0, 1.0);
        req.remote_fault = true;

        gw.attempt(&mut Request::new("a", 0.0, 1.0), 0.0);
        gw.attempt(&mut Request::new("b", 0.0, 1.0), 0.0);

        assert_eq!(
            gw.attempt(&mut req, 0.0),
            GatewayOutcome::Exhausted { remote_fault: true }
        );
        assert!(req.remote_fault);
    }

    #[test]
    fn test_every_call_faults() {
        let mut gw = gateway(3, 10, 1.0);
        let mut req = Request::new("r1", 0.0, 1.0);

        let outcome = gw.attempt(&mut req, 0.0);
        assert_eq!(outcome, GatewayOutcome::Exhausted { remote_fault: true });
        assert!(req.remote_fault);
        assert!(req.endpoint_used.is_none());
        // Each endpoint was actually called once
        assert!(gw.endpoints().iter().all(|e| e.calls == 1 && e.faults == 1));
        assert_eq!(gw.calls_in_window(0.0), 3);
        assert_eq!(gw.calls_per_minute(0.0), 3.0);
        assert_eq!(gw.total_calls(), 3);
        // A fully failed cycle does not move the cursor
        let mut next = Request::new("r2", 0.0, 1.0);
        gw.attempt(&mut next, 0.0);
        assert_eq!(gw.endpoints()[0].calls, 2);
    }

    #[test]
    fn test_success_clears_fault_flag() {
        let mut gw = gateway(1, 10, 0.0);
        let mut req = Request::new("r1", 0.0, 1.0);
        req.remote_fault = true;

        assert!(gw.attempt(&mut req, 0.0).is_served());
        assert!(!req.remote_fault);
    }

    #[test]
    fn test_window_recovers() {
        let mut gw = gateway(1, 1, 0.0);
        assert!(gw.attempt(&mut Request::new("a", 0.0, 1.0), 0.0).is_served());
        assert!(!gw.admissible(0, 30.0));
        assert!(!gw.attempt(&mut Request::new("b", 30.0, 1.0), 30.0).is_served());
        assert!(gw.admissible(0, 60.0));
        assert!(gw.attempt(&mut Request::new("c", 60.0, 1.0), 60.0).is_served());
    }

    #[test]
    fn test_window_clears_at_newest_call() {
        let mut gw = gateway(2, 5, 0.0);
        assert_eq!(gw.window_clears_at(), None);
        gw.attempt(&mut Request::new("a", 0.0, 1.0), 0.0);
        gw.attempt(&mut Request::new("b", 10.0, 1.0), 10.0);
        assert_eq!(gw.window_clears_at(), Some(70.0));
        assert_eq!(gw.calls_in_window(69.0), 1);
        assert_eq!(gw.calls_in_window(70.0), 0);
    }

    #[test]
    fn test_fault_rate_is_seeded() {
        let run = |seed| {
            let mut gw = Gateway::new(2, 1000, 60.0, 0.3, StdRng::seed_from_u64(seed));
            (0..50)
                .map(|i| gw.attempt(&mut Request::new("r", 0.0, 1.0), i as f64))
                .collect::<Vec<_>>()
        };
        assert_eq!(run(11), run(11));
    }

    #[test]
    fn test_unknown_endpoint_not_admissible() {
        let mut gw = gateway(2, 1, 0.0);
        assert!(!gw.admissible(5, 0.0));
    }
}
