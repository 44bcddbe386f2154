use std::collections::VecDeque;

/// Endpoint index, zero-based
pub type EndpointId = usize;

/// One external endpoint with a sliding-window call limit
#[derive(Debug, Clone)]
pub struct Endpoint {
    id: EndpointId,

    /// Calls allowed inside one window
    rate_limit: usize,

    /// Window length in simulated seconds
    window_secs: f64,

    /// Timestamps of calls still inside the window, oldest first
    window: VecDeque<f64>,

    /// Lifetime counters
    pub calls: u64,
    pub successes: u64,
    pub faults: u64,
    pub throttled: u64,
}

impl Endpoint {
    pub fn new(id: EndpointId, rate_limit: usize, window_secs: f64) -> Self {
        Self {
            id,
            rate_limit,
            window_secs,
            window: VecDeque::with_capacity(rate_limit),
            calls: 0,
            successes: 0,
            faults: 0,
            throttled: 0,
        }
    }

    pub fn id(&self) -> EndpointId {
        self.id
    }

    pub fn rate_limit(&self) -> usize {
        self.rate_limit
    }

    /// Drop calls that have aged out of the window
    fn evict(&mut self, now: f64) {
        while let Some(&oldest) = self.window.front() {
            if now - oldest >= self.window_secs {
                self.window.pop_front();
            } else {
                break;
            }
        }
    }

    /// Whether one more call fits in the window at `now`
    pub fn admissible(&mut self, now: f64) -> bool {
        self.evict(now);
        self.window.len() < self.rate_limit
    }

    /// Record a call made at `now`
    pub fn record_call(&mut self, now: f64) {
        self.window.push_back(now);
        self.calls += 1;
    }

    /// Most recent call still held in the window
    pub fn last_call(&self) -> Option<f64> {
        self.window.back().copied()
    }

    /// Calls counted against the limit at `now`, without mutating the window
    pub fn calls_in_window(&self, now: f64) -> usize {
        self.window
            .iter()
            .filter(|&&ts| now - ts < self.window_secs)
            .count()
    }
}
