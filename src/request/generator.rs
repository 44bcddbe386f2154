use super::Request;
use crate::config::WorkloadConfig;
use rand::{rngs::StdRng, Rng, SeedableRng};
use rand_distr::{Distribution, Exp};

/// Generates synthetic requests based on workload configuration
pub struct RequestGenerator {
    workload: WorkloadConfig,
    rng: StdRng,
    user_ids: Vec<String>,
    next_arrival_time: f64,
    requests_generated: usize,
}

impl RequestGenerator {
    pub fn new(workload: WorkloadConfig, seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let user_ids = (0..workload.num_users.max(1)).map(user_name).collect();

        let next_arrival_time = Self::sample_next_arrival(
            0.0,
            &workload.arrival_pattern,
            workload.arrival_rate,
            &mut rng,
        );

        Self {
            workload,
            rng,
            user_ids,
            next_arrival_time,
            requests_generated: 0,
        }
    }

    /// Get the next request if its arrival time is at or before the given time
    /// Returns None if no request is ready or all requests have been generated
    pub fn next_if_before(&mut self, current_time: f64) -> Option<Request> {
        if self.is_finished() || self.next_arrival_time > current_time {
            return None;
        }

        let user = self.rng.gen_range(0..self.user_ids.len());
        let service_duration = self.workload.service_dist.sample(&mut self.rng);
        let request = Request::new(
            self.user_ids[user].clone(),
            self.next_arrival_time,
            service_duration,
        );

        self.requests_generated += 1;
        self.next_arrival_time = Self::sample_next_arrival(
            self.next_arrival_time,
            &self.workload.arrival_pattern,
            self.workload.arrival_rate,
            &mut self.rng,
        );

        Some(request)
    }

    /// Generate every remaining request, in arrival order
    pub fn generate_all(&mut self) -> Vec<Request> {
        let mut requests = Vec::with_capacity(self.workload.num_requests);
        while let Some(request) = self.next_if_before(f64::INFINITY) {
            requests.push(request);
        }
        requests
    }

    /// Sample the next arrival time based on the arrival pattern
    fn sample_next_arrival(current_time: f64, pattern: &str, rate: f64, rng: &mut StdRng) -> f64 {
        let poisson = |rng: &mut StdRng| match Exp::new(rate) {
            Ok(exp) => current_time + exp.sample(rng),
            Err(_) => current_time + 1.0 / rate,
        };

        match pattern.to_lowercase().as_str() {
            "poisson" => poisson(rng),
            "uniform" => {
                // Uniform: inter-arrival drawn evenly around the mean gap
                current_time + rng.gen_range(0.0..(2.0 / rate))
            }
            "burst" => {
                // 20% chance of a tight burst, otherwise a long gap
                if rng.gen_bool(0.2) {
                    current_time + rng.gen_range(0.001..0.01)
                } else {
                    current_time + rng.gen_range(0.5..2.0) / rate
                }
            }
            "fixed_rate" => current_time + 1.0 / rate,
            "batched" => 0.0,
            _ => poisson(rng),
        }
    }

    /// Check if all requests have been generated
    pub fn is_finished(&self) -> bool {
        self.requests_generated >= self.workload.num_requests
    }

    /// Get number of requests generated so far
    pub fn num_generated(&self) -> usize {
        self.requests_generated
    }

    /// Peek at the next arrival time without generating the request
    pub fn peek_next_arrival(&self) -> f64 {
        self.next_arrival_time
    }
}

/// user_a, user_b, ..., user_z, user_26, ...
fn user_name(index: usize) -> String {
    if index < 26 {
        format!("user_{}", (b'a' + index as u8) as char)
    } else {
        format!("user_{}", index)
    }
}
