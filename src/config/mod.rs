pub mod gateway;
pub mod queue;
pub mod simulation;
pub mod workload;

pub use gateway::GatewayConfig;
pub use queue::QueueConfig;
pub use simulation::SimulationConfig;
pub use workload::{DurationDistribution, WorkloadConfig};

use crate::error::SimError;
use crate::queue::QueueDiscipline;
use serde::Deserialize;
use std::fs;
use std::path::Path;

/// Top-level configuration that aggregates all sub-configs
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub simulation: SimulationConfig,
    #[serde(default)]
    pub queue: QueueConfig,
    #[serde(default)]
    pub gateway: GatewayConfig,
    #[serde(default)]
    pub workload: WorkloadConfig,
}

impl Config {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, SimError> {
        let contents = fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    pub fn from_toml_str(contents: &str) -> Result<Self, SimError> {
        let config: Config = toml::from_str(contents)?;
        Ok(config)
    }

    /// Check every parameter the simulator consumes.
    ///
    /// A capacity bound only applies to the single FIFO policy; asking for one
    /// together with the priority policy is rejected instead of being ignored.
    pub fn validate(&self) -> Result<(), SimError> {
        let invalid = |msg: String| Err(SimError::Configuration(msg));

        if self.simulation.num_workers == 0 {
            return invalid("num_workers must be at least 1".to_string());
        }
        if !(self.simulation.telemetry_interval.is_finite()
            && self.simulation.telemetry_interval > 0.0)
        {
            return invalid(format!(
                "telemetry_interval must be positive, got {}",
                self.simulation.telemetry_interval
            ));
        }

        let discipline =
            QueueDiscipline::from_str(&self.queue.policy).map_err(SimError::Configuration)?;
        if !(0.0..=1.0).contains(&self.queue.priority_bias) {
            return invalid(format!(
                "priority_bias must be between 0.0 and 1.0, got {}",
                self.queue.priority_bias
            ));
        }
        if !(self.queue.priority_threshold.is_finite() && self.queue.priority_threshold > 0.0) {
            return invalid(format!(
                "priority_threshold must be positive, got {}",
                self.queue.priority_threshold
            ));
        }
        match (discipline, self.queue.max_size) {
            (_, Some(0)) => return invalid("max_size must be at least 1".to_string()),
            (QueueDiscipline::Priority, Some(max)) => {
                return invalid(format!(
                    "max_size = {} is only supported by the fifo policy",
                    max
                ))
            }
            _ => {}
        }

        if self.gateway.num_endpoints == 0 {
            return invalid("num_endpoints must be at least 1".to_string());
        }
        if self.gateway.rate_limit_per_minute == 0 {
            return invalid("rate_limit_per_minute must be at least 1".to_string());
        }
        if !(self.gateway.window_secs.is_finite() && self.gateway.window_secs > 0.0) {
            return invalid(format!(
                "window_secs must be positive, got {}",
                self.gateway.window_secs
            ));
        }
        if !(0.0..=1.0).contains(&self.gateway.fault_probability) {
            return invalid(format!(
                "fault_probability must be between 0.0 and 1.0, got {}",
                self.gateway.fault_probability
            ));
        }

        if !(self.workload.arrival_rate.is_finite() && self.workload.arrival_rate > 0.0) {
            return invalid(format!(
                "arrival_rate must be positive, got {}",
                self.workload.arrival_rate
            ));
        }
        if self.workload.num_users == 0 {
            return invalid("num_users must be at least 1".to_string());
        }
        self.workload
            .service_dist
            .validate()
            .map_err(SimError::Configuration)?;

        Ok(())
    }

    /// Seed used by the workload generator
    pub fn workload_seed(&self) -> u64 {
        self.workload.seed.unwrap_or(self.simulation.seed)
    }

    /// Get a default configuration for testing: deterministic gateway, no faults
    #[cfg(test)]
    pub fn test_default() -> Self {
        Config {
            simulation: SimulationConfig {
                num_workers: 1,
                seed: 42,
                telemetry_interval: 1.0,
                log_interval: 100,
            },
            queue: QueueConfig::default(),
            gateway: GatewayConfig {
                num_endpoints: 2,
                rate_limit_per_minute: 100,
                window_secs: 60.0,
                fault_probability: 0.0,
            },
            workload: WorkloadConfig {
                arrival_pattern: "fixed_rate".to_string(),
                arrival_rate: 2.0,
                service_dist: DurationDistribution::Fixed { value: 1.0 },
                num_requests: 10,
                num_users: 3,
                seed: None,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_creation() {
        let config = Config::test_default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_empty_toml_uses_defaults() {
        let config = Config::from_toml_str("").unwrap();
        assert_eq!(config.simulation.num_workers, 1);
        assert_eq!(config.queue.policy, "priority");
        assert_eq!(config.queue.priority_threshold, 20.0);
        assert_eq!(config.queue.priority_bias, 0.8);
        assert_eq!(config.gateway.fault_probability, 0.05);
        assert_eq!(config.gateway.window_secs, 60.0);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_sections() {
        let config = Config::from_toml_str(
            r#"
            [simulation]
            num_workers = 4
            seed = 7

            [queue]
            policy = "fifo"
            max_size = 10

            [gateway]
            num_endpoints = 2
            rate_limit_per_minute = 30

            [workload]
            arrival_pattern = "poisson"
            arrival_rate = 3.0
            service_dist = { type = "fixed", value = 2.0 }
            "#,
        )
        .unwrap();

        assert_eq!(config.simulation.num_workers, 4);
        assert_eq!(config.simulation.seed, 7);
        assert_eq!(config.queue.max_size, Some(10));
        assert_eq!(config.gateway.rate_limit_per_minute, 30);
        assert_eq!(config.workload_seed(), 7);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_capacity_with_priority_policy_rejected() {
        let mut config = Config::test_default();
        config.queue.max_size = Some(5);
        assert!(matches!(config.validate(), Err(SimError::Configuration(_))));

        config.queue.policy = "fifo".to_string();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_invalid_values_rejected() {
        let mut config = Config::test_default();
        config.queue.priority_bias = 1.5;
        assert!(config.validate().is_err());

        let mut config = Config::test_default();
        config.simulation.num_workers = 0;
        assert!(config.validate().is_err());

        let mut config = Config::test_default();
        config.gateway.num_endpoints = 0;
        assert!(config.validate().is_err());

        let mut config = Config::test_default();
        config.queue.policy = "lifo".to_string();
        assert!(config.validate().is_err());

        let mut config = Config::test_default();
        config.queue.policy = "fifo".to_string();
        config.queue.max_size = Some(0);
        assert!(config.validate().is_err());
    }
}
