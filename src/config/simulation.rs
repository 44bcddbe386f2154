use serde::Deserialize;

fn default_num_workers() -> usize {
    1
}

fn default_seed() -> u64 {
    42
}

fn default_telemetry_interval() -> f64 {
    60.0
}

fn default_log_interval() -> u64 {
    1000
}

#[derive(Debug, Clone, Deserialize)]
pub struct SimulationConfig {
    /// Size of the worker pool
    #[serde(default = "default_num_workers")]
    pub num_workers: usize,

    /// Seed for every random stream in the run (queue selection, fault injection)
    #[serde(default = "default_seed")]
    pub seed: u64,

    /// Simulated seconds between telemetry snapshots
    #[serde(default = "default_telemetry_interval")]
    pub telemetry_interval: f64,

    /// Log progress every N clock advances
    #[serde(default = "default_log_interval")]
    pub log_interval: u64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            num_workers: default_num_workers(),
            seed: default_seed(),
            telemetry_interval: default_telemetry_interval(),
            log_interval: default_log_interval(),
        }
    }
}
