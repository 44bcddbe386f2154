use serde::Deserialize;

fn default_num_endpoints() -> usize {
    3
}

fn default_rate_limit_per_minute() -> usize {
    60
}

fn default_window_secs() -> f64 {
    60.0
}

fn default_fault_probability() -> f64 {
    0.05
}

#[derive(Debug, Clone, Deserialize)]
pub struct GatewayConfig {
    /// Number of external endpoints behind the gateway
    #[serde(default = "default_num_endpoints")]
    pub num_endpoints: usize,

    /// Calls each endpoint accepts per rate window
    #[serde(default = "default_rate_limit_per_minute")]
    pub rate_limit_per_minute: usize,

    /// Length of the sliding rate window in simulated seconds
    #[serde(default = "default_window_secs")]
    pub window_secs: f64,

    /// Chance that an admitted call returns a simulated server error
    #[serde(default = "default_fault_probability")]
    pub fault_probability: f64,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            num_endpoints: default_num_endpoints(),
            rate_limit_per_minute: default_rate_limit_per_minute(),
            window_secs: default_window_secs(),
            fault_probability: default_fault_probability(),
        }
    }
}
