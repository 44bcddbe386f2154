use serde::Deserialize;

fn default_policy() -> String {
    "priority".to_string()
}

fn default_priority_threshold() -> f64 {
    20.0
}

fn default_priority_bias() -> f64 {
    0.8
}

#[derive(Debug, Clone, Deserialize)]
pub struct QueueConfig {
    /// Queue policy: "priority" (biased dual queue) or "fifo" (single, optionally bounded)
    #[serde(default = "default_policy")]
    pub policy: String,

    /// Requests with a service duration below this go to the expedited queue
    #[serde(default = "default_priority_threshold")]
    pub priority_threshold: f64,

    /// Probability of preferring the expedited queue on each dequeue
    #[serde(default = "default_priority_bias")]
    pub priority_bias: f64,

    /// Maximum queue length for the fifo policy (None = unbounded)
    #[serde(default)]
    pub max_size: Option<usize>,
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            policy: default_policy(),
            priority_threshold: default_priority_threshold(),
            priority_bias: default_priority_bias(),
            max_size: None,
        }
    }
}
