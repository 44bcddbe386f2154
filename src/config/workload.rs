use serde::Deserialize;

fn default_arrival_pattern() -> String {
    "poisson".to_string()
}

fn default_arrival_rate() -> f64 {
    1.0
}

fn default_num_requests() -> usize {
    100
}

fn default_num_users() -> usize {
    5
}

fn default_service_dist() -> DurationDistribution {
    DurationDistribution::Uniform { min: 1.0, max: 10.0 }
}

#[derive(Debug, Clone, Deserialize)]
pub struct WorkloadConfig {
    /// Arrival pattern: "poisson", "uniform", "burst", "fixed_rate", "batched"
    #[serde(default = "default_arrival_pattern")]
    pub arrival_pattern: String,

    /// Mean arrival rate (requests per second)
    #[serde(default = "default_arrival_rate")]
    pub arrival_rate: f64,

    /// Service duration distribution
    #[serde(default = "default_service_dist")]
    pub service_dist: DurationDistribution,

    /// Total number of requests to generate
    #[serde(default = "default_num_requests")]
    pub num_requests: usize,

    /// Size of the user pool request ids are drawn from
    #[serde(default = "default_num_users")]
    pub num_users: usize,

    /// Random seed for reproducibility (falls back to the simulation seed)
    #[serde(default)]
    pub seed: Option<u64>,
}

impl Default for WorkloadConfig {
    fn default() -> Self {
        Self {
            arrival_pattern: default_arrival_pattern(),
            arrival_rate: default_arrival_rate(),
            service_dist: default_service_dist(),
            num_requests: default_num_requests(),
            num_users: default_num_users(),
            seed: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type")]
pub enum DurationDistribution {
    #[serde(rename = "fixed")]
    Fixed { value: f64 },

    #[serde(rename = "uniform")]
    Uniform { min: f64, max: f64 },

    #[serde(rename = "normal")]
    Normal { mean: f64, std_dev: f64 },

    #[serde(rename = "lognormal")]
    LogNormal { mean: f64, std_dev: f64 },
}

impl DurationDistribution {
    /// Sample a service duration in seconds, never negative
    pub fn sample<R: rand::Rng>(&self, rng: &mut R) -> f64 {
        use rand_distr::Distribution;

        let value = match self {
            DurationDistribution::Fixed { value } => *value,
            DurationDistribution::Uniform { min, max } => {
                if max > min {
                    rng.gen_range(*min..*max)
                } else {
                    *min
                }
            }
            DurationDistribution::Normal { mean, std_dev } => {
                match rand_distr::Normal::new(*mean, *std_dev) {
                    Ok(normal) => normal.sample(rng),
                    Err(_) => *mean,
                }
            }
            DurationDistribution::LogNormal { mean, std_dev } => {
                match rand_distr::LogNormal::new(*mean, *std_dev) {
                    Ok(lognormal) => lognormal.sample(rng),
                    Err(_) => mean.exp(),
                }
            }
        };
        // One decimal place, like the sample data the loader is usually fed
        (value.max(0.0) * 10.0).round() / 10.0
    }

    pub fn validate(&self) -> Result<(), String> {
        match self {
            DurationDistribution::Fixed { value } if !(value.is_finite() && *value >= 0.0) => {
                Err(format!("fixed service duration must be >= 0, got {}", value))
            }
            DurationDistribution::Uniform { min, max } if !(*min >= 0.0 && max >= min) => {
                Err(format!("uniform service duration needs 0 <= min <= max, got {}..{}", min, max))
            }
            DurationDistribution::Normal { std_dev, .. }
            | DurationDistribution::LogNormal { std_dev, .. }
                if !(std_dev.is_finite() && *std_dev >= 0.0) =>
            {
                Err(format!("std_dev must be finite and >= 0, got {}", std_dev))
            }
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};

    #[test]
    fn test_fixed_sample() {
        let mut rng = StdRng::seed_from_u64(1);
        let dist = DurationDistribution::Fixed { value: 2.5 };
        assert_eq!(dist.sample(&mut rng), 2.5);
    }

    #[test]
    fn test_uniform_sample_in_range() {
        let mut rng = StdRng::seed_from_u64(7);
        let dist = DurationDistribution::Uniform { min: 1.0, max: 10.0 };
        for _ in 0..200 {
            let v = dist.sample(&mut rng);
            assert!((1.0..=10.0).contains(&v));
        }
    }

    #[test]
    fn test_normal_sample_clamped() {
        let mut rng = StdRng::seed_from_u64(3);
        let dist = DurationDistribution::Normal { mean: -5.0, std_dev: 1.0 };
        for _ in 0..50 {
            assert!(dist.sample(&mut rng) >= 0.0);
        }
    }

    #[test]
    fn test_validate() {
        assert!(DurationDistribution::Fixed { value: -1.0 }.validate().is_err());
        assert!(DurationDistribution::Uniform { min: 5.0, max: 1.0 }.validate().is_err());
        assert!(DurationDistribution::Normal { mean: 1.0, std_dev: f64::NAN }
            .validate()
            .is_err());
        assert!(DurationDistribution::LogNormal { mean: 1.0, std_dev: 0.5 }
            .validate()
            .is_ok());
    }
}
