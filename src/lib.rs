pub mod config;
pub mod error;
pub mod gateway;
pub mod metrics;
pub mod queue;
pub mod request;
pub mod simulation;
pub mod worker;

#[cfg(feature = "cli")]
pub mod visualization;

// Re-export key types
pub use config::Config;
pub use error::{LoadError, SimError};
pub use gateway::{Gateway, GatewayOutcome};
pub use metrics::{MetricsCollector, MetricsSummary};
pub use queue::{QueueDiscipline, QueuePolicy};
pub use request::{Request, RequestGenerator, RequestStatus};
pub use simulation::{ProgressInfo, Simulator, TelemetryPoint};
pub use worker::Worker;
