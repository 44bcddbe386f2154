pub mod clock;
pub mod simulator;
pub mod telemetry;

pub use clock::Clock;
pub use simulator::{ProgressInfo, Simulator};
pub use telemetry::{TelemetryPoint, TelemetryRecorder};
