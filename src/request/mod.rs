pub mod export;
pub mod generator;
pub mod loader;
pub mod request;
pub mod status;

pub use export::{save_records_csv, save_requests_csv, write_records_csv, write_requests_csv};
pub use generator::RequestGenerator;
pub use loader::{load_csv, parse_csv};
pub use request::{Request, REJECTED_SENTINEL};
pub use status::RequestStatus;
