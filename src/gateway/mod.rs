pub mod endpoint;
pub mod gateway;

pub use endpoint::{Endpoint, EndpointId};
pub use gateway::{Gateway, GatewayOutcome};
