pub mod client;
pub mod endpoint;
pub mod error;
pub mod mock;

pub use client::{decode, Gateway, GatewayFactory, HttpGateway};
pub use endpoint::Endpoint;
pub use error::{ClientError, Result};
pub use mock::MockGateway;
