// Library exports for the binary and integration tests

pub mod config;
pub mod dispatcher;
pub mod error;
pub mod http_api;
pub mod identify;
pub mod operation;
pub mod registry;

pub use config::Config;
pub use dispatcher::{InboundRequest, RequestDispatcher};
pub use error::{ClientFault, MockError};
pub use http_api::{shutdown_on, MockServer};
pub use registry::{Service, ServiceRegistry, ServiceType};
