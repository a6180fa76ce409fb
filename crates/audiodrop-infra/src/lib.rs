//! Audiodrop Infrastructure Library
//!
//! Shared infrastructure used by the Audiodrop binaries:
//! - Middleware (request ID)
//! - Telemetry initialization
//! - HTTP error response body
//! - Bucket provisioning (deploy / teardown of stack declarations)

#[cfg(feature = "middleware")]
pub mod middleware;

#[cfg(feature = "observability-basic")]
pub mod telemetry;

pub mod error;

#[cfg(feature = "provision")]
pub mod provision;

// Re-export commonly used types
#[cfg(feature = "middleware")]
pub use middleware::{get_request_id, request_id_middleware, RequestId};

#[cfg(feature = "observability-basic")]
pub use telemetry::{init_telemetry, shutdown_telemetry};

pub use error::ErrorResponse;

#[cfg(feature = "provision")]
pub use provision::{
    synth_template, DeployedStack, InMemoryProvisioner, Provisioner, TeardownReport,
};
