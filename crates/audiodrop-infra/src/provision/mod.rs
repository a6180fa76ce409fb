//! Bucket provisioning
//!
//! A [`Provisioner`] turns a [`StackDeclaration`] into live buckets and tears
//! them down again. Both operations are all-or-nothing: validation and
//! namespace checks run before any bucket is touched.

mod memory;
mod template;

pub use memory::InMemoryProvisioner;
pub use template::synth_template;

use async_trait::async_trait;
use audiodrop_core::{ProvisionError, StackDeclaration};
use serde::Serialize;

/// Result of a successful deployment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeployedStack {
    pub stack: String,
    pub buckets: Vec<String>,
}

/// Result of a successful teardown.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TeardownReport {
    pub stack: String,
    /// Buckets deleted (with their objects)
    pub destroyed: Vec<String>,
    /// Buckets detached from the stack and left in place
    pub retained: Vec<String>,
    pub objects_deleted: usize,
}

#[async_trait]
pub trait Provisioner: Send + Sync {
    /// Create every bucket of the stack, or none of them.
    async fn deploy(&self, stack: &StackDeclaration) -> Result<DeployedStack, ProvisionError>;

    /// Tear down a deployed stack according to each bucket's removal policy.
    async fn destroy(&self, stack_name: &str) -> Result<TeardownReport, ProvisionError>;
}
