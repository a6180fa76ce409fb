//! Audiodrop Core Library
//!
//! This crate provides the domain models, error types, configuration, bucket
//! declarations and upload validation shared by every Audiodrop component.

pub mod bucket;
pub mod config;
pub mod constants;
pub mod error;
pub mod models;
pub mod storage_types;
pub mod validation;

// Re-export commonly used types
pub use bucket::{
    declare_bucket, default_stack, validate_bucket_name, BucketDeclaration, ProvisionError,
    RemovalPolicy, StackDeclaration,
};
pub use config::{BaseConfig, Config, IngestConfig};
pub use error::{AppError, ErrorMetadata, LogLevel};
pub use models::StoredObject;
pub use storage_types::StorageBackend;
