//! Declarative bucket lifecycle
//!
//! A [`BucketDeclaration`] is pure data: a globally unique name, a
//! [`RemovalPolicy`] and an auto-empty flag. Declarations are grouped into a
//! [`StackDeclaration`], the unit that a provisioning engine deploys and tears
//! down as a whole. Everything here is validated up front so that an invalid
//! declaration never reaches the engine.

use std::collections::HashSet;
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::net::Ipv4Addr;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

const MIN_BUCKET_NAME_LEN: usize = 3;
const MAX_BUCKET_NAME_LEN: usize = 63;
const RESERVED_PREFIXES: &[&str] = &["xn--", "sthree-", "amzn-s3-demo-"];
const RESERVED_SUFFIXES: &[&str] = &["-s3alias", "--ol-s3", "--x-s3"];

/// Errors raised while validating or provisioning declarations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProvisionError {
    #[error("Invalid bucket name '{name}': {reason}")]
    InvalidBucketName { name: String, reason: String },

    #[error("Bucket '{name}' uses removal policy 'destroy' without auto-empty; teardown would fail once it holds objects")]
    DestroyWithoutAutoEmpty { name: String },

    #[error("Unknown removal policy: {0}")]
    UnknownRemovalPolicy(String),

    #[error("Invalid stack name: {0}")]
    InvalidStackName(String),

    #[error("Bucket '{name}' is declared more than once in stack '{stack}'")]
    DuplicateBucket { stack: String, name: String },

    #[error("Bucket name '{0}' is already in use")]
    BucketAlreadyExists(String),

    #[error("Stack '{0}' is already deployed")]
    StackAlreadyDeployed(String),

    #[error("Stack '{0}' is not deployed")]
    StackNotFound(String),

    #[error("Bucket '{name}' still holds {objects} object(s)")]
    BucketNotEmpty { name: String, objects: usize },

    #[error("Storage error while provisioning: {0}")]
    Storage(String),
}

/// What happens to a bucket when its owning stack is torn down.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RemovalPolicy {
    /// Delete the bucket (and, with auto-empty, its objects).
    Destroy,
    /// Detach the bucket from the stack and leave it in place.
    Retain,
}

impl RemovalPolicy {
    /// CloudFormation `DeletionPolicy` value.
    pub fn deletion_policy(&self) -> &'static str {
        match self {
            RemovalPolicy::Destroy => "Delete",
            RemovalPolicy::Retain => "Retain",
        }
    }
}

impl FromStr for RemovalPolicy {
    type Err = ProvisionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "destroy" => Ok(RemovalPolicy::Destroy),
            "retain" => Ok(RemovalPolicy::Retain),
            other => Err(ProvisionError::UnknownRemovalPolicy(other.to_string())),
        }
    }
}

impl Display for RemovalPolicy {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            RemovalPolicy::Destroy => write!(f, "destroy"),
            RemovalPolicy::Retain => write!(f, "retain"),
        }
    }
}

/// A validated bucket declaration.
///
/// Fields are private so a declaration can only be obtained through
/// [`declare_bucket`] (or deserialization followed by [`BucketDeclaration::validate`]).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BucketDeclaration {
    name: String,
    removal_policy: RemovalPolicy,
    auto_empty: bool,
}

impl BucketDeclaration {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn removal_policy(&self) -> RemovalPolicy {
        self.removal_policy
    }

    pub fn auto_empty(&self) -> bool {
        self.auto_empty
    }

    /// Re-check the invariants, e.g. after loading a declaration from JSON.
    pub fn validate(&self) -> Result<(), ProvisionError> {
        validate_bucket_name(&self.name)?;
        if self.removal_policy == RemovalPolicy::Destroy && !self.auto_empty {
            return Err(ProvisionError::DestroyWithoutAutoEmpty {
                name: self.name.clone(),
            });
        }
        Ok(())
    }

    /// Logical resource id derived from the bucket name (`my-mp3-bucket` -> `MyMp3Bucket`).
    pub fn logical_id(&self) -> String {
        self.name
            .split(['-', '.'])
            .filter(|segment| !segment.is_empty())
            .map(|segment| {
                let mut chars = segment.chars();
                match chars.next() {
                    Some(first) => first.to_ascii_uppercase().to_string() + chars.as_str(),
                    None => String::new(),
                }
            })
            .collect()
    }
}

/// Declare a bucket, rejecting invalid names and the `destroy` without auto-empty pairing.
pub fn declare_bucket(
    name: impl Into<String>,
    removal_policy: RemovalPolicy,
    auto_empty: bool,
) -> Result<BucketDeclaration, ProvisionError> {
    let declaration = BucketDeclaration {
        name: name.into(),
        removal_policy,
        auto_empty,
    };
    declaration.validate()?;
    Ok(declaration)
}

/// Validate a bucket name against the S3 general-purpose bucket naming rules.
pub fn validate_bucket_name(name: &str) -> Result<(), ProvisionError> {
    let invalid = |reason: &str| ProvisionError::InvalidBucketName {
        name: name.to_string(),
        reason: reason.to_string(),
    };

    if name.len() < MIN_BUCKET_NAME_LEN || name.len() > MAX_BUCKET_NAME_LEN {
        return Err(invalid("must be between 3 and 63 characters long"));
    }
    if !name
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' || c == '.')
    {
        return Err(invalid(
            "may only contain lowercase letters, digits, dots and hyphens",
        ));
    }
    let starts_ok = name
        .chars()
        .next()
        .is_some_and(|c| c.is_ascii_alphanumeric());
    let ends_ok = name
        .chars()
        .last()
        .is_some_and(|c| c.is_ascii_alphanumeric());
    if !starts_ok || !ends_ok {
        return Err(invalid("must begin and end with a letter or digit"));
    }
    if name.contains("..") {
        return Err(invalid("must not contain two adjacent dots"));
    }
    if name.parse::<Ipv4Addr>().is_ok() {
        return Err(invalid("must not be formatted as an IP address"));
    }
    if let Some(prefix) = RESERVED_PREFIXES.iter().find(|p| name.starts_with(*p)) {
        return Err(invalid(&format!("must not start with '{}'", prefix)));
    }
    if let Some(suffix) = RESERVED_SUFFIXES.iter().find(|s| name.ends_with(*s)) {
        return Err(invalid(&format!("must not end with '{}'", suffix)));
    }
    Ok(())
}

/// A named group of bucket declarations deployed and torn down together.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StackDeclaration {
    name: String,
    buckets: Vec<BucketDeclaration>,
}

impl StackDeclaration {
    pub fn new(name: impl Into<String>) -> Result<Self, ProvisionError> {
        let name = name.into();
        validate_stack_name(&name)?;
        Ok(Self {
            name,
            buckets: Vec::new(),
        })
    }

    /// Add a bucket; a name may appear only once per stack.
    pub fn with_bucket(mut self, bucket: BucketDeclaration) -> Result<Self, ProvisionError> {
        if self.buckets.iter().any(|b| b.name() == bucket.name()) {
            return Err(ProvisionError::DuplicateBucket {
                stack: self.name.clone(),
                name: bucket.name().to_string(),
            });
        }
        self.buckets.push(bucket);
        Ok(self)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn buckets(&self) -> &[BucketDeclaration] {
        &self.buckets
    }

    /// Validate the stack and every bucket it declares.
    pub fn validate(&self) -> Result<(), ProvisionError> {
        validate_stack_name(&self.name)?;
        let mut seen = HashSet::new();
        for bucket in &self.buckets {
            bucket.validate()?;
            if !seen.insert(bucket.name()) {
                return Err(ProvisionError::DuplicateBucket {
                    stack: self.name.clone(),
                    name: bucket.name().to_string(),
                });
            }
        }
        Ok(())
    }
}

fn validate_stack_name(name: &str) -> Result<(), ProvisionError> {
    let valid = !name.is_empty()
        && name.len() <= 128
        && name.starts_with(|c: char| c.is_ascii_alphabetic())
        && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '-');
    if !valid {
        return Err(ProvisionError::InvalidStackName(name.to_string()));
    }
    Ok(())
}

/// The stack shipped with Audiodrop: one destroy-with-contents bucket.
pub fn default_stack() -> Result<StackDeclaration, ProvisionError> {
    StackDeclaration::new(crate::constants::DEFAULT_STACK_NAME)?.with_bucket(declare_bucket(
        crate::constants::DEFAULT_BUCKET_NAME,
        RemovalPolicy::Destroy,
        true,
    )?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn destroy_requires_auto_empty() {
        let err = declare_bucket("my-mp3-bucket", RemovalPolicy::Destroy, false).unwrap_err();
        assert_eq!(
            err,
            ProvisionError::DestroyWithoutAutoEmpty {
                name: "my-mp3-bucket".to_string()
            }
        );
    }

    #[test]
    fn destroy_with_auto_empty_is_accepted() {
        let bucket = declare_bucket("my-mp3-bucket", RemovalPolicy::Destroy, true).unwrap();
        assert_eq!(bucket.name(), "my-mp3-bucket");
        assert_eq!(bucket.removal_policy(), RemovalPolicy::Destroy);
        assert!(bucket.auto_empty());
    }

    #[test]
    fn retain_is_allowed_with_or_without_auto_empty() {
        assert!(declare_bucket("archive-bucket", RemovalPolicy::Retain, false).is_ok());
        assert!(declare_bucket("archive-bucket", RemovalPolicy::Retain, true).is_ok());
    }

    #[test]
    fn rejects_invalid_bucket_names() {
        for name in [
            "ab",
            "My-Bucket",
            "-bucket",
            "bucket-",
            "my..bucket",
            "192.168.1.10",
            "xn--bucket",
            "bucket-s3alias",
            "bucket_name",
            &"a".repeat(64),
        ] {
            assert!(
                matches!(
                    validate_bucket_name(name),
                    Err(ProvisionError::InvalidBucketName { .. })
                ),
                "expected '{}' to be rejected",
                name
            );
        }
    }

    #[test]
    fn accepts_valid_bucket_names() {
        for name in ["my-mp3-bucket", "abc", "logs.example.com", "a1b2c3"] {
            assert!(validate_bucket_name(name).is_ok(), "{}", name);
        }
    }

    #[test]
    fn removal_policy_parses_and_displays() {
        assert_eq!("DESTROY".parse::<RemovalPolicy>().unwrap(), RemovalPolicy::Destroy);
        assert_eq!("retain".parse::<RemovalPolicy>().unwrap(), RemovalPolicy::Retain);
        assert!(matches!(
            "snapshot".parse::<RemovalPolicy>(),
            Err(ProvisionError::UnknownRemovalPolicy(_))
        ));
        assert_eq!(RemovalPolicy::Destroy.to_string(), "destroy");
    }

    #[test]
    fn logical_id_is_pascal_case() {
        let bucket = declare_bucket("my-mp3-bucket", RemovalPolicy::Destroy, true).unwrap();
        assert_eq!(bucket.logical_id(), "MyMp3Bucket");
        let dotted = declare_bucket("logs.example.com", RemovalPolicy::Retain, false).unwrap();
        assert_eq!(dotted.logical_id(), "LogsExampleCom");
    }

    #[test]
    fn stack_rejects_duplicate_buckets() {
        let bucket = declare_bucket("my-mp3-bucket", RemovalPolicy::Destroy, true).unwrap();
        let err = StackDeclaration::new("InfraStack")
            .unwrap()
            .with_bucket(bucket.clone())
            .unwrap()
            .with_bucket(bucket)
            .unwrap_err();
        assert!(matches!(err, ProvisionError::DuplicateBucket { .. }));
    }

    #[test]
    fn deserialized_declaration_is_revalidated() {
        let json = r#"{"name":"my-mp3-bucket","removal_policy":"destroy","auto_empty":false}"#;
        let bucket: BucketDeclaration = serde_json::from_str(json).unwrap();
        assert!(bucket.validate().is_err());

        let stack_json = format!(r#"{{"name":"InfraStack","buckets":[{}]}}"#, json);
        let stack: StackDeclaration = serde_json::from_str(&stack_json).unwrap();
        assert!(matches!(
            stack.validate(),
            Err(ProvisionError::DestroyWithoutAutoEmpty { .. })
        ));
    }

    #[test]
    fn default_stack_declares_destroyable_bucket() {
        let stack = default_stack().unwrap();
        assert_eq!(stack.name(), "InfraStack");
        assert_eq!(stack.buckets().len(), 1);
        let bucket = &stack.buckets()[0];
        assert_eq!(bucket.name(), "my-mp3-bucket");
        assert_eq!(bucket.removal_policy(), RemovalPolicy::Destroy);
        assert!(bucket.auto_empty());
    }

    #[test]
    fn invalid_stack_names_are_rejected() {
        assert!(StackDeclaration::new("").is_err());
        assert!(StackDeclaration::new("1stack").is_err());
        assert!(StackDeclaration::new("infra_stack").is_err());
        assert!(StackDeclaration::new("Infra-Stack").is_ok());
    }
}
