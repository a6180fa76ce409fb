use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use audiodrop_core::{BucketDeclaration, ProvisionError, RemovalPolicy, StackDeclaration};
use audiodrop_storage::{ObjectStorage, Storage, StorageError};
use tokio::sync::Mutex;

use super::{DeployedStack, Provisioner, TeardownReport};

struct BucketEntry {
    declaration: BucketDeclaration,
    storage: Arc<dyn Storage>,
}

#[derive(Default)]
struct Namespace {
    buckets: HashMap<String, BucketEntry>,
    /// Stack name -> names of the buckets it owns
    stacks: HashMap<String, Vec<String>>,
}

/// Process-local bucket namespace backed by in-memory object stores.
///
/// Bucket names are unique across the namespace, including retained buckets
/// whose stack has been torn down.
#[derive(Default)]
pub struct InMemoryProvisioner {
    namespace: Mutex<Namespace>,
}

fn storage_error(err: StorageError) -> ProvisionError {
    ProvisionError::Storage(err.to_string())
}

impl InMemoryProvisioner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Storage handle of a live bucket.
    pub async fn bucket_storage(&self, name: &str) -> Option<Arc<dyn Storage>> {
        let namespace = self.namespace.lock().await;
        namespace.buckets.get(name).map(|b| Arc::clone(&b.storage))
    }

    /// Names of every live bucket, sorted.
    pub async fn bucket_names(&self) -> Vec<String> {
        let namespace = self.namespace.lock().await;
        let mut names: Vec<String> = namespace.buckets.keys().cloned().collect();
        names.sort();
        names
    }

    pub async fn is_deployed(&self, stack_name: &str) -> bool {
        self.namespace.lock().await.stacks.contains_key(stack_name)
    }
}

#[async_trait]
impl Provisioner for InMemoryProvisioner {
    async fn deploy(&self, stack: &StackDeclaration) -> Result<DeployedStack, ProvisionError> {
        stack.validate()?;

        let mut namespace = self.namespace.lock().await;

        if namespace.stacks.contains_key(stack.name()) {
            return Err(ProvisionError::StackAlreadyDeployed(stack.name().to_string()));
        }
        if let Some(taken) = stack
            .buckets()
            .iter()
            .find(|b| namespace.buckets.contains_key(b.name()))
        {
            tracing::warn!(
                stack = %stack.name(),
                bucket = %taken.name(),
                "Deployment aborted: bucket name already in use"
            );
            return Err(ProvisionError::BucketAlreadyExists(taken.name().to_string()));
        }

        let mut created = Vec::with_capacity(stack.buckets().len());
        for declaration in stack.buckets() {
            let storage: Arc<dyn Storage> = Arc::new(ObjectStorage::in_memory(declaration.name()));
            namespace.buckets.insert(
                declaration.name().to_string(),
                BucketEntry {
                    declaration: declaration.clone(),
                    storage,
                },
            );
            created.push(declaration.name().to_string());
            tracing::info!(
                stack = %stack.name(),
                bucket = %declaration.name(),
                removal_policy = %declaration.removal_policy(),
                auto_empty = declaration.auto_empty(),
                "Bucket created"
            );
        }
        namespace
            .stacks
            .insert(stack.name().to_string(), created.clone());

        Ok(DeployedStack {
            stack: stack.name().to_string(),
            buckets: created,
        })
    }

    async fn destroy(&self, stack_name: &str) -> Result<TeardownReport, ProvisionError> {
        let mut namespace = self.namespace.lock().await;

        let bucket_names = namespace
            .stacks
            .get(stack_name)
            .cloned()
            .ok_or_else(|| ProvisionError::StackNotFound(stack_name.to_string()))?;

        // A destroy bucket that cannot be emptied must fail the teardown before anything is deleted.
        for name in &bucket_names {
            if let Some(entry) = namespace.buckets.get(name) {
                let declaration = &entry.declaration;
                if declaration.removal_policy() == RemovalPolicy::Destroy
                    && !declaration.auto_empty()
                {
                    let objects = entry.storage.list_keys().await.map_err(storage_error)?.len();
                    if objects > 0 {
                        return Err(ProvisionError::BucketNotEmpty {
                            name: name.clone(),
                            objects,
                        });
                    }
                }
            }
        }

        let mut report = TeardownReport {
            stack: stack_name.to_string(),
            ..TeardownReport::default()
        };

        // Every destroy bucket is emptied before any is removed.
        let mut emptied = Vec::new();
        for name in &bucket_names {
            let Some(entry) = namespace.buckets.get(name) else {
                continue;
            };
            match entry.declaration.removal_policy() {
                RemovalPolicy::Destroy => {
                    let deleted = entry.storage.empty().await.map_err(|e| {
                        tracing::error!(
                            stack = %stack_name,
                            bucket = %name,
                            error = %e,
                            "Teardown aborted: bucket could not be emptied"
                        );
                        storage_error(e)
                    })?;
                    emptied.push((name.clone(), deleted));
                }
                RemovalPolicy::Retain => {
                    report.retained.push(name.clone());
                    tracing::info!(stack = %stack_name, bucket = %name, "Bucket retained");
                }
            }
        }

        for (name, deleted) in emptied {
            namespace.buckets.remove(&name);
            report.objects_deleted += deleted;
            tracing::info!(
                stack = %stack_name,
                bucket = %name,
                objects_deleted = deleted,
                "Bucket destroyed"
            );
            report.destroyed.push(name);
        }

        namespace.stacks.remove(stack_name);
        Ok(report)
    }
}
