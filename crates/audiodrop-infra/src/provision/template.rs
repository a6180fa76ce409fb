use audiodrop_core::{ProvisionError, StackDeclaration};
use serde_json::{json, Map, Value};

const AUTO_DELETE_TAG: &str = "aws-cdk:auto-delete-objects";

/// Render a stack as a CloudFormation template.
///
/// Each bucket becomes an `AWS::S3::Bucket` whose `DeletionPolicy` and
/// `UpdateReplacePolicy` follow its removal policy. Auto-empty buckets are
/// tagged and paired with a `Custom::S3AutoDeleteObjects` resource; the
/// handler backing that resource is supplied by the deployment tool.
pub fn synth_template(stack: &StackDeclaration) -> Result<Value, ProvisionError> {
    stack.validate()?;

    let mut resources = Map::new();
    for bucket in stack.buckets() {
        let logical_id = bucket.logical_id();
        let policy = bucket.removal_policy().deletion_policy();

        let mut properties = json!({ "BucketName": bucket.name() });
        if bucket.auto_empty() {
            properties["Tags"] = json!([{ "Key": AUTO_DELETE_TAG, "Value": "true" }]);
        }

        resources.insert(
            logical_id.clone(),
            json!({
                "Type": "AWS::S3::Bucket",
                "Properties": properties,
                "DeletionPolicy": policy,
                "UpdateReplacePolicy": policy,
            }),
        );

        if bucket.auto_empty() {
            resources.insert(
                format!("{}AutoDeleteObjects", logical_id),
                json!({
                    "Type": "Custom::S3AutoDeleteObjects",
                    "Properties": { "BucketName": { "Ref": logical_id } },
                    "DependsOn": [logical_id],
                    "DeletionPolicy": "Delete",
                    "UpdateReplacePolicy": "Delete",
                }),
            );
        }
    }

    Ok(json!({
        "Description": format!("Audiodrop stack {}", stack.name()),
        "Resources": resources,
    }))
}
