use anyhow::Context;
use audiodrop_core::StackDeclaration;

/// Initialize tracing for CLI binaries. Logs go to stderr so stdout carries
/// only command output.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
}

/// Pretty-printed template for a stack.
pub fn render_template(stack: &StackDeclaration) -> anyhow::Result<String> {
    let template = audiodrop_infra::synth_template(stack).context("Invalid stack declaration")?;
    serde_json::to_string_pretty(&template).context("Serialize template")
}

#[cfg(test)]
mod tests {
    use super::*;
    use audiodrop_core::default_stack;

    #[test]
    fn template_names_default_bucket() {
        let rendered = render_template(&default_stack().unwrap()).unwrap();
        assert!(rendered.contains("\"BucketName\": \"my-mp3-bucket\""));
        assert!(rendered.contains("Custom::S3AutoDeleteObjects"));
    }
}
