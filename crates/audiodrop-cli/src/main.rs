//! Audiodrop CLI: upload an audio file, or synthesize the bucket stack.
//!
//! Set AUDIODROP_API_URL (default http://localhost:8080).

use anyhow::Context;
use audiodrop_api_client::{ClientConfig, FilePicker, StdoutReporter, UploadClient};
use audiodrop_cli::{init_tracing, render_template};
use audiodrop_core::default_stack;
use clap::{Parser, Subcommand};
use std::process::ExitCode;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "audiodrop", about = "Audiodrop upload CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Upload one audio file to the ingestion endpoint
    Upload {
        /// Path to the file to upload
        file: std::path::PathBuf,
    },
    /// Bucket stack operations
    Stack {
        #[command(subcommand)]
        sub: StackCommands,
    },
}

#[derive(Subcommand)]
enum StackCommands {
    /// Print the CloudFormation template of the default stack
    Synth,
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    dotenvy::dotenv().ok();
    init_tracing();

    let cli = Cli::parse();

    match cli.command {
        Commands::Upload { file } => {
            let config = ClientConfig::from_env().context("Invalid client configuration")?;
            let picker = FilePicker::new(config.accept.clone());
            let selection = picker.pick(&file).await?;

            let client = UploadClient::from_config(&config, Arc::new(StdoutReporter))
                .context("Failed to create upload client")?;
            client.select_file(selection).await;

            let outcome = client.submit().await;
            if outcome.is_uploaded() {
                Ok(ExitCode::SUCCESS)
            } else {
                Ok(ExitCode::FAILURE)
            }
        }
        Commands::Stack { sub } => match sub {
            StackCommands::Synth => {
                let stack = default_stack().context("Invalid default stack")?;
                println!("{}", render_template(&stack)?);
                Ok(ExitCode::SUCCESS)
            }
        },
    }
}
