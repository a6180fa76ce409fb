use anyhow::Context;
use audiodrop_core::Config;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    let config = Config::from_env().context("Failed to load configuration")?;

    let (_state, router) = audiodrop_api::setup::initialize_app(config.clone()).await?;

    audiodrop_api::setup::server::start_server(&config, router).await?;

    Ok(())
}
