use anyhow::{Error, Result, anyhow};
use fcm_push_gateway::{api::run_api_server, bootstrap::Bootstrap, config::Config, utils::init_tracing};

#[tokio::main]
async fn main() -> Result<(), Error> {
    let config = Config::load()?;

    init_tracing(&config.log_format)?;

    rustls::crypto::ring::default_provider()
        .install_default()
        .map_err(|_| anyhow!("Failed to install rustls crypto provider"))?;

    let bootstrap = Bootstrap::new();
    let provider = bootstrap.provider_or_uninitialized(&config).await;

    run_api_server(config, provider).await
}
