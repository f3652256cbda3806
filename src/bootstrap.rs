use std::{future::Future, path::Path, sync::Arc};

use anyhow::{Context, Error, Result, anyhow};
use tokio::sync::OnceCell;
use tracing::{error, info};

use crate::{
    clients::fcm::{FcmClient, PushProvider, UninitializedProvider},
    config::Config,
};

/// Holds the process-wide provider client. The first successful
/// initialization wins; later calls return the same client.
#[derive(Default)]
pub struct Bootstrap {
    provider: OnceCell<Arc<dyn PushProvider>>,
}

impl Bootstrap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_initialized(&self) -> bool {
        self.provider.initialized()
    }

    /// Loads the service-account key named by `config` and builds the FCM client.
    pub async fn initialize(&self, config: &Config) -> Result<Arc<dyn PushProvider>, Error> {
        self.initialize_with(|| load_fcm_client(config)).await
    }

    pub async fn initialize_with<F, Fut>(&self, init: F) -> Result<Arc<dyn PushProvider>, Error>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Arc<dyn PushProvider>, Error>>,
    {
        if let Some(provider) = self.provider.get() {
            info!("Firebase already initialized");
            return Ok(Arc::clone(provider));
        }

        let provider = self
            .provider
            .get_or_try_init(|| async move {
                let provider = init().await?;
                info!("Firebase initialized successfully");
                Ok::<_, Error>(provider)
            })
            .await?;

        Ok(Arc::clone(provider))
    }

    /// Best-effort startup: on failure the error is logged and every send
    /// through the returned provider fails with "not initialized".
    pub async fn provider_or_uninitialized(&self, config: &Config) -> Arc<dyn PushProvider> {
        match self.initialize(config).await {
            Ok(provider) => provider,
            Err(e) => {
                error!(
                    path = %config.fcm_credentials_path,
                    error = %e,
                    "Failed to initialize Firebase, push delivery is disabled"
                );
                Arc::new(UninitializedProvider)
            }
        }
    }
}

async fn load_fcm_client(config: &Config) -> Result<Arc<dyn PushProvider>, Error> {
    let path = Path::new(&config.fcm_credentials_path);

    if !path.exists() {
        return Err(anyhow!(
            "Service account key file not found at {}",
            path.display()
        ));
    }

    let key_json = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read service account key {}", path.display()))?;

    let client = FcmClient::from_service_account(&key_json, &config.fcm_base_url)?;

    Ok(Arc::new(client))
}
