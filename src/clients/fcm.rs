use std::sync::Arc;

use async_trait::async_trait;
use futures_util::stream::{self, StreamExt};
use gcp_auth::{CustomServiceAccount, TokenProvider};
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, info};

use crate::{
    errors::FcmError,
    models::fcm::{
        BatchResponse, FcmErrorEnvelope, FcmMessage, FcmRequest, FcmSendResponse, SendResponse,
    },
};

pub const FCM_SCOPES: &[&str] = &["https://www.googleapis.com/auth/firebase.messaging"];

/// Upper bound on in-flight `messages:send` requests during `send_each`.
pub const MAX_CONCURRENT_SENDS: usize = 50;

/// Delivery backend used by [`crate::service::FcmService`].
#[async_trait]
pub trait PushProvider: Send + Sync {
    /// Sends one message and returns the provider-assigned message id.
    async fn send(&self, message: &FcmMessage) -> Result<String, FcmError>;

    /// Sends every message independently. Individual failures are reported in
    /// the returned [`BatchResponse`]; only a failure that prevents the whole
    /// request (missing credentials, auth) is returned as an error.
    async fn send_each(&self, messages: &[FcmMessage]) -> Result<BatchResponse, FcmError>;

    fn project_id(&self) -> Option<&str>;
}

#[derive(Debug, Deserialize)]
struct ServiceAccountKey {
    project_id: String,
    client_email: String,
}

enum Credentials {
    ServiceAccount(Arc<CustomServiceAccount>),
    AccessToken(String),
}

pub struct FcmClient {
    http_client: Client,
    base_url: String,
    project_id: String,
    credentials: Credentials,
}

impl FcmClient {
    pub fn from_service_account(key_json: &str, base_url: &str) -> Result<Self, FcmError> {
        let key: ServiceAccountKey = serde_json::from_str(key_json)
            .map_err(|e| FcmError::InvalidCredentials(e.to_string()))?;

        let account = CustomServiceAccount::from_json(key_json)
            .map_err(|e| FcmError::InvalidCredentials(e.to_string()))?;

        info!(
            project_id = %key.project_id,
            client_email = %key.client_email,
            "FCM client initialized"
        );

        Ok(Self {
            http_client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            project_id: key.project_id,
            credentials: Credentials::ServiceAccount(Arc::new(account)),
        })
    }

    /// Client with a fixed bearer token, for emulators and local testing.
    pub fn with_access_token(project_id: &str, access_token: &str, base_url: &str) -> Self {
        Self {
            http_client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            project_id: project_id.to_string(),
            credentials: Credentials::AccessToken(access_token.to_string()),
        }
    }

    fn send_url(&self) -> String {
        format!(
            "{}/v1/projects/{}/messages:send",
            self.base_url, self.project_id
        )
    }

    async fn access_token(&self) -> Result<String, FcmError> {
        match &self.credentials {
            Credentials::ServiceAccount(account) => {
                let token = account.token(FCM_SCOPES).await?;
                Ok(token.as_str().to_string())
            }
            Credentials::AccessToken(token) => Ok(token.clone()),
        }
    }

    async fn post_message(
        &self,
        access_token: &str,
        message: &FcmMessage,
    ) -> Result<String, FcmError> {
        let request = FcmRequest { message };

        let response = self
            .http_client
            .post(self.send_url())
            .bearer_auth(access_token)
            .json(&request)
            .send()
            .await?;

        let status = response.status();

        if status.is_success() {
            let sent: FcmSendResponse = response.json().await?;
            debug!(message_id = %sent.name, "FCM accepted message");
            Ok(sent.name)
        } else {
            let error_text = response.text().await?;
            let message = serde_json::from_str::<FcmErrorEnvelope>(&error_text)
                .ok()
                .and_then(|envelope| envelope.error.message)
                .unwrap_or(error_text);

            Err(FcmError::Api {
                status: status.as_u16(),
                message,
            })
        }
    }
}

#[async_trait]
impl PushProvider for FcmClient {
    async fn send(&self, message: &FcmMessage) -> Result<String, FcmError> {
        let access_token = self.access_token().await?;
        self.post_message(&access_token, message).await
    }

    async fn send_each(&self, messages: &[FcmMessage]) -> Result<BatchResponse, FcmError> {
        let access_token = self.access_token().await?;

        let access_token = access_token.as_str();
        let sends: Vec<_> = messages
            .iter()
            .map(|message| self.post_message(access_token, message))
            .collect();

        let responses: Vec<SendResponse> = stream::iter(sends)
            .buffered(MAX_CONCURRENT_SENDS)
            .map(|result| match result {
                Ok(message_id) => SendResponse::success(message_id),
                Err(e) => SendResponse::failure(e.to_string()),
            })
            .collect()
            .await;

        Ok(BatchResponse { responses })
    }

    fn project_id(&self) -> Option<&str> {
        Some(self.project_id.as_str())
    }
}

/// Stands in for the provider when no credentials were loaded at startup.
pub struct UninitializedProvider;

#[async_trait]
impl PushProvider for UninitializedProvider {
    async fn send(&self, _message: &FcmMessage) -> Result<String, FcmError> {
        Err(FcmError::NotInitialized)
    }

    async fn send_each(&self, _messages: &[FcmMessage]) -> Result<BatchResponse, FcmError> {
        Err(FcmError::NotInitialized)
    }

    fn project_id(&self) -> Option<&str> {
        None
    }
}
