use thiserror::Error;

/// Failures raised by the FCM provider client.
#[derive(Error, Debug)]
pub enum FcmError {
    #[error("FCM client is not initialized")]
    NotInitialized,

    #[error("Invalid service account credentials: {0}")]
    InvalidCredentials(String),

    #[error("Failed to get access token: {0}")]
    Auth(String),

    #[error("FCM send request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("FCM API error: {status} - {message}")]
    Api { status: u16, message: String },
}

impl From<gcp_auth::Error> for FcmError {
    fn from(err: gcp_auth::Error) -> Self {
        FcmError::Auth(err.to_string())
    }
}
