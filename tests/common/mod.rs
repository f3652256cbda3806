#![allow(dead_code)]

use std::sync::{
    Mutex,
    atomic::{AtomicUsize, Ordering},
};

use async_trait::async_trait;
use fcm_push_gateway::{
    clients::fcm::PushProvider,
    errors::FcmError,
    models::fcm::{BatchResponse, FcmMessage, SendResponse},
};

/// In-memory provider that records every message it is asked to deliver.
pub struct MockProvider {
    message_id: String,
    error: Option<String>,
    failing_tokens: Vec<String>,
    calls: AtomicUsize,
    sent: Mutex<Vec<FcmMessage>>,
}

impl MockProvider {
    pub fn succeeding(message_id: &str) -> Self {
        Self {
            message_id: message_id.to_string(),
            error: None,
            failing_tokens: Vec::new(),
            calls: AtomicUsize::new(0),
            sent: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(error: &str) -> Self {
        Self {
            error: Some(error.to_string()),
            ..Self::succeeding("unused")
        }
    }

    pub fn with_failing_tokens(mut self, tokens: &[&str]) -> Self {
        self.failing_tokens = tokens.iter().map(|t| t.to_string()).collect();
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn sent(&self) -> Vec<FcmMessage> {
        self.sent.lock().unwrap().clone()
    }

    fn deliver(&self, message: &FcmMessage) -> Result<String, FcmError> {
        self.sent.lock().unwrap().push(message.clone());

        let token = message.token.clone().unwrap_or_default();
        if self.failing_tokens.contains(&token) {
            return Err(FcmError::Api {
                status: 404,
                message: "Requested entity was not found.".to_string(),
            });
        }

        Ok(self.message_id.clone())
    }

    fn whole_request_error(&self) -> Option<FcmError> {
        self.error.as_ref().map(|message| FcmError::Api {
            status: 400,
            message: message.clone(),
        })
    }
}

#[async_trait]
impl PushProvider for MockProvider {
    async fn send(&self, message: &FcmMessage) -> Result<String, FcmError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        if let Some(err) = self.whole_request_error() {
            return Err(err);
        }

        self.deliver(message)
    }

    async fn send_each(&self, messages: &[FcmMessage]) -> Result<BatchResponse, FcmError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        if let Some(err) = self.whole_request_error() {
            return Err(err);
        }

        let responses = messages
            .iter()
            .map(|message| match self.deliver(message) {
                Ok(id) => SendResponse::success(id),
                Err(e) => SendResponse::failure(e.to_string()),
            })
            .collect();

        Ok(BatchResponse { responses })
    }

    fn project_id(&self) -> Option<&str> {
        Some("mock-project")
    }
}
