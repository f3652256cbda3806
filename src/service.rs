use std::{collections::HashMap, sync::Arc};

use anyhow::{Error, Result, anyhow};
use tracing::{error, info, warn};

use crate::{
    clients::fcm::PushProvider,
    models::fcm::{
        AndroidConfig, AndroidNotification, AndroidPriority, ApnsConfig, ApnsPayload, Aps,
        BatchResponse, FcmMessage, FcmNotification,
    },
    utils::mask_token,
};

pub const DEFAULT_SOUND: &str = "default";
pub const NOTIFICATION_COLOR: &str = "#3b82f6";
pub const NOTIFICATION_CHANNEL_ID: &str = "default";
pub const BADGE_COUNT: u32 = 1;

/// Largest token list a single multicast accepts, matching the FCM Admin SDK.
pub const MAX_MULTICAST_TOKENS: usize = 500;

/// Builds FCM messages with the fixed per-platform delivery hints and hands
/// them to a [`PushProvider`].
#[derive(Clone)]
pub struct FcmService {
    provider: Arc<dyn PushProvider>,
}

impl FcmService {
    pub fn new(provider: Arc<dyn PushProvider>) -> Self {
        Self { provider }
    }

    pub async fn send_notification(
        &self,
        device_token: &str,
        title: &str,
        body: &str,
    ) -> Result<String, Error> {
        self.send_notification_with_data(device_token, title, body, None)
            .await
    }

    pub async fn send_notification_with_data(
        &self,
        device_token: &str,
        title: &str,
        body: &str,
        data: Option<HashMap<String, String>>,
    ) -> Result<String, Error> {
        let message = FcmMessage {
            token: Some(device_token.to_string()),
            ..device_message(title, body, data)
        };

        match self.provider.send(&message).await {
            Ok(message_id) => {
                info!(
                    message_id = %message_id,
                    token = %mask_token(device_token),
                    "Successfully sent message"
                );
                Ok(message_id)
            }
            Err(e) => {
                error!(
                    token = %mask_token(device_token),
                    error = %e,
                    "Failed to send FCM message"
                );
                Err(anyhow!("FCM send failed: {}", e))
            }
        }
    }

    /// Fans one notification out to every token. Returns `Ok(None)` without
    /// contacting the provider when `device_tokens` is empty, and fails without
    /// contacting it when there are more than [`MAX_MULTICAST_TOKENS`].
    pub async fn send_batch_notification(
        &self,
        device_tokens: &[String],
        title: &str,
        body: &str,
        data: Option<HashMap<String, String>>,
    ) -> Result<Option<BatchResponse>, Error> {
        if device_tokens.is_empty() {
            warn!("No device tokens provided for batch notification");
            return Ok(None);
        }

        if device_tokens.len() > MAX_MULTICAST_TOKENS {
            warn!(
                token_count = device_tokens.len(),
                max_tokens = MAX_MULTICAST_TOKENS,
                "Batch notification exceeds multicast limit"
            );
            return Err(anyhow!(
                "FCM batch send failed: multicast supports at most {} tokens, got {}",
                MAX_MULTICAST_TOKENS,
                device_tokens.len()
            ));
        }

        let template = device_message(title, body, data);
        let messages: Vec<FcmMessage> = device_tokens
            .iter()
            .map(|token| FcmMessage {
                token: Some(token.clone()),
                ..template.clone()
            })
            .collect();

        let response = self.provider.send_each(&messages).await.map_err(|e| {
            error!(error = %e, "Failed to send batch FCM messages");
            anyhow!("FCM batch send failed: {}", e)
        })?;

        info!(
            success_count = response.success_count(),
            failure_count = response.failure_count(),
            total_count = device_tokens.len(),
            "Batch notification sent"
        );

        for (token, outcome) in device_tokens.iter().zip(&response.responses) {
            if let Some(reason) = &outcome.error {
                error!(token = %mask_token(token), error = %reason, "Failed to send to token");
            }
        }

        Ok(Some(response))
    }

    /// Data-only message without a notification block, for background handling.
    pub async fn send_data_message(
        &self,
        device_token: &str,
        data: HashMap<String, String>,
    ) -> Result<String, Error> {
        let message = FcmMessage {
            token: Some(device_token.to_string()),
            data: Some(data),
            android: Some(AndroidConfig {
                priority: AndroidPriority::High,
                notification: None,
            }),
            apns: Some(ApnsConfig {
                payload: ApnsPayload {
                    aps: Aps {
                        content_available: Some(1),
                        ..Aps::default()
                    },
                },
            }),
            ..FcmMessage::default()
        };

        match self.provider.send(&message).await {
            Ok(message_id) => {
                info!(
                    message_id = %message_id,
                    token = %mask_token(device_token),
                    "Data message sent"
                );
                Ok(message_id)
            }
            Err(e) => {
                error!(
                    token = %mask_token(device_token),
                    error = %e,
                    "Failed to send data message"
                );
                Err(anyhow!("FCM data message send failed: {}", e))
            }
        }
    }

    pub async fn send_to_topic(&self, topic: &str, title: &str, body: &str) -> Result<String, Error> {
        let message = topic_message(topic, title, body);

        match self.provider.send(&message).await {
            Ok(message_id) => {
                info!(message_id = %message_id, topic, "Topic message sent");
                Ok(message_id)
            }
            Err(e) => {
                error!(topic, error = %e, "Failed to send topic message");
                Err(anyhow!("FCM topic send failed: {}", e))
            }
        }
    }
}

/// Notification addressed to a device; the caller fills in `token`.
fn device_message(title: &str, body: &str, data: Option<HashMap<String, String>>) -> FcmMessage {
    FcmMessage {
        notification: Some(FcmNotification {
            title: title.to_string(),
            body: body.to_string(),
        }),
        data: data.filter(|d| !d.is_empty()),
        android: Some(AndroidConfig {
            priority: AndroidPriority::High,
            notification: Some(AndroidNotification {
                sound: Some(DEFAULT_SOUND.to_string()),
                color: Some(NOTIFICATION_COLOR.to_string()),
                channel_id: Some(NOTIFICATION_CHANNEL_ID.to_string()),
            }),
        }),
        apns: Some(ApnsConfig {
            payload: ApnsPayload {
                aps: Aps {
                    sound: Some(DEFAULT_SOUND.to_string()),
                    badge: Some(BADGE_COUNT),
                    content_available: Some(1),
                },
            },
        }),
        ..FcmMessage::default()
    }
}

fn topic_message(topic: &str, title: &str, body: &str) -> FcmMessage {
    FcmMessage {
        topic: Some(topic.to_string()),
        notification: Some(FcmNotification {
            title: title.to_string(),
            body: body.to_string(),
        }),
        android: Some(AndroidConfig {
            priority: AndroidPriority::High,
            notification: Some(AndroidNotification {
                sound: Some(DEFAULT_SOUND.to_string()),
                color: Some(NOTIFICATION_COLOR.to_string()),
                channel_id: None,
            }),
        }),
        apns: Some(ApnsConfig {
            payload: ApnsPayload {
                aps: Aps {
                    sound: Some(DEFAULT_SOUND.to_string()),
                    ..Aps::default()
                },
            },
        }),
        ..FcmMessage::default()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_device_message_carries_platform_hints() {
        let message = FcmMessage {
            token: Some("device-token".to_string()),
            ..device_message("Hello", "World", None)
        };

        assert_eq!(
            serde_json::to_value(&message).unwrap(),
            json!({
                "token": "device-token",
                "notification": { "title": "Hello", "body": "World" },
                "android": {
                    "priority": "HIGH",
                    "notification": {
                        "sound": "default",
                        "color": "#3b82f6",
                        "channel_id": "default"
                    }
                },
                "apns": {
                    "payload": {
                        "aps": { "sound": "default", "badge": 1, "content-available": 1 }
                    }
                }
            })
        );
    }

    #[test]
    fn test_empty_data_is_dropped() {
        let message = device_message("t", "b", Some(HashMap::new()));
        assert!(message.data.is_none());

        let data = HashMap::from([("route".to_string(), "42".to_string())]);
        let message = device_message("t", "b", Some(data.clone()));
        assert_eq!(message.data, Some(data));
        assert!(message.notification.is_some());
    }

    #[test]
    fn test_topic_message_uses_reduced_hints() {
        let message = topic_message("route-updates", "t", "b");

        assert_eq!(message.topic.as_deref(), Some("route-updates"));
        assert!(message.token.is_none());

        let android = message.android.unwrap();
        assert_eq!(android.priority, AndroidPriority::High);
        assert!(android.notification.unwrap().channel_id.is_none());

        let aps = message.apns.unwrap().payload.aps;
        assert_eq!(aps.sound.as_deref(), Some("default"));
        assert!(aps.badge.is_none());
        assert!(aps.content_available.is_none());
    }
}
