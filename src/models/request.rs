use std::{
    collections::HashMap,
    fmt::{Display, Formatter, Result},
};

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Ios,
    Android,
}

impl Display for Platform {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        match self {
            Platform::Ios => write!(f, "ios"),
            Platform::Android => write!(f, "android"),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct TokenRegistrationRequest {
    pub token: String,
    pub platform: Platform,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TestNotificationRequest {
    pub token: String,
    pub title: String,
    pub body: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NotificationWithDataRequest {
    pub token: String,
    pub title: String,
    pub body: String,

    #[serde(default)]
    pub data: Option<HashMap<String, String>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BatchNotificationRequest {
    #[serde(default)]
    pub tokens: Option<Vec<String>>,
    pub title: String,
    pub body: String,

    #[serde(default)]
    pub data: Option<HashMap<String, String>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TopicNotificationRequest {
    pub topic: String,
    pub title: String,
    pub body: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DataMessageRequest {
    pub token: String,
    pub data: HashMap<String, String>,
}
