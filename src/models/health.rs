use chrono::{DateTime, Utc};
use serde::Serialize;

/// `Degraded` means the process is serving but cannot deliver pushes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Degraded,
}

#[derive(Debug, Clone, Serialize)]
pub struct HealthReport {
    pub status: HealthStatus,
    pub timestamp: DateTime<Utc>,
    pub fcm: FcmHealth,
}

#[derive(Debug, Clone, Serialize)]
pub struct FcmHealth {
    pub initialized: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_id: Option<String>,
}
