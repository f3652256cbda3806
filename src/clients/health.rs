use std::sync::Arc;

use chrono::Utc;
use tracing::debug;

use crate::{
    clients::fcm::PushProvider,
    models::health::{FcmHealth, HealthReport, HealthStatus},
};

pub struct HealthChecker {
    provider: Arc<dyn PushProvider>,
}

impl HealthChecker {
    pub fn new(provider: Arc<dyn PushProvider>) -> Self {
        Self { provider }
    }

    pub fn report(&self) -> HealthReport {
        let project_id = self.provider.project_id().map(str::to_string);

        let status = match &project_id {
            Some(project_id) => {
                debug!(project_id = %project_id, "FCM client is initialized");
                HealthStatus::Healthy
            }
            None => HealthStatus::Degraded,
        };

        HealthReport {
            status,
            timestamp: Utc::now(),
            fcm: FcmHealth {
                initialized: project_id.is_some(),
                project_id,
            },
        }
    }
}
