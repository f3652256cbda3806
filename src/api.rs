use std::sync::Arc;

use anyhow::{Error, Result, anyhow};
use axum::{
    Router,
    extract::{FromRequest, State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use crate::{
    clients::{fcm::PushProvider, health::HealthChecker},
    config::Config,
    models::{
        health::HealthReport,
        request::{
            BatchNotificationRequest, DataMessageRequest, NotificationWithDataRequest,
            TestNotificationRequest, TokenRegistrationRequest, TopicNotificationRequest,
        },
        response::{ApiResponse, BatchSummary, MessageSent},
    },
    service::FcmService,
};

pub struct AppState {
    fcm_service: FcmService,
    health_checker: HealthChecker,
}

/// Every failure on `/api/fcm` is reported as a 500 with `{success: false, error}`.
pub struct ApiError(Error);

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        Self(err)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self(anyhow!("Invalid request body: {}", rejection.body_text()))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ApiResponse::error(self.0.to_string())),
        )
            .into_response()
    }
}

/// JSON body extractor whose rejections use the same 500 envelope as
/// provider failures.
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct ApiJson<T>(pub T);

pub fn router(provider: Arc<dyn PushProvider>) -> Router {
    let state = Arc::new(AppState {
        fcm_service: FcmService::new(Arc::clone(&provider)),
        health_checker: HealthChecker::new(provider),
    });

    let fcm_routes = Router::new()
        .route("/register", post(register_token))
        .route("/test", post(send_test_notification))
        .route("/send-with-data", post(send_notification_with_data))
        .route("/batch", post(send_batch_notification))
        .route("/topic", post(send_to_topic))
        .route("/data", post(send_data_message));

    Router::new()
        .route("/health", get(health_check))
        .nest("/api/fcm", fcm_routes)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn run_api_server(config: Config, provider: Arc<dyn PushProvider>) -> Result<(), Error> {
    let app = router(provider);

    let addr = format!("0.0.0.0:{}", config.server_port);
    let listener = TcpListener::bind(&addr).await?;

    info!(address = %addr, "Push gateway server started");

    axum::serve(listener, app).await?;

    Ok(())
}

// Always 200: an uninitialized provider degrades delivery, not the process.
async fn health_check(State(state): State<Arc<AppState>>) -> Json<HealthReport> {
    Json(state.health_checker.report())
}

// Tokens are accepted but not persisted yet.
async fn register_token(
    ApiJson(request): ApiJson<TokenRegistrationRequest>,
) -> Json<ApiResponse<()>> {
    let token_prefix: String = request.token.chars().take(20).collect();

    info!(
        platform = %request.platform,
        token_prefix = %token_prefix,
        "FCM token registration request"
    );

    Json(ApiResponse::message("registered"))
}

async fn send_test_notification(
    State(state): State<Arc<AppState>>,
    ApiJson(request): ApiJson<TestNotificationRequest>,
) -> Result<Json<ApiResponse<MessageSent>>, ApiError> {
    info!("Test notification request");

    let message_id = state
        .fcm_service
        .send_notification(&request.token, &request.title, &request.body)
        .await
        .inspect_err(|e| error!(error = %e, "Failed to send test notification"))?;

    Ok(Json(
        ApiResponse::success(MessageSent { message_id })
            .with_message("Test notification sent successfully"),
    ))
}

async fn send_notification_with_data(
    State(state): State<Arc<AppState>>,
    ApiJson(request): ApiJson<NotificationWithDataRequest>,
) -> Result<Json<ApiResponse<MessageSent>>, ApiError> {
    info!("Sending notification with data");

    let message_id = state
        .fcm_service
        .send_notification_with_data(&request.token, &request.title, &request.body, request.data)
        .await
        .inspect_err(|e| error!(error = %e, "Failed to send notification with data"))?;

    Ok(Json(ApiResponse::success(MessageSent { message_id })))
}

async fn send_batch_notification(
    State(state): State<Arc<AppState>>,
    ApiJson(request): ApiJson<BatchNotificationRequest>,
) -> Result<Json<ApiResponse<BatchSummary>>, ApiError> {
    let tokens = request.tokens.unwrap_or_default();

    info!(token_count = tokens.len(), "Batch notification request");

    let response = state
        .fcm_service
        .send_batch_notification(&tokens, &request.title, &request.body, request.data)
        .await
        .inspect_err(|e| error!(error = %e, "Failed to send batch notification"))?;

    let (success_count, failure_count) = response
        .map(|r| (r.success_count(), r.failure_count()))
        .unwrap_or((0, 0));

    Ok(Json(ApiResponse::success(BatchSummary {
        success_count,
        failure_count,
        total_count: tokens.len(),
    })))
}

async fn send_to_topic(
    State(state): State<Arc<AppState>>,
    ApiJson(request): ApiJson<TopicNotificationRequest>,
) -> Result<Json<ApiResponse<MessageSent>>, ApiError> {
    info!(topic = %request.topic, "Topic notification request");

    let message_id = state
        .fcm_service
        .send_to_topic(&request.topic, &request.title, &request.body)
        .await
        .inspect_err(|e| error!(error = %e, "Failed to send topic notification"))?;

    Ok(Json(ApiResponse::success(MessageSent { message_id })))
}

async fn send_data_message(
    State(state): State<Arc<AppState>>,
    ApiJson(request): ApiJson<DataMessageRequest>,
) -> Result<Json<ApiResponse<MessageSent>>, ApiError> {
    info!(key_count = request.data.len(), "Data message request");

    let message_id = state
        .fcm_service
        .send_data_message(&request.token, request.data)
        .await
        .inspect_err(|e| error!(error = %e, "Failed to send data message"))?;

    Ok(Json(ApiResponse::success(MessageSent { message_id })))
}
