use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use chatstate_core::session::Message;
use chatstate_core::Error;

use crate::state::AppState;

const NO_RESPONSE: &str = "No response returned.";

/// Response shape chat clients expect for answers
#[derive(Debug, Serialize)]
pub struct AnswerResponse {
    pub data_points: Vec<String>,
    pub answer: String,
    pub thoughts: String,
}

impl AnswerResponse {
    fn from_latest(answer: Option<&Message>) -> Self {
        Self {
            data_points: Vec::new(),
            answer: answer
                .map(|m| m.content.clone())
                .unwrap_or_else(|| NO_RESPONSE.to_string()),
            thoughts: String::new(),
        }
    }
}

#[derive(Debug, Deserialize, Default)]
pub struct CreateRequest {
    pub instructions: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct PostRequest {
    pub prompt: String,
}

#[derive(Debug, Deserialize)]
pub struct QueryParams {
    #[serde(rename = "timestampUTC")]
    pub timestamp_utc: Option<DateTime<Utc>>,
}

/// Session errors mapped onto HTTP status codes
pub struct ApiError(Error);

impl From<Error> for ApiError {
    fn from(e: Error) -> Self {
        Self(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            Error::InvalidIdentity(_) => StatusCode::BAD_REQUEST,
            Error::SessionNotFound(_) => StatusCode::NOT_FOUND,
            Error::StorageUnavailable { .. } => StatusCode::SERVICE_UNAVAILABLE,
            Error::InferenceFailure { .. } => StatusCode::BAD_GATEWAY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        if status.is_server_error() {
            tracing::error!("Request failed: {}", self.0);
        }
        (status, Json(serde_json::json!({ "error": self.0.to_string() }))).into_response()
    }
}

/// PUT /chats/{assistant_id}
///
/// Creates the assistant session. The body may carry instructions; without
/// them the configured defaults apply. Duplicate creates succeed without
/// touching the existing session.
pub async fn create_assistant_handler(
    State(state): State<AppState>,
    Path(assistant_id): Path<String>,
    body: Option<Json<CreateRequest>>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let instructions = body
        .and_then(|Json(req)| req.instructions)
        .unwrap_or_else(|| state.default_instructions.clone());

    state.manager.create(&assistant_id, &instructions).await?;
    Ok(Json(serde_json::json!({ "assistantId": assistant_id })))
}

/// POST /chats/{assistant_id}
///
/// Posts a prompt and returns the generated answer.
pub async fn post_message_handler(
    State(state): State<AppState>,
    Path(assistant_id): Path<String>,
    Json(req): Json<PostRequest>,
) -> Result<Json<AnswerResponse>, ApiError> {
    let message = state.manager.post(&assistant_id, &req.prompt).await?;
    Ok(Json(AnswerResponse::from_latest(Some(&message))))
}

/// GET /chats/{assistant_id}?timestampUTC=...
///
/// Returns the latest answer as of the optional point-in-time boundary,
/// which will be the latest answer to the last question.
pub async fn get_chat_state_handler(
    State(state): State<AppState>,
    Path(assistant_id): Path<String>,
    Query(params): Query<QueryParams>,
) -> Result<Json<AnswerResponse>, ApiError> {
    let snapshot = state
        .manager
        .query(&assistant_id, params.timestamp_utc)
        .await?;
    Ok(Json(AnswerResponse::from_latest(snapshot.latest_answer())))
}
