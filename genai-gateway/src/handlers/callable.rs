//! Callable endpoints.
//!
//! Bodies arrive as `{"data": {...}}`. Anything that does not decode into the
//! expected shape is an `INVALID_ARGUMENT`, never a framework rejection.

use crate::dtos::{CallableRequest, CallableResponse, GenerateTemplateRequest, ReviseTextRequest};
use crate::error::CallableError;
use crate::services::metrics;
use crate::services::Operation;
use crate::startup::AppState;
use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};

const BAD_REQUEST_MESSAGE: &str = "Bad Request";

fn decode<T>(
    op: Operation,
    payload: Result<Json<CallableRequest<T>>, JsonRejection>,
) -> Result<T, CallableError> {
    match payload {
        Ok(Json(envelope)) => Ok(envelope.data),
        Err(rejection) => {
            tracing::warn!(
                operation = op.as_str(),
                error = %rejection.body_text(),
                "Undecodable callable request"
            );
            metrics::record_invocation(op.as_str(), "invalid_argument");
            Err(CallableError::InvalidArgument(BAD_REQUEST_MESSAGE.to_string()))
        }
    }
}

pub async fn generate_template(
    State(state): State<AppState>,
    payload: Result<Json<CallableRequest<GenerateTemplateRequest>>, JsonRejection>,
) -> Result<Json<CallableResponse>, CallableError> {
    let request = decode(Operation::GenerateTemplate, payload)?;
    let result = state.forwarder.generate_template(request).await?;
    Ok(Json(CallableResponse { result }))
}

pub async fn revise_text(
    State(state): State<AppState>,
    payload: Result<Json<CallableRequest<ReviseTextRequest>>, JsonRejection>,
) -> Result<Json<CallableResponse>, CallableError> {
    let request = decode(Operation::ReviseText, payload)?;
    let result = state.forwarder.revise_text(request).await?;
    Ok(Json(CallableResponse { result }))
}
