use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::HeaderMap,
    Extension, Json,
};
use headers::{ContentType, HeaderMapExt};
use log::info;
use serde::{Deserialize, Serialize};

use crate::{
    appstate::AppState,
    middleware::request_tracing::RequestTraceData,
    model::{error::ApiError, form::Field, form::FormFields, record::Record},
    notify::Notifier,
    store::RecordStore,
    workflow::{FormState, SubmitError},
};

#[derive(Debug, Deserialize, Serialize)]
pub struct EditField {
    pub text: String,
}

#[derive(Debug, Deserialize, Serialize, PartialEq)]
pub struct SubmitResponse {
    pub record: Record,
    pub success_message: Option<String>,
}

pub async fn get_form<S: RecordStore, N: Notifier>(
    State(app_state): State<Arc<AppState<S, N>>>,
) -> Json<FormState> {
    Json(app_state.form().lock().await.state().clone())
}

pub async fn edit_field<S: RecordStore, N: Notifier>(
    State(app_state): State<Arc<AppState<S, N>>>,
    Path(field): Path<String>,
    Json(edit): Json<EditField>,
) -> Result<Json<FormState>, ApiError> {
    let field = field
        .parse::<Field>()
        .map_err(ApiError::InputFailedValidation)?;

    let mut form = app_state.form().lock().await;
    form.edit(field, edit.text);

    Ok(Json(form.state().clone()))
}

fn is_json(headers: &HeaderMap) -> bool {
    headers
        .typed_get::<ContentType>()
        .map(mime::Mime::from)
        .is_some_and(|mime| {
            mime.type_() == "application"
                && (mime.subtype() == "json" || mime.suffix().is_some_and(|name| name == "json"))
        })
}

/// An empty body keeps the session fields. Anything else must be a JSON form.
fn replacement_fields(headers: &HeaderMap, body: &[u8]) -> Result<Option<FormFields>, ApiError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(None);
    }

    if !is_json(headers) {
        return Err(ApiError::InputFailedValidation(String::from(
            "Expected request with `Content-Type: application/json`",
        )));
    }

    serde_json::from_slice::<FormFields>(body)
        .map(Some)
        .map_err(|e| ApiError::InputFailedValidation(format!("Invalid form body: {}", e)))
}

/// Submits the form. A body, when given, replaces all four fields first.
pub async fn submit<S: RecordStore, N: Notifier>(
    State(app_state): State<Arc<AppState<S, N>>>,
    Extension(request_trace_data): Extension<RequestTraceData>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<SubmitResponse>, ApiError> {
    let request_id = request_trace_data.get_id();
    let fields = replacement_fields(&headers, &body)?;
    let mut form = app_state.form().lock().await;

    if let Some(fields) = fields {
        form.edit(Field::Name, fields.name);
        form.edit(Field::Cpf, fields.cpf);
        form.edit(Field::Observation, fields.observation);
        form.edit(Field::Value, fields.value);
    }

    info!("[{}] submit called with {:?}", request_id, form.state().fields);

    match form.submit().await {
        Ok(record) => Ok(Json(SubmitResponse {
            record,
            success_message: form.state().success_message.clone(),
        })),
        Err(SubmitError::Invalid(errors)) => Err(ApiError::FormRejected {
            errors,
            shake: form.state().shake,
        }),
        Err(SubmitError::Persistence(e)) => Err(e.into()),
    }
}

pub async fn session_records<S: RecordStore, N: Notifier>(
    State(app_state): State<Arc<AppState<S, N>>>,
) -> Json<Vec<Record>> {
    Json(app_state.form().lock().await.records().to_vec())
}
