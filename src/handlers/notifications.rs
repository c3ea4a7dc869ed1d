use std::sync::Arc;

use axum::{extract::State, Extension, Json};
use log::info;
use serde::{Deserialize, Serialize};

use crate::{
    appstate::AppState,
    middleware::request_tracing::RequestTraceData,
    model::error::{ApiError, NotifyError},
    notify::{register, Notifier, Permission, PushToken},
    store::RecordStore,
};

#[derive(Debug, Deserialize, Serialize)]
pub struct RegisterDevice {
    pub permission: Permission,
    #[serde(default)]
    pub token: String,
}

#[derive(Debug, Deserialize, Serialize, PartialEq)]
pub struct RegisterResponse {
    pub token: PushToken,
}

/// The device reports its permission answer and relay token. A denial leaves the
/// session without a token so submissions stop notifying.
pub async fn register_device<S: RecordStore, N: Notifier>(
    State(app_state): State<Arc<AppState<S, N>>>,
    Extension(request_trace_data): Extension<RequestTraceData>,
    Json(device): Json<RegisterDevice>,
) -> Result<Json<RegisterResponse>, ApiError> {
    info!(
        "[{}] register_device with permission {:?}",
        request_trace_data.get_id(),
        device.permission
    );

    match register(device.permission, &device.token) {
        Ok(token) => {
            app_state.register_push_token(token.clone()).await;
            Ok(Json(RegisterResponse { token }))
        }
        Err(NotifyError::PermissionDenied) => {
            app_state.clear_push_token().await;
            Err(ApiError::PermissionDenied)
        }
        Err(e) => Err(e.into()),
    }
}
