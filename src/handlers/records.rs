use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Extension, Json,
};
use log::info;
use serde::{Deserialize, Serialize};

use crate::{
    appstate::AppState,
    listing::{ListingState, MarkDoneOutcome},
    middleware::request_tracing::RequestTraceData,
    model::{
        error::ApiError,
        record_action::{Confirmation, RecordAction},
    },
    notify::Notifier,
    store::RecordStore,
};

#[derive(Debug, Deserialize, Serialize)]
pub struct MarkDone {
    pub action: RecordAction,
    /// Answer to the yes/no prompt.
    pub confirmed: bool,
}

#[derive(Debug, Serialize)]
pub struct MarkDoneResponse {
    pub outcome: MarkDoneOutcome,
    pub listing: ListingState,
}

/// Pull-to-refresh: fetches every record, newest first.
pub async fn list_records<S: RecordStore, N: Notifier>(
    State(app_state): State<Arc<AppState<S, N>>>,
    Extension(request_trace_data): Extension<RequestTraceData>,
) -> Result<Json<ListingState>, ApiError> {
    info!("[{}] refreshing listing", request_trace_data.get_id());

    Ok(Json(app_state.listing().refresh().await?))
}

pub async fn listing_state<S: RecordStore, N: Notifier>(
    State(app_state): State<Arc<AppState<S, N>>>,
) -> Json<ListingState> {
    Json(app_state.listing().state().await)
}

pub async fn mark_done<S: RecordStore, N: Notifier>(
    State(app_state): State<Arc<AppState<S, N>>>,
    Path(id): Path<i64>,
    Extension(request_trace_data): Extension<RequestTraceData>,
    Json(mark_done): Json<MarkDone>,
) -> Result<Json<MarkDoneResponse>, ApiError> {
    info!(
        "[{}] mark_done {} called with {:?}",
        request_trace_data.get_id(),
        id,
        mark_done
    );

    let outcome = app_state
        .listing()
        .mark_done(id, mark_done.action, Confirmation::from(mark_done.confirmed))
        .await?;

    Ok(Json(MarkDoneResponse {
        outcome,
        listing: app_state.listing().state().await,
    }))
}
