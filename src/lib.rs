use std::sync::Arc;

use axum::{
    routing::{get, post, put},
    Router,
};

use tower::ServiceBuilder;

use crate::{appstate::AppState, notify::Notifier, store::RecordStore};

pub mod appstate;
pub mod config;
pub mod handlers;
pub mod listing;
pub mod middleware;
pub mod model;
pub mod notify;
pub mod store;
pub mod workflow;

pub fn router<S, N>(app_state: AppState<S, N>) -> Router
where
    S: RecordStore,
    N: Notifier,
{
    let app_state = Arc::new(app_state);

    Router::new()
        .route("/form", get(crate::handlers::form::get_form::<S, N>))
        .route(
            "/form/fields/:field",
            put(crate::handlers::form::edit_field::<S, N>),
        )
        .route("/form/submit", post(crate::handlers::form::submit::<S, N>))
        .route(
            "/form/records",
            get(crate::handlers::form::session_records::<S, N>),
        )
        .route("/records", get(crate::handlers::records::list_records::<S, N>))
        .route(
            "/records/state",
            get(crate::handlers::records::listing_state::<S, N>),
        )
        .route(
            "/records/:id/done",
            post(crate::handlers::records::mark_done::<S, N>),
        )
        .route(
            "/notifications/register",
            post(crate::handlers::notifications::register_device::<S, N>),
        )
        .fallback(crate::handlers::path_not_found::handler_404)
        .layer(ServiceBuilder::new().layer(axum::middleware::from_fn(
            crate::middleware::request_tracing::request_tracing,
        )))
        .with_state(app_state)
}
