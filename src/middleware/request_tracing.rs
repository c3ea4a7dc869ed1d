use std::{net::SocketAddr, time::Instant};

use axum::{
    extract::ConnectInfo,
    http::{HeaderValue, Request},
    middleware::Next,
    response::Response,
};
use log::{info, warn};
use tracing::Instrument;

pub const REQUEST_ID_HEADER: &str = "x-request-id";

#[derive(Clone)]
pub struct RequestTraceData {
    id: String,
}

impl RequestTraceData {
    pub fn get_id(&self) -> String {
        return self.id.clone();
    }
}

fn get_remote_ip_addr<T>(req: &Request<T>) -> String {
    match req.extensions().get::<ConnectInfo<SocketAddr>>() {
        Some(ConnectInfo(socket_addr)) => socket_addr.ip().to_string(),
        None => String::from("local"),
    }
}

fn get_user_agent<T>(req: &Request<T>) -> &str {
    req.headers()
        .get(axum::http::header::USER_AGENT)
        .and_then(|header| header.to_str().ok())
        .unwrap_or("not-set")
}

/// Tags each request with an id, logs it on the way in and its status on the
/// way out, and echoes the id in `X-Request-Id`.
pub async fn request_tracing<T>(mut req: Request<T>, next: Next<T>) -> Response {
    let request_id = nanoid::nanoid!(10);
    let started = Instant::now();
    let method = req.method().clone();
    let uri = req.uri().to_string();

    info!(
        "[{}] {} '{}' {} {}",
        request_id,
        get_remote_ip_addr(&req),
        get_user_agent(&req),
        method,
        uri,
    );

    req.extensions_mut().insert(RequestTraceData {
        id: request_id.clone(),
    });

    let span = tracing::info_span!("request", id = %request_id);
    let mut response = next.run(req).instrument(span).await;

    let status = response.status();
    if status.is_server_error() {
        warn!(
            "[{}] {} {} -> {} in {:?}",
            request_id,
            method,
            uri,
            status.as_u16(),
            started.elapsed()
        );
    } else {
        info!(
            "[{}] {} {} -> {} in {:?}",
            request_id,
            method,
            uri,
            status.as_u16(),
            started.elapsed()
        );
    }

    if let Ok(header_value) = HeaderValue::from_str(&request_id) {
        response
            .headers_mut()
            .insert(REQUEST_ID_HEADER, header_value);
    }

    response
}
