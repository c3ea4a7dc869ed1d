use hyper::{
    client::{connect::Connect, HttpConnector},
    header::{ACCEPT, CONTENT_TYPE},
    Body, Client, Method, Request,
};
use hyper_rustls::{HttpsConnector, HttpsConnectorBuilder};
use log::info;
use serde::Serialize;
use serde_json::{json, Value};

use crate::model::error::NotifyError;

use super::{Notifier, PushMessage, PushToken};

pub const DEFAULT_PUSH_RELAY_URL: &str = "https://exp.host/--/api/v2/push/send";

#[derive(Debug, Serialize)]
struct RelayPayload<'a> {
    to: &'a str,
    sound: &'static str,
    title: &'a str,
    body: &'a str,
    data: Value,
}

/// Client for the push relay's send endpoint.
pub struct PushRelay<C> {
    client: Client<C, Body>,
    endpoint: String,
}

impl PushRelay<HttpsConnector<HttpConnector>> {
    pub fn https(endpoint: String) -> Self {
        let connector = HttpsConnectorBuilder::new()
            .with_native_roots()
            .https_or_http()
            .enable_http1()
            .build();

        PushRelay::new(Client::builder().build(connector), endpoint)
    }
}

impl<C> PushRelay<C>
where
    C: Connect + Clone + Send + Sync + 'static,
{
    pub fn new(client: Client<C, Body>, endpoint: String) -> Self {
        PushRelay { client, endpoint }
    }
}

impl<C> Notifier for PushRelay<C>
where
    C: Connect + Clone + Send + Sync + 'static,
{
    async fn send(&self, token: &PushToken, message: &PushMessage) -> Result<(), NotifyError> {
        let payload = RelayPayload {
            to: token.as_str(),
            sound: "default",
            title: &message.title,
            body: &message.body,
            data: json!({ "kind": "new_record" }),
        };

        let request = Request::builder()
            .method(Method::POST)
            .uri(self.endpoint.as_str())
            .header(ACCEPT, mime::APPLICATION_JSON.as_ref())
            .header(CONTENT_TYPE, mime::APPLICATION_JSON.as_ref())
            .body(Body::from(serde_json::to_vec(&payload)?))?;

        let response = self.client.request(request).await?;
        let status = response.status();
        let body = hyper::body::to_bytes(response.into_body()).await?;

        info!("push relay -> {}", status.as_u16());

        if !status.is_success() {
            return Err(NotifyError::Relay {
                status: status.as_u16(),
                body: String::from_utf8_lossy(&body).into_owned(),
            });
        }

        Ok(())
    }
}
