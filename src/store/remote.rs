use headers::{authorization::Bearer, Authorization, ContentType, HeaderMapExt};
use hyper::{
    body::Bytes,
    client::{connect::Connect, HttpConnector},
    header::ACCEPT,
    Body, Client, Method, Request,
};
use hyper_rustls::{HttpsConnector, HttpsConnectorBuilder};
use log::{info, warn};
use serde_json::{json, Value};

use crate::model::{error::PersistenceError, record::Record};

use super::RecordStore;

/// Connection details of the hosted store, injected at startup.
#[derive(Debug, Clone, PartialEq)]
pub struct RemoteStoreConfig {
    pub endpoint: String,
    pub api_key: String,
    pub table: String,
}

/// Records table on a hosted PostgREST endpoint (`{endpoint}/rest/v1/{table}`).
pub struct RemoteStore<C> {
    client: Client<C, Body>,
    config: RemoteStoreConfig,
}

impl RemoteStore<HttpsConnector<HttpConnector>> {
    pub fn https(config: RemoteStoreConfig) -> Self {
        let connector = HttpsConnectorBuilder::new()
            .with_native_roots()
            .https_or_http()
            .enable_http1()
            .build();

        RemoteStore::new(Client::builder().build(connector), config)
    }
}

impl<C> RemoteStore<C>
where
    C: Connect + Clone + Send + Sync + 'static,
{
    pub fn new(client: Client<C, Body>, config: RemoteStoreConfig) -> Self {
        RemoteStore { client, config }
    }

    fn table_uri(&self, query: &str) -> String {
        format!(
            "{}/rest/v1/{}{}",
            self.config.endpoint.trim_end_matches('/'),
            self.config.table,
            query
        )
    }

    fn request(
        &self,
        method: Method,
        uri: String,
        body: Body,
    ) -> Result<Request<Body>, PersistenceError> {
        let authorization = Authorization::<Bearer>::bearer(&self.config.api_key)
            .map_err(|_| PersistenceError::Transport(String::from("api key is not a valid bearer token")))?;

        let mut request = Request::builder()
            .method(method)
            .uri(uri)
            .header("apikey", self.config.api_key.as_str())
            .header(ACCEPT, mime::APPLICATION_JSON.as_ref())
            .header("Prefer", "return=representation")
            .body(body)?;

        let headers = request.headers_mut();
        headers.typed_insert(authorization);
        headers.typed_insert(ContentType::json());

        Ok(request)
    }

    async fn send(&self, request: Request<Body>) -> Result<Bytes, PersistenceError> {
        let method = request.method().clone();
        let uri = request.uri().clone();

        let response = self.client.request(request).await?;
        let status = response.status();
        let body = hyper::body::to_bytes(response.into_body()).await?;

        info!("store {} {} -> {}", method, uri.path(), status.as_u16());

        if !status.is_success() {
            let body = String::from_utf8_lossy(&body).into_owned();
            warn!("store rejected {} {}: {}", method, uri.path(), body);
            return Err(PersistenceError::Status {
                status: status.as_u16(),
                body,
            });
        }

        Ok(body)
    }
}

impl<C> RecordStore for RemoteStore<C>
where
    C: Connect + Clone + Send + Sync + 'static,
{
    async fn insert(&self, record: Record) -> Result<Record, PersistenceError> {
        let request = self.request(
            Method::POST,
            self.table_uri(""),
            Body::from(serde_json::to_vec(&record)?),
        )?;

        let body = self.send(request).await?;
        let mut rows: Vec<Record> = serde_json::from_slice(&body)?;

        if rows.is_empty() {
            return Err(PersistenceError::Decode(String::from(
                "insert returned no rows",
            )));
        }

        Ok(rows.swap_remove(0))
    }

    async fn select_all(&self) -> Result<Vec<Record>, PersistenceError> {
        let request = self.request(
            Method::GET,
            self.table_uri("?select=*&order=data.desc,id.desc"),
            Body::empty(),
        )?;

        let body = self.send(request).await?;
        let rows: Vec<Value> = serde_json::from_slice(&body)?;

        // other clients write to the same table
        Ok(rows
            .into_iter()
            .filter_map(|row| match serde_json::from_value::<Record>(row.clone()) {
                Ok(record) => Some(record),
                Err(e) => {
                    warn!("skipping unreadable row {}: {}", row["id"], e);
                    None
                }
            })
            .collect())
    }

    async fn mark_done(&self, id: i64) -> Result<bool, PersistenceError> {
        let request = self.request(
            Method::PATCH,
            self.table_uri(&format!(
                "?id=eq.{}&or=(check_done.is.null,check_done.eq.0)",
                id
            )),
            Body::from(json!({ "check_done": 1 }).to_string()),
        )?;

        let body = self.send(request).await?;
        let updated: Vec<Value> = serde_json::from_slice(&body)?;
        if !updated.is_empty() {
            return Ok(true);
        }

        let request = self.request(
            Method::GET,
            self.table_uri(&format!("?select=id&id=eq.{}", id)),
            Body::empty(),
        )?;

        let body = self.send(request).await?;
        let existing: Vec<Value> = serde_json::from_slice(&body)?;
        if existing.is_empty() {
            return Err(PersistenceError::NotFound(id));
        }

        Ok(false)
    }
}
