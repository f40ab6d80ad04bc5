//! HTTP implementation of [`Remote`] for the staffing API.
//!
//! Every collection lives under `{base_url}/{kind}`:
//! - `GET /kind?page=&size=&sort=&field=value` returns either
//!   `{ "content": [...], "totalElements": n }` or a bare array
//! - `GET /kind/{id}`, `POST /kind`, `PUT /kind/{id}`, `DELETE /kind/{id}`
//!
//! Error responses may carry `{ "message": "..." }`; the message is kept so it
//! can be shown to the user verbatim.

use std::marker::PhantomData;
use std::time::Duration;

use reqwest::{Client, Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use uuid::Uuid;

use crate::config::Config;
use crate::error::RemoteError;
use crate::models::{Entity, ListBody, ListQuery, Page};
use crate::store::Remote;

/// Default URL for local development.
pub const DEFAULT_URL: &str = "http://localhost:8080/api";

/// Default request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

/// Connection settings shared by every collection.
#[derive(Debug, Clone)]
pub struct HttpClient {
    base_url: String,
    api_key: Option<String>,
    client: Client,
}

impl HttpClient {
    /// Create with explicit configuration.
    pub fn new(
        base_url: impl Into<String>,
        api_key: Option<String>,
        timeout: Duration,
    ) -> Result<Self, RemoteError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.filter(|k| !k.is_empty()),
            client,
        })
    }

    pub fn from_config(config: &Config) -> Result<Self, RemoteError> {
        Self::new(
            config.base_url.clone(),
            config.api_key.clone(),
            Duration::from_secs(config.timeout_secs),
        )
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// A typed handle on one collection.
    pub fn remote<E: Entity>(&self) -> HttpRemote<E> {
        HttpRemote {
            client: self.clone(),
            _kind: PhantomData,
        }
    }

    /// Build a request with optional auth header.
    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}/{}", self.base_url, path);
        let mut req = self.client.request(method, &url);
        if let Some(ref key) = self.api_key {
            req = req.bearer_auth(key);
        }
        req
    }

    async fn send(&self, req: RequestBuilder) -> Result<Response, RemoteError> {
        let response = req.send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorBody>(&body)
            .ok()
            .and_then(|b| b.message)
            .filter(|m| !m.trim().is_empty());
        tracing::debug!(status = status.as_u16(), ?message, "Request rejected");
        Err(RemoteError::Rejected {
            status: status.as_u16(),
            message,
        })
    }

    async fn json<T: DeserializeOwned>(&self, req: RequestBuilder) -> Result<T, RemoteError> {
        let response = self.send(req).await?;
        let bytes = response.bytes().await?;
        serde_json::from_slice(&bytes).map_err(|e| RemoteError::Decode(e.to_string()))
    }
}

/// [`Remote`] for one entity kind over HTTP.
pub struct HttpRemote<E> {
    client: HttpClient,
    _kind: PhantomData<fn() -> E>,
}

impl<E> Clone for HttpRemote<E> {
    fn clone(&self) -> Self {
        Self {
            client: self.client.clone(),
            _kind: PhantomData,
        }
    }
}

impl<E: Entity> HttpRemote<E> {
    fn item_path(id: Uuid) -> String {
        format!("{}/{}", E::KIND.path(), id)
    }
}

impl<E: Entity> Remote<E> for HttpRemote<E> {
    async fn list(&self, query: &ListQuery) -> Result<Page<E>, RemoteError> {
        let req = self
            .client
            .request(Method::GET, E::KIND.path())
            .query(&query.to_params());
        let body: ListBody<E> = self.client.json(req).await?;
        Ok(body.into())
    }

    async fn get(&self, id: Uuid) -> Result<E, RemoteError> {
        let req = self.client.request(Method::GET, &Self::item_path(id));
        self.client.json(req).await
    }

    async fn create(&self, input: &E::Create) -> Result<E, RemoteError> {
        let req = self.client.request(Method::POST, E::KIND.path()).json(input);
        self.client.json(req).await
    }

    async fn update(&self, id: Uuid, input: &E::Update) -> Result<E, RemoteError> {
        let req = self
            .client
            .request(Method::PUT, &Self::item_path(id))
            .json(input);
        self.client.json(req).await
    }

    async fn delete(&self, id: Uuid) -> Result<(), RemoteError> {
        let req = self.client.request(Method::DELETE, &Self::item_path(id));
        self.client.send(req).await?;
        Ok(())
    }
}
