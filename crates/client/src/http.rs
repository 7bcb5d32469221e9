//! HTTP plumbing shared by every API wrapper.
//!
//! [`ApiClient`] sends [`ApiRequest`]s and unwraps the backend envelope.
//! [`AuthedClient`] adds the bearer token from a [`SessionProvider`] and,
//! on a 401, refreshes the session once and retries. A second 401 (or a
//! failed refresh) signs the user out and yields
//! [`ClientError::SessionExpired`].

use std::sync::Arc;

use reelgen_core::envelope::Envelope;
use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use url::Url;

use crate::error::{ClientError, ClientResult};
use crate::session::SessionProvider;

/// A request description that can be sent more than once.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    method: Method,
    path: String,
    query: Vec<(String, String)>,
    body: Option<serde_json::Value>,
}

impl ApiRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            body: None,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::PUT, path)
    }

    pub fn patch(path: impl Into<String>) -> Self {
        Self::new(Method::PATCH, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    /// Attach a JSON body.
    pub fn json<B: Serialize + ?Sized>(mut self, body: &B) -> ClientResult<Self> {
        let value = serde_json::to_value(body).map_err(|e| ClientError::Decode(e.to_string()))?;
        self.body = Some(value);
        Ok(self)
    }

    /// Append query parameters from any serializable struct. `None` fields
    /// must be skipped by the struct's serde attributes.
    pub fn query<Q: Serialize + ?Sized>(mut self, query: &Q) -> ClientResult<Self> {
        let value = serde_json::to_value(query).map_err(|e| ClientError::Decode(e.to_string()))?;
        if let serde_json::Value::Object(map) = value {
            for (key, value) in map {
                let rendered = match value {
                    serde_json::Value::Null => continue,
                    serde_json::Value::String(s) => s,
                    other => other.to_string(),
                };
                self.query.push((key, rendered));
            }
        }
        Ok(self)
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn path(&self) -> &str {
        &self.path
    }
}

/// Unauthenticated client bound to one base URL.
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: reqwest::Client,
    base_url: Url,
}

impl ApiClient {
    pub fn new(base_url: &str) -> ClientResult<Self> {
        Self::with_client(reqwest::Client::new(), base_url)
    }

    /// Reuse an existing [`reqwest::Client`] (shared connection pool).
    pub fn with_client(client: reqwest::Client, base_url: &str) -> ClientResult<Self> {
        let mut base_url = Url::parse(base_url)?;
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }
        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn url(&self, path: &str) -> ClientResult<Url> {
        Ok(self.base_url.join(path.trim_start_matches('/'))?)
    }

    /// Send a request, optionally with a bearer token. Does not inspect the
    /// status code.
    pub async fn execute(
        &self,
        request: &ApiRequest,
        token: Option<&str>,
    ) -> ClientResult<reqwest::Response> {
        let url = self.url(&request.path)?;
        let mut builder = self.client.request(request.method.clone(), url);
        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }
        if let Some(token) = token {
            builder = builder.bearer_auth(token);
        }

        tracing::debug!(method = %request.method, path = %request.path, "API request");
        Ok(builder.send().await?)
    }

    /// Send without credentials and unwrap the envelope.
    pub async fn request<T: DeserializeOwned>(&self, request: &ApiRequest) -> ClientResult<T> {
        let response = self.execute(request, None).await?;
        decode_envelope(response).await
    }

    /// Send without credentials; the payload is ignored.
    pub async fn request_unit(&self, request: &ApiRequest) -> ClientResult<()> {
        let response = self.execute(request, None).await?;
        decode_unit(response).await
    }
}

/// Unwrap a backend envelope, mapping failures into [`ClientError`].
pub async fn decode_envelope<T: DeserializeOwned>(response: reqwest::Response) -> ClientResult<T> {
    let response = ensure_success(response).await?;
    let envelope: Envelope<T> = response.json().await?;
    Ok(envelope.into_data()?)
}

/// Like [`decode_envelope`] for endpoints whose payload is irrelevant.
pub async fn decode_unit(response: reqwest::Response) -> ClientResult<()> {
    let response = ensure_success(response).await?;
    let envelope: Envelope<serde_json::Value> = response.json().await?;
    Ok(envelope.into_unit()?)
}

/// Decode a plain (non-envelope) JSON body, as returned by the app server's
/// own route handlers.
pub async fn decode_plain<T: DeserializeOwned>(response: reqwest::Response) -> ClientResult<T> {
    let response = ensure_success(response).await?;
    Ok(response.json().await?)
}

/// Turn a non-2xx response into [`ClientError::Http`], pulling the message
/// out of either an envelope (`message`) or an app error body (`error`).
async fn ensure_success(response: reqwest::Response) -> ClientResult<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let text = response.text().await.unwrap_or_default();
    let (message, errors) = match serde_json::from_str::<Envelope<serde_json::Value>>(&text) {
        Ok(envelope) if !envelope.message.is_empty() => {
            let errors = envelope.error_messages();
            (envelope.message, errors)
        }
        _ => match serde_json::from_str::<serde_json::Value>(&text) {
            Ok(json) => (
                json.get("error")
                    .or_else(|| json.get("message"))
                    .and_then(|v| v.as_str())
                    .unwrap_or_default()
                    .to_string(),
                Vec::new(),
            ),
            Err(_) => (text, Vec::new()),
        },
    };

    Err(ClientError::Http {
        status: status.as_u16(),
        message,
        errors,
    })
}

/// Client that authenticates every request from a [`SessionProvider`].
pub struct AuthedClient<P: ?Sized> {
    api: ApiClient,
    sessions: Arc<P>,
}

impl<P: SessionProvider + ?Sized> AuthedClient<P> {
    pub fn new(api: ApiClient, sessions: Arc<P>) -> Self {
        Self { api, sessions }
    }

    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    pub fn sessions(&self) -> &Arc<P> {
        &self.sessions
    }

    /// Send with the current bearer token, refreshing once on 401.
    ///
    /// Requests without a session go out anonymously; public endpoints
    /// (feed, video details) accept them.
    pub async fn execute(&self, request: &ApiRequest) -> ClientResult<reqwest::Response> {
        let session = self.sessions.session().await;
        let token = session.as_ref().map(|s| s.access_token.as_str());

        let response = self.api.execute(request, token).await?;
        if response.status() != StatusCode::UNAUTHORIZED {
            return Ok(response);
        }

        tracing::debug!(path = %request.path(), "Received 401, refreshing session");
        let refreshed = match self.sessions.refresh().await {
            Ok(session) => session,
            Err(e) => {
                tracing::warn!(error = %e, "Session refresh failed, signing out");
                self.sessions.sign_out().await;
                return Err(ClientError::SessionExpired);
            }
        };

        let retry = self
            .api
            .execute(request, Some(&refreshed.access_token))
            .await?;
        if retry.status() == StatusCode::UNAUTHORIZED {
            tracing::warn!(path = %request.path(), "Still unauthorized after refresh, signing out");
            self.sessions.sign_out().await;
            return Err(ClientError::SessionExpired);
        }
        Ok(retry)
    }

    pub async fn request<T: DeserializeOwned>(&self, request: &ApiRequest) -> ClientResult<T> {
        let response = self.execute(request).await?;
        decode_envelope(response).await
    }

    pub async fn request_unit(&self, request: &ApiRequest) -> ClientResult<()> {
        let response = self.execute(request).await?;
        decode_unit(response).await
    }

    pub async fn request_plain<T: DeserializeOwned>(&self, request: &ApiRequest) -> ClientResult<T> {
        let response = self.execute(request).await?;
        decode_plain(response).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Serialize)]
    struct Filters {
        page: u32,
        #[serde(skip_serializing_if = "Option::is_none")]
        category: Option<String>,
        search: Option<String>,
    }

    #[test]
    fn query_skips_nulls_and_renders_scalars() {
        let req = ApiRequest::get("/video")
            .query(&Filters {
                page: 2,
                category: None,
                search: Some("ocean".into()),
            })
            .unwrap();
        assert_eq!(
            req.query,
            vec![
                ("page".to_string(), "2".to_string()),
                ("search".to_string(), "ocean".to_string())
            ]
        );
    }

    #[test]
    fn base_url_keeps_path_prefix() {
        let client = ApiClient::new("https://api.example.com/v1").unwrap();
        assert_eq!(
            client.url("/video/abc").unwrap().as_str(),
            "https://api.example.com/v1/video/abc"
        );
    }

    #[test]
    fn invalid_base_url_is_rejected() {
        assert!(matches!(ApiClient::new("not a url"), Err(ClientError::Url(_))));
    }
}
