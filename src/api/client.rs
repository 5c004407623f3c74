//! HTTP plumbing shared by every service: base URL, bearer token, envelope.

use std::sync::Arc;

use reqwest::{Method, StatusCode};
use secrecy::ExposeSecret;
use serde::Serialize;
use serde::de::DeserializeOwned;

use super::cache::QueryCache;
use crate::config::PortalConfig;
use crate::error::{ApiError, ConfigError};
use crate::model::ApiResponse;
use crate::session::SessionStore;

/// REST client bound to one backend and one session.
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    session: Arc<SessionStore>,
    cache: QueryCache,
}

impl ApiClient {
    pub fn new(config: &PortalConfig, session: Arc<SessionStore>) -> Result<Self, ConfigError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.http_timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder
            .build()
            .map_err(|e| ConfigError::HttpClient(e.to_string()))?;

        Ok(Self {
            http,
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
            session,
            cache: QueryCache::new(),
        })
    }

    pub fn session(&self) -> &Arc<SessionStore> {
        &self.session
    }

    pub fn cache(&self) -> &QueryCache {
        &self.cache
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        self.send(Method::GET, path, None::<&()>).await
    }

    pub async fn post<B: Serialize + Sync, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        self.send(Method::POST, path, Some(body)).await
    }

    pub async fn put<B: Serialize + Sync, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        self.send(Method::PUT, path, Some(body)).await
    }

    pub async fn delete<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        self.send(Method::DELETE, path, None::<&()>).await
    }

    async fn send<B, T>(&self, method: Method, path: &str, body: Option<&B>) -> Result<T, ApiError>
    where
        B: Serialize + Sync + ?Sized,
        T: DeserializeOwned,
    {
        let mut request = self.http.request(method.clone(), self.url(path));
        if let Some(token) = self.session.access_token().await {
            request = request.bearer_auth(token.expose_secret());
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await.map_err(|e| ApiError::Transport {
            path: path.to_string(),
            reason: e.to_string(),
        })?;
        let status = response.status();
        let text = response.text().await.map_err(|e| ApiError::Transport {
            path: path.to_string(),
            reason: e.to_string(),
        })?;
        tracing::debug!(method = %method, path, status = status.as_u16(), "API call");

        if status == StatusCode::UNAUTHORIZED {
            return Err(ApiError::Unauthorized {
                path: path.to_string(),
            });
        }
        if !status.is_success() {
            return Err(ApiError::Status {
                path: path.to_string(),
                status: status.as_u16(),
                message: error_message(&text),
            });
        }

        let envelope: ApiResponse<T> =
            serde_json::from_str(&text).map_err(|e| ApiError::Decode {
                path: path.to_string(),
                reason: e.to_string(),
            })?;
        if !envelope.success {
            return Err(ApiError::Rejected {
                path: path.to_string(),
                message: envelope.message,
            });
        }
        Ok(envelope.data)
    }
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.base_url)
            .finish()
    }
}

/// Pull `message` out of an error body. Validation errors arrive as an
/// array of messages.
fn error_message(body: &str) -> String {
    let Ok(json) = serde_json::from_str::<serde_json::Value>(body) else {
        return body.trim().to_string();
    };
    match json.get("message") {
        Some(serde_json::Value::String(message)) => message.clone(),
        Some(serde_json::Value::Array(messages)) => messages
            .iter()
            .filter_map(|m| m.as_str())
            .collect::<Vec<_>>()
            .join("; "),
        _ => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::MemoryBackend;

    fn client(base: &str) -> ApiClient {
        let config = PortalConfig {
            api_base_url: base.to_string(),
            ..PortalConfig::default()
        };
        let session = Arc::new(SessionStore::new(Arc::new(MemoryBackend::new())));
        ApiClient::new(&config, session).unwrap()
    }

    #[test]
    fn url_joins_base_and_path() {
        assert_eq!(client("http://localhost:3004/api/").url("/pets"), "http://localhost:3004/api/pets");
    }

    #[test]
    fn error_message_shapes() {
        assert_eq!(error_message(r#"{"message":"Invalid OTP"}"#), "Invalid OTP");
        assert_eq!(
            error_message(r#"{"message":["email must be an email","password too short"]}"#),
            "email must be an email; password too short"
        );
        assert_eq!(error_message("Bad Gateway"), "Bad Gateway");
        assert_eq!(error_message(r#"{"statusCode":500}"#), "");
    }

    #[tokio::test]
    async fn unreachable_backend_is_transport_error() {
        let err = client("http://127.0.0.1:9")
            .get::<serde_json::Value>("/auth/me")
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Transport { ref path, .. } if path == "/auth/me"));
    }
}
