use std::time::Duration;

use common::config::ApiAppConfig;
use common::retry::RetryPolicy;
use common::user::{LoginRequest, LoginResponse, RegisterRequest, RegisterResponse, UserProfile};
use reqwest::{Method, RequestBuilder, Response, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, info, warn};
use url::Url;

use crate::error::{ApiError, Result};
use crate::session::{Session, SessionContext};

/// Unauthenticated handle on the hackathon backend.
///
/// Cheap to clone; the underlying connection pool is shared.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base: Url,
    retry: RetryPolicy,
}

impl ApiClient {
    pub fn new(config: &ApiAppConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .build()?;
        Self::with_http(http, &config.base_url, RetryPolicy::from(config))
    }

    pub fn with_http(http: reqwest::Client, base_url: &str, retry: RetryPolicy) -> Result<Self> {
        let mut base = Url::parse(base_url)?;
        // Url::join replaces the last segment unless the base ends with a slash.
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        Ok(Self { http, base, retry })
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    /// Exchange credentials for a token and load the caller's profile.
    pub async fn login(&self, username: &str, password: &str) -> Result<Session> {
        let body = LoginRequest {
            username: username.to_string(),
            password: password.to_string(),
        };
        let res: LoginResponse = self
            .send_json(Method::POST, "auth/login", &body, None)
            .await?;

        let profile: UserProfile = self.get_json("users/profile", Some(&res.token)).await?;
        info!(username = %res.username, role = %profile.role, "Logged in");

        Ok(Session::new(
            self.clone(),
            SessionContext::new(res.token, profile),
        ))
    }

    pub async fn register(&self, req: &RegisterRequest) -> Result<RegisterResponse> {
        self.send_json(Method::POST, "auth/register", req, None)
            .await
    }

    pub(crate) fn url(&self, path: &str) -> Result<Url> {
        Ok(self.base.join(path.trim_start_matches('/'))?)
    }

    /// GET and decode, retrying transient failures per the retry policy.
    pub(crate) async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        token: Option<&str>,
    ) -> Result<T> {
        let url = self.url(path)?;
        let mut attempt: u8 = 0;
        loop {
            let req = authorize(self.http.get(url.clone()), token);
            match execute(req).await {
                Ok(res) => return decode(res).await,
                Err(e) if e.is_transient() => {
                    attempt = attempt.saturating_add(1);
                    if !self.retry.should_retry(attempt) {
                        return Err(e);
                    }
                    let delay: Duration = self.retry.delay_for(attempt);
                    warn!(
                        path,
                        attempt,
                        delay_ms = delay.as_millis() as u64,
                        error = %e,
                        "Retrying request"
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// Send a JSON body and decode a JSON response. Never retried.
    pub(crate) async fn send_json<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: &B,
        token: Option<&str>,
    ) -> Result<T> {
        let req = authorize(self.http.request(method, self.url(path)?), token).json(body);
        decode(execute(req).await?).await
    }

    /// Send a request without a body, carrying parameters in the query string.
    /// The response body is ignored. Never retried.
    pub(crate) async fn send_query<Q: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        query: &Q,
        token: Option<&str>,
    ) -> Result<()> {
        let req = authorize(self.http.request(method, self.url(path)?), token).query(query);
        execute(req).await?;
        Ok(())
    }

    /// Send a request with neither body nor query. Never retried.
    pub(crate) async fn send_empty(
        &self,
        method: Method,
        path: &str,
        token: Option<&str>,
    ) -> Result<()> {
        let req = authorize(self.http.request(method, self.url(path)?), token);
        execute(req).await?;
        Ok(())
    }
}

fn authorize(req: RequestBuilder, token: Option<&str>) -> RequestBuilder {
    match token {
        Some(token) => req.bearer_auth(token),
        None => req,
    }
}

async fn execute(req: RequestBuilder) -> Result<Response> {
    let res = req.send().await?;
    let status = res.status();
    debug!(status = status.as_u16(), url = %res.url(), "Response received");

    match status {
        s if s.is_success() => Ok(res),
        StatusCode::UNAUTHORIZED => Err(ApiError::Unauthorized),
        StatusCode::FORBIDDEN => Err(ApiError::Forbidden),
        s => {
            let text = res.text().await.unwrap_or_default();
            Err(ApiError::Status {
                status: s.as_u16(),
                message: error_message(&text),
            })
        }
    }
}

async fn decode<T: DeserializeOwned>(res: Response) -> Result<T> {
    let text = res.text().await?;
    serde_json::from_str(&text).map_err(|e| ApiError::Decode(e.to_string()))
}

/// Pull a human-readable message out of an error body.
fn error_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| v.get("message").and_then(|m| m.as_str()).map(String::from))
        .unwrap_or_else(|| body.trim().to_string())
}
