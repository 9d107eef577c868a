//! Stride backend client.

use crate::error::{Result, ServerClientError};
use crate::types::ServerConfig;
use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::Duration;
use stride_core::{
    BookmarkResponse, Comment, CommentId, CreateComment, OkResponse, Reel, ReelId, ReelsApi,
    ReportRequest, ReportResponse, UserId,
};
use tokio::sync::RwLock;
use tracing::{debug, info, warn};
use url::Url;

/// HTTP client for the reels backend.
///
/// Implements `ReelsApi`, so it plugs straight into a `FeedSession`. Every
/// request carries the bearer token when one is configured and is bounded
/// by a 30 second timeout.
///
/// # Example
///
/// ```ignore
/// use stride_server_client::{ServerConfig, StrideClient};
/// use stride_core::ReelsApi;
///
/// let client = StrideClient::new(ServerConfig::with_token("https://api.stride.example", "token"))?;
/// let reels = client.fetch_reels().await?;
/// println!("Fetched {} reels", reels.len());
/// ```
pub struct StrideClient {
    http: Client,
    config: Arc<RwLock<ServerConfig>>,
}

impl StrideClient {
    /// Create a new client with the given configuration.
    pub fn new(config: ServerConfig) -> Result<Self> {
        // Validate URL
        if config.url.is_empty() {
            return Err(ServerClientError::InvalidUrl("URL cannot be empty".into()));
        }

        // Parse and normalize URL
        let url = config.url.trim_end_matches('/').to_string();
        if !url.starts_with("http://") && !url.starts_with("https://") {
            return Err(ServerClientError::InvalidUrl(
                "URL must start with http:// or https://".into(),
            ));
        }
        Url::parse(&url).map_err(|e| ServerClientError::InvalidUrl(e.to_string()))?;

        let normalized_config = ServerConfig {
            url,
            access_token: config.access_token,
        };

        let http = Client::builder()
            .timeout(Duration::from_secs(30))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(format!("Stride/{}", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http,
            config: Arc::new(RwLock::new(normalized_config)),
        })
    }

    /// Get the server URL.
    pub async fn url(&self) -> String {
        self.config.read().await.url.clone()
    }

    /// Check if the client has an access token.
    pub async fn is_authenticated(&self) -> bool {
        self.config.read().await.access_token.is_some()
    }

    /// Replace the access token (`None` signs out).
    pub async fn set_token(&self, access_token: Option<String>) {
        let mut config = self.config.write().await;
        config.access_token = access_token;
        if config.access_token.is_none() {
            info!("Cleared access token");
        }
    }

    /// Build a request for `segments` under the base URL.
    ///
    /// Segments are percent-encoded, so ids can never escape their path slot.
    async fn request(&self, method: Method, segments: &[&str]) -> Result<RequestBuilder> {
        let config = self.config.read().await;
        let mut url =
            Url::parse(&config.url).map_err(|e| ServerClientError::InvalidUrl(e.to_string()))?;
        url.path_segments_mut()
            .map_err(|()| ServerClientError::InvalidUrl("URL cannot be a base".into()))?
            .pop_if_empty()
            .extend(segments);
        let token = config.access_token.clone();
        drop(config);

        debug!(method = %method, url = %url, "Sending request");

        let builder = self.http.request(method, url);
        Ok(match token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        })
    }

    /// Send and decode, mapping non-success statuses to errors.
    async fn send<T: DeserializeOwned>(request: RequestBuilder, what: &str) -> Result<T> {
        let response = request.send().await.map_err(|e| {
            if e.is_connect() || e.is_timeout() {
                ServerClientError::ServerUnreachable(e.to_string())
            } else {
                ServerClientError::Request(e)
            }
        })?;

        let status = response.status();

        if status.is_success() {
            return response.json().await.map_err(|e| {
                ServerClientError::ParseError(format!("Failed to parse {what} response: {e}"))
            });
        }

        match status {
            StatusCode::UNAUTHORIZED => Err(ServerClientError::AuthRequired),
            StatusCode::TOO_MANY_REQUESTS => {
                let retry_after_secs = response
                    .headers()
                    .get(reqwest::header::RETRY_AFTER)
                    .and_then(|v| v.to_str().ok())
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(0);
                warn!(retry_after_secs, "Rate limited by server");
                Err(ServerClientError::RateLimited { retry_after_secs })
            }
            StatusCode::FORBIDDEN => {
                let error_text = response.text().await.unwrap_or_default();
                Err(ServerClientError::Forbidden(error_text))
            }
            StatusCode::NOT_FOUND => {
                let path = response.url().path().to_string();
                Err(ServerClientError::NotFound(path))
            }
            _ => {
                let error_text = response.text().await.unwrap_or_default();
                Err(ServerClientError::ServerError {
                    status: status.as_u16(),
                    message: error_text,
                })
            }
        }
    }
}

#[async_trait]
impl ReelsApi for StrideClient {
    async fn fetch_reels(&self) -> stride_core::Result<Vec<Reel>> {
        let request = self.request(Method::GET, &["reels"]).await?;
        let reels: Vec<Reel> = Self::send(request, "reels").await?;
        debug!(count = reels.len(), "Fetched reels");
        Ok(reels)
    }

    async fn like_reel(&self, reel_id: &ReelId) -> stride_core::Result<Reel> {
        let request = self
            .request(Method::POST, &["reels", reel_id.as_str(), "like"])
            .await?;
        Ok(Self::send(request, "like").await?)
    }

    async fn set_bookmark(
        &self,
        reel_id: &ReelId,
        saved: bool,
    ) -> stride_core::Result<BookmarkResponse> {
        let method = if saved { Method::POST } else { Method::DELETE };
        let request = self
            .request(method, &["reels", reel_id.as_str(), "bookmark"])
            .await?;
        Ok(Self::send(request, "bookmark").await?)
    }

    async fn report_reel(
        &self,
        reel_id: &ReelId,
        report: &ReportRequest,
    ) -> stride_core::Result<ReportResponse> {
        let request = self
            .request(Method::POST, &["reels", reel_id.as_str(), "report"])
            .await?
            .json(report);
        Ok(Self::send(request, "report").await?)
    }

    async fn delete_reel(&self, reel_id: &ReelId) -> stride_core::Result<OkResponse> {
        let request = self
            .request(Method::DELETE, &["reels", reel_id.as_str()])
            .await?;
        let response: OkResponse = Self::send(request, "delete").await?;
        info!(reel_id = %reel_id, ok = response.ok, "Delete request completed");
        Ok(response)
    }

    async fn hide_reel(&self, reel_id: &ReelId) -> stride_core::Result<OkResponse> {
        let request = self
            .request(Method::POST, &["reels", reel_id.as_str(), "hide"])
            .await?;
        Ok(Self::send(request, "hide").await?)
    }

    async fn mute_author(&self, author_id: &UserId) -> stride_core::Result<OkResponse> {
        let request = self
            .request(Method::POST, &["users", author_id.as_str(), "mute"])
            .await?;
        Ok(Self::send(request, "mute").await?)
    }

    async fn fetch_comments(&self, reel_id: &ReelId) -> stride_core::Result<Vec<Comment>> {
        let request = self
            .request(Method::GET, &["reels", reel_id.as_str(), "comments"])
            .await?;
        Ok(Self::send(request, "comments").await?)
    }

    async fn post_comment(
        &self,
        reel_id: &ReelId,
        comment: &CreateComment,
    ) -> stride_core::Result<Comment> {
        let request = self
            .request(Method::POST, &["reels", reel_id.as_str(), "comments"])
            .await?
            .json(comment);
        Ok(Self::send(request, "comment").await?)
    }

    async fn like_comment(
        &self,
        reel_id: &ReelId,
        comment_id: &CommentId,
    ) -> stride_core::Result<Comment> {
        let request = self
            .request(
                Method::POST,
                &["reels", reel_id.as_str(), "comments", comment_id.as_str(), "like"],
            )
            .await?;
        Ok(Self::send(request, "comment like").await?)
    }
}
