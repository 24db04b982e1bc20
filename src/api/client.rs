//! Typed, tenant-scoped DocBase API client.
//!
//! Every operation funnels through the [`RateLimitExecutor`], so 429
//! responses are absorbed here and callers only ever see success or a fatal
//! error. The client adds no error handling of its own.

use std::sync::Arc;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use bytes::Bytes;
use reqwest::Method;

use super::executor::{Clock, RateLimitExecutor};
use super::types::{
    AttachmentUpload, Memo, MemoPage, MemoUpdate, NewComment, NewMemo, UploadedAttachment,
};
use crate::error::Result;

/// Production API endpoint.
pub const DEFAULT_BASE_URL: &str = "https://api.docbase.io";

const TOKEN_HEADER: &str = "X-DocBaseToken";
const API_VERSION_HEADER: &str = "X-Api-Version";
const API_VERSION: &str = "2";

/// One tenant's API credentials and endpoint.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Tenant domain, substituted for `:domain` in every request path.
    pub domain: String,
    /// API token for this tenant.
    pub token: String,
    /// Base URL for the API (defaults to [`DEFAULT_BASE_URL`]).
    pub base_url: String,
}

impl ClientConfig {
    /// Create a config for one tenant.
    pub fn new(domain: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            domain: domain.into(),
            token: token.into(),
            base_url: DEFAULT_BASE_URL.to_owned(),
        }
    }

    /// Set the base URL (useful for testing with mock servers).
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

/// An attachment payload staged for upload.
#[derive(Debug, Clone)]
pub struct AttachmentFile {
    /// Display name; the correlation key for the upload response.
    pub name: String,
    /// Raw bytes as downloaded from the source tenant.
    pub content: Bytes,
}

/// Tenant-scoped client for the DocBase API v2.
pub struct DocbaseClient {
    config: ClientConfig,
    http: reqwest::Client,
    executor: RateLimitExecutor,
}

impl std::fmt::Debug for DocbaseClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DocbaseClient")
            .field("domain", &self.config.domain)
            .field("base_url", &self.config.base_url)
            .finish()
    }
}

impl DocbaseClient {
    /// Create a client with the given configuration.
    pub fn new(config: ClientConfig) -> Self {
        Self {
            config,
            http: reqwest::Client::new(),
            executor: RateLimitExecutor::new(),
        }
    }

    /// Create a client with an injected clock for the rate-limit executor.
    pub fn with_clock(config: ClientConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            config,
            http: reqwest::Client::new(),
            executor: RateLimitExecutor::with_clock(clock),
        }
    }

    /// The tenant domain this client is scoped to.
    pub fn domain(&self) -> &str {
        &self.config.domain
    }

    /// Substitute the tenant domain into `path` and prefix the base URL.
    fn route(&self, path: &str) -> String {
        format!(
            "{}{}",
            self.config.base_url,
            path.replace(":domain", &self.config.domain)
        )
    }

    /// A request builder with the tenant auth and API version headers set.
    fn request(&self, method: Method, path: &str) -> reqwest::RequestBuilder {
        self.http
            .request(method, self.route(path))
            .header(TOKEN_HEADER, self.config.token.as_str())
            .header(API_VERSION_HEADER, API_VERSION)
    }

    /// List one page of memos matching `query`.
    ///
    /// The query supports the server's search syntax, including boolean tag
    /// exclusion such as `-tag:exported`.
    pub async fn list_memos(&self, query: &str, page: u64, per_page: u64) -> Result<MemoPage> {
        let response = self
            .executor
            .run(|| {
                self.request(Method::GET, "/teams/:domain/posts")
                    .query(&[
                        ("q", query.to_owned()),
                        ("page", page.to_string()),
                        ("per_page", per_page.to_string()),
                    ])
                    .send()
            })
            .await?;
        Ok(response.json().await?)
    }

    /// Delete a memo.
    pub async fn delete_memo(&self, id: u64) -> Result<()> {
        let path = format!("/teams/:domain/posts/{id}");
        self.executor
            .run(|| self.request(Method::DELETE, &path).send())
            .await?;
        Ok(())
    }

    /// Download an attachment's raw bytes.
    pub async fn get_attachment(&self, id: u64) -> Result<Bytes> {
        let path = format!("/teams/:domain/attachments/{id}");
        let response = self
            .executor
            .run(|| self.request(Method::GET, &path).send())
            .await?;
        Ok(response.bytes().await?)
    }

    /// Upload a batch of attachments, base64-encoding each payload.
    ///
    /// The response order is not guaranteed to match the request order;
    /// callers must correlate entries by name.
    pub async fn upload_attachments(
        &self,
        files: &[AttachmentFile],
        author_id: Option<u64>,
    ) -> Result<Vec<UploadedAttachment>> {
        let payload: Vec<AttachmentUpload> = files
            .iter()
            .map(|file| AttachmentUpload {
                name: file.name.clone(),
                content: BASE64.encode(&file.content),
                author_id,
            })
            .collect();
        let response = self
            .executor
            .run(|| {
                self.request(Method::POST, "/teams/:domain/attachments")
                    .json(&payload)
                    .send()
            })
            .await?;
        Ok(response.json().await?)
    }

    /// Create a memo on this tenant.
    pub async fn create_memo(&self, memo: &NewMemo) -> Result<Memo> {
        let response = self
            .executor
            .run(|| {
                self.request(Method::POST, "/teams/:domain/posts")
                    .json(memo)
                    .send()
            })
            .await?;
        Ok(response.json().await?)
    }

    /// Partially update an existing memo.
    pub async fn update_memo(&self, update: &MemoUpdate) -> Result<Memo> {
        let path = format!("/teams/:domain/posts/{}", update.id);
        let response = self
            .executor
            .run(|| self.request(Method::PATCH, &path).json(update).send())
            .await?;
        Ok(response.json().await?)
    }

    /// Create a comment on an existing memo.
    pub async fn create_comment(&self, memo_id: u64, comment: &NewComment) -> Result<()> {
        let path = format!("/teams/:domain/posts/{memo_id}/comments");
        self.executor
            .run(|| self.request(Method::POST, &path).json(comment).send())
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn route_substitutes_domain() {
        let client = DocbaseClient::new(
            ClientConfig::new("acme", "tok").with_base_url("http://localhost:9"),
        );
        assert_eq!(
            client.route("/teams/:domain/posts"),
            "http://localhost:9/teams/acme/posts"
        );
    }

    #[test]
    fn config_defaults_to_production_endpoint() {
        let config = ClientConfig::new("acme", "tok");
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
    }

    #[test]
    fn debug_does_not_leak_token() {
        let client = DocbaseClient::new(ClientConfig::new("acme", "secret-token"));
        let debug = format!("{client:?}");
        assert!(!debug.contains("secret-token"));
    }
}
