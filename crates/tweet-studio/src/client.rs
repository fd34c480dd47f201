//! HTTP client for the tweet backend
//!
//! The backend is an opaque collaborator; this module only knows its six
//! endpoints and their JSON bodies. The controller talks to it through the
//! [`Backend`] trait so tests can stand in a fake.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;

use crate::config::Config;
use crate::error::{Result, StudioError};
use crate::types::{
  GenerateImageRequest, GenerateImageResponse, GenerateRequest, GenerateResponse,
  HistoryResponse, ImageUrlResponse, PostTweetRequest, ServerMessage,
};

/// HTTP method types for backend calls
#[derive(Debug, Copy, Clone)]
enum HttpMethod {
  Get,
  Post,
}

impl std::fmt::Display for HttpMethod {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    let method_str = match self {
      HttpMethod::Get => "GET",
      HttpMethod::Post => "POST",
    };
    write!(f, "{method_str}")
  }
}

/// Calls the studio makes against the backend
#[async_trait]
pub trait Backend {
  /// Conversation memory as a flat message log
  async fn fetch_history(&self) -> Result<Vec<ServerMessage>>;

  /// Resolve an image UUID to a URL, `None` when the backend has none
  async fn image_url(&self, uuid: &str) -> Result<Option<String>>;

  /// Generate tweet text
  async fn generate(&self, request: &GenerateRequest) -> Result<String>;

  /// Generate an image for a piece of text
  async fn generate_image(&self, prompt: &str) -> Result<GenerateImageResponse>;

  /// Wipe the backend conversation memory
  async fn clear_memory(&self) -> Result<()>;

  /// Publish a tweet
  async fn post_tweet(&self, request: &PostTweetRequest) -> Result<()>;
}

/// Configuration for the backend HTTP client
#[derive(Debug, Clone)]
pub struct ClientConfig {
  /// Base URL of the backend without trailing slash
  pub base_url: String,
  /// Key sent as the `api-key` header on posts
  pub api_key: Option<String>,
  /// Optional request timeout in seconds
  pub timeout_secs: Option<u64>,
}

impl From<&Config> for ClientConfig {
  fn from(config: &Config) -> Self {
    Self {
      base_url: config.base_url().to_string(),
      api_key: config.api_key.clone(),
      timeout_secs: config.timeout_secs,
    }
  }
}

/// reqwest-backed [`Backend`]
pub struct StudioClient {
  client: Client,
  config: ClientConfig,
}

impl StudioClient {
  pub fn with_config(config: ClientConfig) -> Result<Self> {
    let mut builder = Client::builder();
    if let Some(secs) = config.timeout_secs {
      builder = builder.timeout(Duration::from_secs(secs));
    }

    let client = builder.build().map_err(|source| StudioError::Transport {
      endpoint: config.base_url.clone(),
      source,
    })?;

    Ok(Self { client, config })
  }

  pub fn base_url(&self) -> &str {
    &self.config.base_url
  }

  fn url(&self, endpoint: &str) -> String {
    format!("{}{}", self.config.base_url, endpoint)
  }
}

/// Check the status and decode the JSON body
async fn parse_response<R>(
  response: reqwest::Response,
  method: HttpMethod,
  endpoint: &str,
  failure: &'static str,
) -> Result<R>
where
  R: serde::de::DeserializeOwned,
{
  let response = ensure_success(response, method, endpoint, failure).await?;
  response.json().await.map_err(|source| StudioError::Transport {
    endpoint: endpoint.to_string(),
    source,
  })
}

async fn ensure_success(
  response: reqwest::Response,
  method: HttpMethod,
  endpoint: &str,
  failure: &'static str,
) -> Result<reqwest::Response> {
  let status = response.status();
  debug!(%method, endpoint, status = status.as_u16(), "backend responded");

  if status.is_success() {
    return Ok(response);
  }

  let body = response.text().await.unwrap_or_default();
  Err(StudioError::Request {
    endpoint: format!("{method} {endpoint}"),
    status: status.as_u16(),
    message: failure,
    body,
  })
}

fn transport(endpoint: &str) -> impl FnOnce(reqwest::Error) -> StudioError + '_ {
  move |source| StudioError::Transport { endpoint: endpoint.to_string(), source }
}

// Request Helpers
// ===============
impl StudioClient {
  async fn get_json<R>(&self, endpoint: &str, failure: &'static str) -> Result<R>
  where
    R: serde::de::DeserializeOwned,
  {
    let response =
      self.client.get(self.url(endpoint)).send().await.map_err(transport(endpoint))?;
    parse_response(response, HttpMethod::Get, endpoint, failure).await
  }

  async fn post_json<T, R>(&self, endpoint: &str, request: &T, failure: &'static str) -> Result<R>
  where
    T: serde::Serialize + Sync,
    R: serde::de::DeserializeOwned,
  {
    let response = self
      .client
      .post(self.url(endpoint))
      .json(request)
      .send()
      .await
      .map_err(transport(endpoint))?;
    parse_response(response, HttpMethod::Post, endpoint, failure).await
  }
}

#[async_trait]
impl Backend for StudioClient {
  async fn fetch_history(&self) -> Result<Vec<ServerMessage>> {
    let response: HistoryResponse = self.get_json("/history", "Failed to fetch history").await?;
    Ok(response.history)
  }

  async fn image_url(&self, uuid: &str) -> Result<Option<String>> {
    let endpoint = format!("/image_url/{uuid}");
    let response: ImageUrlResponse =
      self.get_json(&endpoint, "Failed to resolve image URL").await?;
    Ok(response.url.filter(|url| !url.is_empty()))
  }

  async fn generate(&self, request: &GenerateRequest) -> Result<String> {
    let response: GenerateResponse =
      self.post_json("/generate", request, "Tweet generation failed").await?;
    Ok(response.result)
  }

  async fn generate_image(&self, prompt: &str) -> Result<GenerateImageResponse> {
    let request = GenerateImageRequest { prompt: prompt.to_string() };
    self.post_json("/generate_image", &request, "Image generation failed").await
  }

  async fn clear_memory(&self) -> Result<()> {
    let endpoint = "/clear_memory";
    let response =
      self.client.post(self.url(endpoint)).send().await.map_err(transport(endpoint))?;
    ensure_success(response, HttpMethod::Post, endpoint, "Failed to clear memory").await?;
    Ok(())
  }

  async fn post_tweet(&self, request: &PostTweetRequest) -> Result<()> {
    let endpoint = "/post_tweet";
    let mut builder = self.client.post(self.url(endpoint)).json(request);
    if let Some(key) = &self.config.api_key {
      builder = builder.header("api-key", key);
    }

    let response = builder.send().await.map_err(transport(endpoint))?;
    ensure_success(response, HttpMethod::Post, endpoint, "Tweet failed").await?;
    Ok(())
  }
}
