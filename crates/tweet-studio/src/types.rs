//! Request and response bodies exchanged with the tweet backend

use serde::{Deserialize, Serialize};

use crate::options::Temperature;

/// Kind of a message in the backend's conversation memory
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageKind {
  Human,
  Ai,
  Image,
  #[serde(other)]
  Other,
}

/// One message of `GET /history`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerMessage {
  #[serde(rename = "type")]
  pub kind: MessageKind,
  #[serde(default)]
  pub content: Option<String>,
  /// Seconds since the epoch
  #[serde(default)]
  pub timestamp: Option<f64>,
  #[serde(default)]
  pub image_url: Option<String>,
  #[serde(default)]
  pub image: Option<String>,
  #[serde(default)]
  pub image_uuid: Option<String>,
}

impl ServerMessage {
  /// Direct image URL carried by the message, if any
  pub fn direct_image(&self) -> Option<&str> {
    self
      .image_url
      .as_deref()
      .filter(|url| !url.is_empty())
      .or_else(|| self.image.as_deref().filter(|url| !url.is_empty()))
  }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HistoryResponse {
  #[serde(default)]
  pub history: Vec<ServerMessage>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ImageUrlResponse {
  #[serde(default)]
  pub url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateRequest {
  pub prompt: String,
  pub hashtag: bool,
  pub emoji: bool,
  pub temperature: Temperature,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateResponse {
  pub result: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateImageRequest {
  pub prompt: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateImageResponse {
  pub image_url: String,
  #[serde(default)]
  pub uuid: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostTweetRequest {
  pub username: String,
  pub text: String,
  pub image: Option<String>,
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_history_message_kinds() {
    let response: HistoryResponse = serde_json::from_str(
      r#"{"history":[
        {"type":"human","content":"cats","timestamp":1700000000},
        {"type":"ai","content":"Cats rule.","image_uuid":"abc"},
        {"type":"system","content":"ignored"}
      ]}"#,
    )
    .unwrap();

    let kinds: Vec<_> = response.history.iter().map(|m| m.kind.clone()).collect();
    assert_eq!(kinds, vec![MessageKind::Human, MessageKind::Ai, MessageKind::Other]);
    assert_eq!(response.history[0].timestamp, Some(1_700_000_000.0));
    assert_eq!(response.history[1].image_uuid.as_deref(), Some("abc"));
  }

  #[test]
  fn test_direct_image_prefers_image_url() {
    let message: ServerMessage = serde_json::from_str(
      r#"{"type":"image","image_url":"https://a/1.png","image":"https://b/2.png"}"#,
    )
    .unwrap();
    assert_eq!(message.direct_image(), Some("https://a/1.png"));

    let message: ServerMessage =
      serde_json::from_str(r#"{"type":"image","image_url":"","image":"https://b/2.png"}"#).unwrap();
    assert_eq!(message.direct_image(), Some("https://b/2.png"));
  }

  #[test]
  fn test_generate_request_body_shape() {
    let request = GenerateRequest {
      prompt: "tides".to_string(),
      hashtag: true,
      emoji: false,
      temperature: Temperature::Wild,
    };
    let value = serde_json::to_value(&request).unwrap();
    assert_eq!(value["temperature"], "wild");
    assert_eq!(value["hashtag"], true);
  }
}
