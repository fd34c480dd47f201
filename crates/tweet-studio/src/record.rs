//! The generation record: one prompt and what the backend made of it

use chrono::{DateTime, Local, TimeZone};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

const PENDING_SENTINEL: &str = "loading";

/// Where the image attached to a record stands
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ImageState {
  /// No image requested, or the request failed
  #[default]
  Absent,
  /// An image request is in flight
  Pending,
  /// A generated image is available at this URL
  Url(String),
}

impl ImageState {
  pub fn url(&self) -> Option<&str> {
    match self {
      ImageState::Url(url) => Some(url),
      _ => None,
    }
  }

  pub fn is_pending(&self) -> bool {
    matches!(self, ImageState::Pending)
  }

  /// Interpret a raw image field as stored by the history cache
  pub fn from_raw(raw: Option<&str>) -> Self {
    match raw.map(str::trim) {
      None | Some("") => ImageState::Absent,
      Some(PENDING_SENTINEL) => ImageState::Pending,
      Some(url) => ImageState::Url(url.to_string()),
    }
  }
}

// The cache keeps the image as a single string: "" for none, "loading" while pending.
impl Serialize for ImageState {
  fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
    match self {
      ImageState::Absent => serializer.serialize_str(""),
      ImageState::Pending => serializer.serialize_str(PENDING_SENTINEL),
      ImageState::Url(url) => serializer.serialize_str(url),
    }
  }
}

impl<'de> Deserialize<'de> for ImageState {
  fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(ImageState::from_raw(raw.as_deref()))
  }
}

/// One prompt paired with its generated text, image and posting status
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationRecord {
  pub prompt: String,
  pub text: String,
  #[serde(default)]
  pub image: ImageState,
  #[serde(default)]
  pub image_uuid: Option<String>,
  #[serde(default)]
  pub posted: bool,
  #[serde(default)]
  pub editing: bool,
  /// Display time, `HH:MM` in local time
  #[serde(default)]
  pub time: String,
}

impl GenerationRecord {
  /// A freshly generated record stamped with the current time
  pub fn new(prompt: impl Into<String>, text: impl Into<String>, image: ImageState) -> Self {
    Self {
      prompt: prompt.into(),
      text: text.into(),
      image,
      image_uuid: None,
      posted: false,
      editing: false,
      time: display_time(&Local::now()),
    }
  }

  /// Composite identity used to spot the same generation coming from two sources
  pub fn dedupe_key(&self) -> String {
    format!("{}::{}", self.prompt.trim().to_lowercase(), self.text.trim().to_lowercase())
  }
}

pub fn display_time<Tz: TimeZone>(at: &DateTime<Tz>) -> String
where
  Tz::Offset: std::fmt::Display,
{
  at.format("%H:%M").to_string()
}

/// Display time for a server timestamp given in epoch seconds
pub fn display_time_from_epoch(seconds: f64) -> String {
  let millis = (seconds * 1000.0) as i64;
  match Local.timestamp_millis_opt(millis).single() {
    Some(at) => display_time(&at),
    None => display_time(&Local::now()),
  }
}
