//! The studio controller
//!
//! Holds the generation history and the current options, and turns user
//! actions into backend calls. Every mutation the user would expect to
//! survive a restart is written through to the [`HistoryStore`]; the store is
//! a convenience cache, so write failures are logged rather than surfaced.

use futures::future::join_all;
use tracing::{debug, info, warn};

use crate::client::Backend;
use crate::error::{Result, StudioError};
use crate::history::{group_server_messages, needs_image_lookup, History};
use crate::options::GenerationOptions;
use crate::prompt::parse_prompt;
use crate::record::{GenerationRecord, ImageState};
use crate::store::HistoryStore;
use crate::types::{GenerateRequest, PostTweetRequest};

/// Result of a successful generation
#[derive(Debug)]
pub struct Generated {
  /// Position of the new record in the history
  pub index: usize,
  /// Set when an image was requested and could not be produced
  pub image_error: Option<StudioError>,
  /// The backend returned a result already in the history; no record was added
  pub reused: bool,
}

/// What happened while restoring history
#[derive(Debug, Default)]
pub struct RestoreReport {
  /// Records read from the local cache
  pub cached: usize,
  /// Records appended from the backend memory
  pub merged: usize,
  /// The local cache existed but could not be read
  pub cache_error: Option<StudioError>,
  /// The backend history could not be fetched
  pub server_error: Option<StudioError>,
}

pub struct Studio<B: Backend> {
  backend: B,
  store: HistoryStore,
  history: History,
  options: GenerationOptions,
  username: String,
}

impl<B: Backend> Studio<B> {
  pub fn new(backend: B, store: HistoryStore, username: impl Into<String>) -> Self {
    Self {
      backend,
      store,
      history: History::new(),
      options: GenerationOptions::default(),
      username: username.into(),
    }
  }

  pub fn with_options(mut self, options: GenerationOptions) -> Self {
    self.options = options;
    self
  }

  pub fn history(&self) -> &History {
    &self.history
  }

  pub fn records(&self) -> &[GenerationRecord] {
    self.history.records()
  }

  pub fn options(&self) -> &GenerationOptions {
    &self.options
  }

  pub fn options_mut(&mut self) -> &mut GenerationOptions {
    &mut self.options
  }

  pub fn backend(&self) -> &B {
    &self.backend
  }

  fn persist(&self) {
    if let Err(e) = self.store.save(&self.history) {
      warn!(path = %self.store.path().display(), "failed to cache history: {e}");
    }
  }

  /// Read the local cache into memory, replacing what is there
  pub fn load_local(&mut self) -> Result<usize> {
    self.history = self.store.load()?;
    Ok(self.history.len())
  }

  /// Load the local cache, then fold in the backend's memory.
  ///
  /// Neither source failing is fatal: a broken cache starts empty and an
  /// unreachable backend leaves the cached history as it is.
  pub async fn restore(&mut self) -> RestoreReport {
    let mut report = RestoreReport::default();

    match self.load_local() {
      Ok(cached) => report.cached = cached,
      Err(e) => {
        warn!("failed to parse cached history: {e}");
        self.history = History::new();
        report.cache_error = Some(e);
      }
    }

    let messages = match self.backend.fetch_history().await {
      Ok(messages) => messages,
      Err(e) => {
        warn!("failed to fetch backend history: {e}");
        report.server_error = Some(e);
        return report;
      }
    };

    let mut grouped = group_server_messages(&messages);
    self.resolve_images(&mut grouped).await;

    report.merged = self.history.merge(grouped);
    if report.merged > 0 {
      info!(merged = report.merged, "merged backend history");
      self.persist();
    }

    report
  }

  async fn resolve_images(&self, records: &mut [GenerationRecord]) {
    let pending: Vec<(usize, String)> = records
      .iter()
      .enumerate()
      .filter(|(_, record)| needs_image_lookup(record))
      .filter_map(|(i, record)| record.image_uuid.clone().map(|uuid| (i, uuid)))
      .collect();

    if pending.is_empty() {
      return;
    }

    debug!(count = pending.len(), "resolving image URLs");
    let lookups = pending.iter().map(|(_, uuid)| self.backend.image_url(uuid));
    let results = join_all(lookups).await;

    for ((i, uuid), result) in pending.into_iter().zip(results) {
      match result {
        Ok(Some(url)) => records[i].image = ImageState::Url(url),
        Ok(None) => debug!(%uuid, "backend has no URL for image"),
        Err(e) => warn!(%uuid, "failed to fetch image URL: {e}"),
      }
    }
  }

  /// Generate a tweet for the typed prompt.
  ///
  /// Returns `Ok(None)` when there is nothing to send. Directives in the
  /// prompt update the current options before the request is made.
  pub async fn generate(&mut self, raw: &str) -> Result<Option<Generated>> {
    let raw = raw.trim();
    if raw.is_empty() {
      return Ok(None);
    }

    let parsed = parse_prompt(raw);
    self.options.apply(&parsed);
    if parsed.prompt.is_empty() {
      warn!("prompt held only directives, nothing to generate");
      return Ok(None);
    }

    let request = GenerateRequest {
      prompt: parsed.prompt.clone(),
      hashtag: self.options.hashtag,
      emoji: self.options.emoji,
      temperature: self.options.temperature,
    };
    info!(prompt = %request.prompt, temperature = %request.temperature, "generating tweet");
    let text = self.backend.generate(&request).await?;

    let image = if self.options.image { ImageState::Pending } else { ImageState::Absent };
    let record = GenerationRecord::new(parsed.prompt, text.clone(), image);
    if let Some(existing) = self.history.position_of(&record.dedupe_key()) {
      info!(index = existing, "generation matches an existing record");
      return Ok(Some(Generated { index: existing, image_error: None, reused: true }));
    }

    let index = self.history.push(record);
    self.persist();

    let image_error =
      if self.options.image { self.attach_image(index, &text).await.err() } else { None };

    Ok(Some(Generated { index, image_error, reused: false }))
  }

  /// Request a fresh image for an existing record
  pub async fn regenerate_image(&mut self, index: usize) -> Result<()> {
    let record = self.history.get_mut(index)?;
    record.image = ImageState::Pending;
    let text = record.text.clone();

    self.attach_image(index, &text).await
  }

  async fn attach_image(&mut self, index: usize, prompt: &str) -> Result<()> {
    let outcome = self.backend.generate_image(prompt).await;

    let record = self.history.get_mut(index)?;
    let result = match outcome {
      Ok(response) => {
        record.image = ImageState::from_raw(Some(&response.image_url));
        record.image_uuid = response.uuid;
        Ok(())
      }
      Err(e) => {
        warn!(index, "image generation failed: {e}");
        record.image = ImageState::Absent;
        Err(e)
      }
    };

    self.persist();
    result
  }

  /// Publish a record; a record can only be posted once
  pub async fn post(&mut self, index: usize) -> Result<()> {
    let record = self.history.get(index)?;
    if record.posted {
      return Err(StudioError::AlreadyPosted { index });
    }

    let request = PostTweetRequest {
      username: self.username.clone(),
      text: record.text.clone(),
      image: record.image.url().map(str::to_string),
    };
    self.backend.post_tweet(&request).await?;

    self.history.get_mut(index)?.posted = true;
    self.persist();
    info!(index, "tweet posted");
    Ok(())
  }

  /// Mark a record as being edited and hand back its current text
  pub fn begin_edit(&mut self, index: usize) -> Result<String> {
    let record = self.history.get_mut(index)?;
    record.editing = true;
    let text = record.text.clone();
    self.persist();
    Ok(text)
  }

  pub fn cancel_edit(&mut self, index: usize) -> Result<()> {
    self.history.get_mut(index)?.editing = false;
    self.persist();
    Ok(())
  }

  /// Replace a record's text. The posted flag is kept as it was.
  ///
  /// Text that would make the record collide with another one is refused.
  pub fn save_edit(&mut self, index: usize, text: impl Into<String>) -> Result<()> {
    let text = text.into();
    let mut edited = self.history.get(index)?.clone();
    edited.text = text.clone();
    if let Some(existing) = self.history.position_of(&edited.dedupe_key()) {
      if existing != index {
        return Err(StudioError::DuplicateEntry { index, existing });
      }
    }

    let record = self.history.get_mut(index)?;
    record.text = text;
    record.editing = false;
    self.persist();
    Ok(())
  }

  pub fn copy_text(&self, index: usize) -> Result<&str> {
    Ok(&self.history.get(index)?.text)
  }

  /// Drop every record locally and wipe the backend memory
  pub async fn clear(&mut self) -> Result<()> {
    self.history.clear();
    self.store.clear()?;
    self.backend.clear_memory().await?;
    info!("history cleared");
    Ok(())
  }
}
