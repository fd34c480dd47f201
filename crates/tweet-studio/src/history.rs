//! Ordered generation history and its reconciliation with the backend memory

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::{Result, StudioError};
use crate::record::{display_time, display_time_from_epoch, GenerationRecord, ImageState};
use crate::types::{MessageKind, ServerMessage};

/// Generation records in chronological order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct History {
  records: Vec<GenerationRecord>,
}

impl History {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn from_records(records: Vec<GenerationRecord>) -> Self {
    Self { records }
  }

  pub fn records(&self) -> &[GenerationRecord] {
    &self.records
  }

  pub fn len(&self) -> usize {
    self.records.len()
  }

  pub fn is_empty(&self) -> bool {
    self.records.is_empty()
  }

  pub fn get(&self, index: usize) -> Result<&GenerationRecord> {
    let len = self.records.len();
    self.records.get(index).ok_or(StudioError::IndexOutOfRange { index, len })
  }

  pub fn get_mut(&mut self, index: usize) -> Result<&mut GenerationRecord> {
    let len = self.records.len();
    self.records.get_mut(index).ok_or(StudioError::IndexOutOfRange { index, len })
  }

  /// Append a record, returning its index
  pub fn push(&mut self, record: GenerationRecord) -> usize {
    self.records.push(record);
    self.records.len() - 1
  }

  /// Index of the record carrying this dedupe key
  pub fn position_of(&self, key: &str) -> Option<usize> {
    self.records.iter().position(|record| record.dedupe_key() == key)
  }

  pub fn clear(&mut self) {
    self.records.clear();
  }

  /// Append the incoming records whose dedupe key is not already present.
  ///
  /// Returns how many records were appended.
  pub fn merge(&mut self, incoming: impl IntoIterator<Item = GenerationRecord>) -> usize {
    let mut seen: HashSet<String> = self.records.iter().map(GenerationRecord::dedupe_key).collect();
    let before = self.records.len();

    for record in incoming {
      if seen.insert(record.dedupe_key()) {
        self.records.push(record);
      }
    }

    self.records.len() - before
  }
}

/// Pair up the backend's flat message log into generation records.
///
/// A `human` message opens a record; the next `ai` or `image` message closes
/// it. Replies without an open prompt and prompts that never got a reply are
/// dropped. Records that only carry an image UUID come back with an absent
/// image and are left for the caller to resolve.
pub fn group_server_messages(messages: &[ServerMessage]) -> Vec<GenerationRecord> {
  let mut grouped = Vec::new();
  let mut current: Option<GenerationRecord> = None;

  for message in messages {
    match message.kind {
      MessageKind::Human => {
        let time = match message.timestamp {
          Some(seconds) => display_time_from_epoch(seconds),
          None => display_time(&chrono::Local::now()),
        };
        current = Some(GenerationRecord {
          prompt: message.content.clone().unwrap_or_default(),
          text: String::new(),
          image: ImageState::Absent,
          image_uuid: None,
          posted: false,
          editing: false,
          time,
        });
      }
      MessageKind::Ai | MessageKind::Image => {
        let Some(mut record) = current.take() else {
          continue;
        };

        if let Some(url) = message.direct_image() {
          record.image = ImageState::Url(url.to_string());
        }
        if let Some(uuid) = message.image_uuid.as_deref().filter(|uuid| !uuid.is_empty()) {
          record.image_uuid = Some(uuid.to_string());
        }
        if message.kind == MessageKind::Ai {
          record.text = message.content.clone().unwrap_or_default();
        }

        grouped.push(record);
      }
      MessageKind::Other => {}
    }
  }

  grouped
}

/// Whether a record still needs its image URL looked up by UUID
pub fn needs_image_lookup(record: &GenerationRecord) -> bool {
  record.image == ImageState::Absent && record.image_uuid.is_some()
}
