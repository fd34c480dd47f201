//! Tweet Studio - generate, refine and publish AI-written tweets
//!
//! The library holds the studio controller and everything it needs to talk to
//! the tweet backend and keep a local history. The `tweet-studio` binary is a
//! thin command-line view over it.

pub mod client;
pub mod clipboard;
pub mod config;
pub mod display;
pub mod error;
pub mod history;
pub mod options;
pub mod output;
pub mod prompt;
pub mod record;
pub mod store;
pub mod studio;
pub mod types;

pub use client::{Backend, ClientConfig, StudioClient};
pub use config::Config;
pub use error::{Result, StudioError};
pub use history::History;
pub use options::{GenerationOptions, Temperature};
pub use record::{GenerationRecord, ImageState};
pub use store::HistoryStore;
pub use studio::{Generated, RestoreReport, Studio};
