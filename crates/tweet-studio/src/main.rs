use std::io::Read;
use std::process::ExitCode;

use anyhow::{anyhow, Context, Result};
use clap::{Args, Parser, Subcommand};
use colored::*;
use tracing_subscriber::{filter::EnvFilter, fmt, prelude::*};

use tweet_studio::clipboard::{copy_blocks, copy_to_clipboard};
use tweet_studio::display::{print_history, render_record};
use tweet_studio::store::studio_dir;
use tweet_studio::{
  output, ClientConfig, Config, GenerationOptions, HistoryStore, Studio, StudioClient, Temperature,
};

#[derive(Parser)]
#[command(name = "tweet-studio")]
#[command(about = "Tweet Studio - generate, refine and post AI-written tweets from the terminal")]
#[command(version)]
struct Cli {
  #[command(flatten)]
  backend: BackendArgs,

  /// Increase log verbosity (-v info, -vv debug)
  #[arg(short, long, global = true, action = clap::ArgAction::Count)]
  verbose: u8,

  #[command(subcommand)]
  command: Command,
}

/// Backend connection settings, overriding config.json
#[derive(Args)]
struct BackendArgs {
  /// Base URL of the tweet backend
  #[arg(long, global = true, env = "TWEET_STUDIO_BACKEND_URL")]
  backend_url: Option<String>,

  /// Key sent with posts (the backend's `api-key` header)
  #[arg(long, global = true, env = "TWEET_STUDIO_API_KEY", hide_env_values = true)]
  api_key: Option<String>,

  /// Account name posts are published under
  #[arg(long, global = true, env = "TWEET_STUDIO_USERNAME")]
  username: Option<String>,

  /// Give up on backend requests after this many seconds
  #[arg(long, global = true, env = "TWEET_STUDIO_TIMEOUT_SECS")]
  timeout_secs: Option<u64>,
}

/// Position of a generation as shown by `history`
#[derive(Args)]
struct Target {
  index: usize,
}

/// Options layered on top of the configured defaults
#[derive(Args)]
struct GenerateFlags {
  /// Include hashtags
  #[arg(long, overrides_with = "no_hashtag")]
  hashtag: bool,
  /// Leave hashtags out, even when config.json turns them on
  #[arg(long, overrides_with = "hashtag")]
  no_hashtag: bool,
  /// Include emojis
  #[arg(long, overrides_with = "no_emoji")]
  emoji: bool,
  /// Leave emojis out, even when config.json turns them on
  #[arg(long, overrides_with = "emoji")]
  no_emoji: bool,
  /// Also generate an image for the tweet
  #[arg(long, overrides_with = "no_image")]
  image: bool,
  /// Skip the image, even when config.json asks for one
  #[arg(long, overrides_with = "image")]
  no_image: bool,
  /// Sampling temperature preset
  #[arg(short, long, value_enum)]
  temperature: Option<Temperature>,
}

/// `Some(true)` for `--flag`, `Some(false)` for `--no-flag`, `None` to keep the default
fn toggle(on: bool, off: bool) -> Option<bool> {
  match (on, off) {
    (true, _) => Some(true),
    (_, true) => Some(false),
    _ => None,
  }
}

impl GenerateFlags {
  fn apply(&self, options: &mut GenerationOptions) {
    if let Some(hashtag) = toggle(self.hashtag, self.no_hashtag) {
      options.hashtag = hashtag;
    }
    if let Some(emoji) = toggle(self.emoji, self.no_emoji) {
      options.emoji = emoji;
    }
    if let Some(image) = toggle(self.image, self.no_image) {
      options.image = image;
    }
    if let Some(temperature) = self.temperature {
      options.temperature = temperature;
    }
  }
}

#[derive(Subcommand)]
enum Command {
  /// Generate a tweet about a topic
  Generate {
    /// Topic to write about; may carry directives like "include hashtags"
    #[arg(required = true)]
    topic: Vec<String>,
    #[command(flatten)]
    flags: GenerateFlags,
  },
  /// Show past generations, merged with the backend memory
  History {
    /// Only show the local history, without contacting the backend
    #[arg(long)]
    offline: bool,
  },
  /// Show a single generation
  Show {
    #[command(flatten)]
    target: Target,
  },
  /// Replace the text of a generation (reads stdin when no text is given)
  Edit {
    #[command(flatten)]
    target: Target,
    /// New tweet text
    text: Option<String>,
    /// Abandon an edit in progress
    #[arg(long, conflicts_with = "text")]
    cancel: bool,
  },
  /// Post a generation
  Post {
    #[command(flatten)]
    target: Target,
  },
  /// Request a new image for a generation
  RegenerateImage {
    #[command(flatten)]
    target: Target,
  },
  /// Copy a generation's text to the clipboard
  Copy {
    #[command(flatten)]
    target: Target,
  },
  /// Clear the local history and the backend memory
  Clear {
    /// Skip confirmation prompt
    #[arg(short, long)]
    force: bool,
  },
}

fn init_tracing(verbose: u8) {
  let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| match verbose {
    0 => EnvFilter::new("tweet_studio=warn,warn"),
    1 => EnvFilter::new("tweet_studio=info,warn"),
    _ => EnvFilter::new("tweet_studio=debug,reqwest=debug,info"),
  });

  tracing_subscriber::registry()
    .with(fmt::layer().with_writer(std::io::stderr))
    .with(filter)
    .init();
}

fn load_config(args: &BackendArgs) -> Result<Config> {
  let mut config = Config::load(studio_dir()).context("Failed to load config.json")?;

  if let Some(url) = &args.backend_url {
    config.backend_url = url.clone();
  }
  if let Some(key) = &args.api_key {
    config.api_key = Some(key.clone());
  }
  if let Some(username) = &args.username {
    config.username = username.clone();
  }
  if args.timeout_secs.is_some() {
    config.timeout_secs = args.timeout_secs;
  }

  config.validate()?;
  Ok(config)
}

fn open_studio(config: &Config) -> Result<Studio<StudioClient>> {
  let client = StudioClient::with_config(ClientConfig::from(config))?;
  let studio = Studio::new(client, HistoryStore::new(), config.username.clone())
    .with_options(config.defaults);
  Ok(studio)
}

fn open_local(config: &Config) -> Result<Studio<StudioClient>> {
  let mut studio = open_studio(config)?;
  studio.load_local().context("Failed to read the local history")?;
  Ok(studio)
}

fn confirm(question: &str) -> Result<bool> {
  print!("{question} (y/N): ");
  std::io::Write::flush(&mut std::io::stdout())?;

  let mut input = String::new();
  std::io::stdin().read_line(&mut input)?;

  let response = input.trim().to_lowercase();
  Ok(response == "y" || response == "yes")
}

async fn generate(config: &Config, topic: Vec<String>, flags: GenerateFlags) -> Result<()> {
  let mut studio = open_local(config)?;

  flags.apply(studio.options_mut());

  output::info("✨ Generating...");
  let Some(generated) = studio.generate(&topic.join(" ")).await? else {
    output::warn("Nothing to generate: the topic is empty once directives are removed");
    return Ok(());
  };

  if generated.reused {
    output::info(&format!("Same as #{}, keeping the existing entry", generated.index));
  }

  let record = &studio.records()[generated.index];
  println!("{}", render_record(generated.index, record));

  if let Some(e) = generated.image_error {
    output::warn(&format!("Image generation failed: {e}"));
  }
  Ok(())
}

async fn history(config: &Config, offline: bool) -> Result<()> {
  let mut studio = open_studio(config)?;

  if offline {
    studio.load_local().context("Failed to read the local history")?;
  } else {
    let report = studio.restore().await;
    if let Some(e) = &report.cache_error {
      output::warn(&format!("Ignoring unreadable local history: {e}"));
    }
    if let Some(e) = &report.server_error {
      output::warn(&format!("Could not reach the backend, showing local history: {e}"));
    } else if report.merged > 0 {
      output::info(&format!("Merged {} generation(s) from the backend", report.merged));
    }
  }

  output::announce("AI Tweet Studio 🚀");
  print_history(studio.records());
  Ok(())
}

fn show(config: &Config, index: usize) -> Result<()> {
  let studio = open_local(config)?;
  let record = studio.history().get(index)?;
  println!("{}", render_record(index, record));
  Ok(())
}

fn edit(config: &Config, index: usize, text: Option<String>, cancel: bool) -> Result<()> {
  let mut studio = open_local(config)?;

  if cancel {
    studio.cancel_edit(index)?;
    output::info(&format!("Edit of #{index} cancelled"));
    return Ok(());
  }

  // The edit is only marked once the new text is in hand, so a failed read
  // leaves nothing behind in the cache.
  let text = match text {
    Some(text) => text,
    None => {
      output::info("Current text:");
      output::log(studio.copy_text(index)?);
      output::info("Enter the new text, then press Ctrl-D:");
      let mut buffer = String::new();
      std::io::stdin().read_to_string(&mut buffer).context("Failed to read the new text")?;
      buffer
    }
  };

  let text = text.trim();
  if text.is_empty() {
    studio.history().get(index)?;
    return Err(anyhow!("Edited text is empty, keeping the original"));
  }

  studio.begin_edit(index)?;
  if let Err(e) = studio.save_edit(index, text) {
    studio.cancel_edit(index)?;
    return Err(e.into());
  }
  output::success(&format!("Saved #{index}"));
  Ok(())
}

async fn post(config: &Config, index: usize) -> Result<()> {
  let mut studio = open_local(config)?;
  studio.post(index).await?;
  output::success(&format!("{} Posted #{index}", "✅".green()));
  Ok(())
}

async fn regenerate_image(config: &Config, index: usize) -> Result<()> {
  let mut studio = open_local(config)?;

  output::info("🔁 Regenerating image...");
  studio.regenerate_image(index).await?;

  let record = studio.history().get(index)?;
  println!("{}", render_record(index, record));
  Ok(())
}

fn copy(config: &Config, index: usize) -> Result<()> {
  let studio = open_local(config)?;
  let text = studio.copy_text(index)?;
  if copy_blocks() {
    output::info("Holding the clipboard until another application takes it over...");
  }
  copy_to_clipboard(text)?;
  output::success(&format!("📋 Copied #{index} to the clipboard"));
  Ok(())
}

async fn clear(config: &Config, force: bool) -> Result<()> {
  if !force && !confirm("Clear all chat history?")? {
    println!("Clear cancelled.");
    return Ok(());
  }

  let mut studio = open_studio(config)?;
  studio.clear().await?;
  output::success("🧹 History cleared");
  Ok(())
}

async fn run(cli: Cli) -> Result<()> {
  let config = load_config(&cli.backend)?;

  match cli.command {
    Command::Generate { topic, flags } => generate(&config, topic, flags).await,
    Command::History { offline } => history(&config, offline).await,
    Command::Show { target } => show(&config, target.index),
    Command::Edit { target, text, cancel } => edit(&config, target.index, text, cancel),
    Command::Post { target } => post(&config, target.index).await,
    Command::RegenerateImage { target } => regenerate_image(&config, target.index).await,
    Command::Copy { target } => copy(&config, target.index),
    Command::Clear { force } => clear(&config, force).await,
  }
}

#[tokio::main]
async fn main() -> ExitCode {
  let cli = Cli::parse();
  init_tracing(cli.verbose);

  match run(cli).await {
    Ok(()) => ExitCode::SUCCESS,
    Err(e) => {
      output::alert(&format!("{e:#}"));
      ExitCode::FAILURE
    }
  }
}
