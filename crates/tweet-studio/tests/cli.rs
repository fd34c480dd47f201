use assert_cmd::prelude::*;

use predicates::prelude::*;
use predicates::str::contains;
use serial_test::serial;
use std::process::Command;

// Nothing listens on the discard port, so backend calls fail fast.
const UNREACHABLE_BACKEND: &str = "http://127.0.0.1:9";

/// Helper to create a Command for the `tweet-studio` binary with a temporary studio dir.
fn studio_cmd(studio_dir: &assert_fs::TempDir, backend_url: &str) -> Command {
  let mut cmd = Command::cargo_bin("tweet-studio").expect("binary exists");
  cmd.env("TWEET_STUDIO_DIR", studio_dir.path());
  cmd.env("TWEET_STUDIO_BACKEND_URL", backend_url);
  cmd.env_remove("TWEET_STUDIO_API_KEY");
  cmd.env_remove("RUST_LOG");
  cmd.env("NO_COLOR", "1");
  cmd
}

fn seed_history(studio_dir: &assert_fs::TempDir, json: &str) {
  std::fs::write(studio_dir.path().join("chat_history.json"), json).unwrap();
}

#[test]
fn test_help_lists_commands() {
  Command::cargo_bin("tweet-studio")
    .unwrap()
    .arg("--help")
    .assert()
    .success()
    .stdout(contains("generate").and(contains("history")).and(contains("regenerate-image")));
}

#[test]
#[serial]
fn test_offline_history_empty() {
  let temp = assert_fs::TempDir::new().unwrap();

  studio_cmd(&temp, UNREACHABLE_BACKEND)
    .args(["history", "--offline"])
    .assert()
    .success()
    .stdout(contains("No generations yet"));

  temp.close().unwrap();
}

#[test]
#[serial]
fn test_history_falls_back_to_cache_when_backend_is_down() {
  let temp = assert_fs::TempDir::new().unwrap();
  seed_history(
    &temp,
    r#"[{"prompt":"otters","text":"Otters hold hands.","image":"","posted":true,"editing":false,"time":"08:30"}]"#,
  );

  studio_cmd(&temp, UNREACHABLE_BACKEND)
    .args(["history"])
    .assert()
    .success()
    .stdout(contains("otters").and(contains("Otters hold hands.")).and(contains("Posted")))
    .stderr(contains("Could not reach the backend"));

  temp.close().unwrap();
}

#[test]
#[serial]
fn test_show_out_of_range_fails_with_alert() {
  let temp = assert_fs::TempDir::new().unwrap();

  studio_cmd(&temp, UNREACHABLE_BACKEND)
    .args(["show", "3"])
    .assert()
    .failure()
    .stderr(contains("Error:").and(contains("No generation at index 3")));

  temp.close().unwrap();
}

#[test]
#[serial]
fn test_generate_against_mock_backend() {
  let temp = assert_fs::TempDir::new().unwrap();
  let mut server = mockito::Server::new();
  let mock = server
    .mock("POST", "/generate")
    .match_body(mockito::Matcher::PartialJson(serde_json::json!({
      "prompt": "harbor lights",
      "hashtag": true
    })))
    .with_status(200)
    .with_header("content-type", "application/json")
    .with_body(r#"{"result":"Harbor lights glow. #night"}"#)
    .create();

  studio_cmd(&temp, &server.url())
    .args(["generate", "--hashtag", "harbor", "lights"])
    .assert()
    .success()
    .stdout(contains("Harbor lights glow. #night"));

  mock.assert();

  let cached = std::fs::read_to_string(temp.path().join("chat_history.json")).unwrap();
  assert!(cached.contains("harbor lights"));

  temp.close().unwrap();
}

#[test]
#[serial]
fn test_edit_then_post_against_mock_backend() {
  let temp = assert_fs::TempDir::new().unwrap();
  seed_history(
    &temp,
    r#"[{"prompt":"kites","text":"Kites fly.","image":"","posted":false,"editing":false,"time":"10:00"}]"#,
  );

  let mut server = mockito::Server::new();
  let mock = server
    .mock("POST", "/post_tweet")
    .match_header("api-key", "k-123")
    .match_body(mockito::Matcher::PartialJson(serde_json::json!({"text": "Kites soar."})))
    .with_status(200)
    .create();

  studio_cmd(&temp, &server.url())
    .args(["edit", "0", "Kites soar."])
    .assert()
    .success()
    .stderr(contains("Saved #0"));

  studio_cmd(&temp, &server.url())
    .env("TWEET_STUDIO_API_KEY", "k-123")
    .args(["post", "0"])
    .assert()
    .success();

  mock.assert();

  studio_cmd(&temp, &server.url())
    .args(["post", "0"])
    .assert()
    .failure()
    .stderr(contains("already been posted"));

  temp.close().unwrap();
}

#[test]
#[serial]
fn test_clear_with_force() {
  let temp = assert_fs::TempDir::new().unwrap();
  seed_history(&temp, r#"[{"prompt":"a","text":"b"}]"#);

  let mut server = mockito::Server::new();
  let mock = server.mock("POST", "/clear_memory").with_status(200).create();

  studio_cmd(&temp, &server.url()).args(["clear", "--force"]).assert().success();

  mock.assert();
  assert!(!temp.path().join("chat_history.json").exists());

  temp.close().unwrap();
}

#[test]
#[serial]
fn test_invalid_backend_url_is_reported() {
  let temp = assert_fs::TempDir::new().unwrap();

  studio_cmd(&temp, "not a url")
    .args(["history", "--offline"])
    .assert()
    .failure()
    .stderr(contains("Invalid configuration"));

  temp.close().unwrap();
}

#[test]
#[serial]
fn test_generate_no_flag_overrides_config_default() {
  let temp = assert_fs::TempDir::new().unwrap();
  std::fs::write(temp.path().join("config.json"), r#"{"defaults":{"hashtag":true,"emoji":true}}"#)
    .unwrap();

  let mut server = mockito::Server::new();
  let mock = server
    .mock("POST", "/generate")
    .match_body(mockito::Matcher::PartialJson(serde_json::json!({
      "prompt": "quiet mornings",
      "hashtag": false,
      "emoji": true
    })))
    .with_status(200)
    .with_header("content-type", "application/json")
    .with_body(r#"{"result":"Coffee, then silence. ☕"}"#)
    .create();

  studio_cmd(&temp, &server.url())
    .args(["generate", "--no-hashtag", "quiet", "mornings"])
    .assert()
    .success()
    .stdout(contains("Coffee, then silence."));

  mock.assert();
  temp.close().unwrap();
}

#[test]
#[serial]
fn test_repeated_generate_keeps_single_entry() {
  let temp = assert_fs::TempDir::new().unwrap();
  let mut server = mockito::Server::new();
  let mock = server
    .mock("POST", "/generate")
    .with_status(200)
    .with_header("content-type", "application/json")
    .with_body(r#"{"result":"Same."}"#)
    .expect(2)
    .create();

  studio_cmd(&temp, &server.url()).args(["generate", "bees"]).assert().success();
  studio_cmd(&temp, &server.url())
    .args(["generate", "Bees"])
    .assert()
    .success()
    .stderr(contains("Same as #0"));

  mock.assert();

  let cached = std::fs::read_to_string(temp.path().join("chat_history.json")).unwrap();
  let records: Vec<serde_json::Value> = serde_json::from_str(&cached).unwrap();
  assert_eq!(records.len(), 1);

  temp.close().unwrap();
}

#[test]
#[serial]
fn test_failed_edit_read_leaves_record_untouched() {
  let temp = assert_fs::TempDir::new().unwrap();
  seed_history(
    &temp,
    r#"[{"prompt":"tides","text":"Tides turn.","image":"","posted":false,"editing":false,"time":"06:00"}]"#,
  );

  assert_cmd::Command::from_std(studio_cmd(&temp, UNREACHABLE_BACKEND))
    .args(["edit", "0"])
    .write_stdin(vec![0xff, 0xfe, 0xfd])
    .assert()
    .failure()
    .stderr(contains("Failed to read the new text"));

  let cached = std::fs::read_to_string(temp.path().join("chat_history.json")).unwrap();
  let records: Vec<serde_json::Value> = serde_json::from_str(&cached).unwrap();
  assert_eq!(records[0]["editing"], false);
  assert_eq!(records[0]["text"], "Tides turn.");

  temp.close().unwrap();
}

#[cfg(target_os = "linux")]
#[test]
#[serial]
fn test_copy_without_display_reports_clipboard_unavailable() {
  let temp = assert_fs::TempDir::new().unwrap();
  seed_history(
    &temp,
    r#"[{"prompt":"moths","text":"Moths love lamps.","image":"","posted":false,"editing":false,"time":"22:10"}]"#,
  );

  studio_cmd(&temp, UNREACHABLE_BACKEND)
    .env_remove("DISPLAY")
    .env_remove("WAYLAND_DISPLAY")
    .args(["copy", "0"])
    .assert()
    .failure()
    .stderr(contains("Clipboard unavailable"));

  temp.close().unwrap();
}
