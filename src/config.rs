// Copyright (C) 2024 Daniel Mueller <deso@posteo.net>
// SPDX-License-Identifier: GPL-3.0-or-later

use std::borrow::Cow;
use std::env::current_dir;
use std::error::Error as StdError;
use std::fmt::Debug;
use std::fmt::Display;
use std::fmt::Formatter;
use std::fmt::Result as FmtResult;
use std::io;
use std::path::Path;
use std::path::PathBuf;

use serde::de::Error as _;
use serde::Deserialize;
use serde::Deserializer;
use serde_json::Deserializer as JsonDeserializer;

use tokio::fs::read;


/// The SMTP settings used for sending an email.
///
/// Fields missing from the JSON representation or set to `null` default
/// to their empty value.
#[derive(Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Config {
  /// The hostname of the SMTP server.
  #[serde(deserialize_with = "null_as_default")]
  pub smtp_host: String,
  /// The port of the SMTP server.
  ///
  /// The value is checked for being a valid port number only once a
  /// connection is attempted.
  #[serde(deserialize_with = "null_as_default")]
  pub smtp_port: i64,
  /// The user to log in as.
  #[serde(deserialize_with = "null_as_default")]
  pub username: String,
  /// The password to use for logging in.
  #[serde(deserialize_with = "null_as_default")]
  pub password: String,
  /// The "From" identifier to use.
  #[serde(deserialize_with = "null_as_default")]
  pub from: String,
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
  D: Deserializer<'de>,
  T: Default + Deserialize<'de>,
{
  Option::<T>::deserialize(deserializer).map(Option::unwrap_or_default)
}

impl Debug for Config {
  fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
    let Self {
      smtp_host,
      smtp_port,
      username,
      password: _,
      from,
    } = self;

    f.debug_struct("Config")
      .field("smtp_host", smtp_host)
      .field("smtp_port", smtp_port)
      .field("username", username)
      .field("password", &"<redacted>")
      .field("from", from)
      .finish()
  }
}


/// An error reported when loading a [`Config`].
#[derive(Debug)]
pub enum ConfigError {
  /// The configuration file could not be opened or read.
  Open { path: PathBuf, source: io::Error },
  /// The file contents are not a valid JSON configuration.
  Parse {
    path: PathBuf,
    source: serde_json::Error,
  },
}

impl ConfigError {
  /// Retrieve the path of the configuration file in question.
  pub fn path(&self) -> &Path {
    match self {
      Self::Open { path, .. } | Self::Parse { path, .. } => path,
    }
  }
}

impl Display for ConfigError {
  fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
    match self {
      Self::Open { path, source } => write!(
        f,
        "failed to read configuration file `{}`: {source}",
        path.display()
      ),
      Self::Parse { path, source } => write!(
        f,
        "failed to parse `{}` contents as JSON: {source}",
        path.display()
      ),
    }
  }
}

impl StdError for ConfigError {}


/// Load the configuration stored at `path`.
///
/// Relative paths are resolved against the current working directory.
/// Only the first JSON value in the file is considered; a `null`
/// document yields an all-empty configuration.
pub async fn load_config(path: &Path) -> Result<Config, ConfigError> {
  let path = if path.is_absolute() {
    Cow::Borrowed(path)
  } else {
    let dir = current_dir().map_err(|source| ConfigError::Open {
      path: path.to_path_buf(),
      source,
    })?;
    Cow::Owned(dir.join(path))
  };

  let data = read(&path).await.map_err(|source| ConfigError::Open {
    path: path.to_path_buf(),
    source,
  })?;
  let config = JsonDeserializer::from_slice(&data)
    .into_iter::<Option<Config>>()
    .next()
    .unwrap_or_else(|| Err(serde_json::Error::custom("configuration file is empty")))
    .map_err(|source| ConfigError::Parse {
      path: path.to_path_buf(),
      source,
    })?;
  Ok(config.unwrap_or_default())
}


#[cfg(test)]
mod tests {
  use super::*;

  use std::fs::write;

  use tempfile::tempdir;
  use tokio::test;


  /// Check that we can load a complete configuration.
  #[test]
  async fn load_complete() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("config.json");
    let json = r#"{
      "smtp_host": "smtp.example.com",
      "smtp_port": 587,
      "username": "user",
      "password": "secret",
      "from": "Sender <sender@example.com>"
    }"#;
    let () = write(&path, json).unwrap();

    let config = load_config(&path).await.unwrap();
    let expected = Config {
      smtp_host: "smtp.example.com".to_string(),
      smtp_port: 587,
      username: "user".to_string(),
      password: "secret".to_string(),
      from: "Sender <sender@example.com>".to_string(),
    };
    assert_eq!(config, expected);
  }

  /// Make sure that missing fields are defaulted instead of rejected.
  #[test]
  async fn load_partial() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("config.json");
    let () = write(&path, r#"{"smtp_host": "localhost"}"#).unwrap();

    let config = load_config(&path).await.unwrap();
    assert_eq!(config.smtp_host, "localhost");
    assert_eq!(config.smtp_port, 0);
    assert_eq!(config.username, "");
    assert_eq!(config.from, "");
  }

  /// Check that a missing file is reported as an open error.
  #[test]
  async fn load_missing() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("config.json");

    let err = load_config(&path).await.unwrap_err();
    assert!(matches!(err, ConfigError::Open { .. }), "{err:?}");
    assert_eq!(err.path(), path);
  }

  /// Check that malformed JSON is reported as a parse error.
  #[test]
  async fn load_malformed() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("config.json");
    let () = write(&path, "{ smtp_host: ").unwrap();

    let err = load_config(&path).await.unwrap_err();
    assert!(matches!(err, ConfigError::Parse { .. }), "{err:?}");
    assert!(err.to_string().contains("as JSON"));

    // A value of the wrong type is a parse error, too.
    let () = write(&path, r#"{"smtp_port": "twenty-five"}"#).unwrap();
    let err = load_config(&path).await.unwrap_err();
    assert!(matches!(err, ConfigError::Parse { .. }), "{err:?}");
  }

  /// Check that `null` values are treated like missing ones.
  #[test]
  async fn load_null_fields() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("config.json");
    let json = r#"{"smtp_host": "localhost", "smtp_port": null, "username": null}"#;
    let () = write(&path, json).unwrap();

    let config = load_config(&path).await.unwrap();
    assert_eq!(config.smtp_host, "localhost");
    assert_eq!(config.smtp_port, 0);
    assert_eq!(config.username, "");
  }

  /// A `null` document is an empty configuration.
  #[test]
  async fn load_null_document() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("config.json");
    let () = write(&path, "null").unwrap();

    let config = load_config(&path).await.unwrap();
    assert_eq!(config, Config::default());
  }

  /// Check that anything following the first JSON value is ignored.
  #[test]
  async fn load_trailing_data() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("config.json");
    let () = write(&path, "{\"smtp_host\": \"localhost\"}\n}garbage").unwrap();

    let config = load_config(&path).await.unwrap();
    assert_eq!(config.smtp_host, "localhost");
  }

  /// An empty file does not contain a configuration.
  #[test]
  async fn load_empty() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("config.json");
    let () = write(&path, " \n").unwrap();

    let err = load_config(&path).await.unwrap_err();
    assert!(matches!(err, ConfigError::Parse { .. }), "{err:?}");
  }

  /// Make sure that the password does not show up in debug output.
  #[test]
  async fn debug_redacts_password() {
    let config = Config {
      password: "hunter2".to_string(),
      ..Default::default()
    };
    let debug = format!("{config:?}");
    assert!(!debug.contains("hunter2"), "{debug}");
    assert!(debug.contains("<redacted>"), "{debug}");
  }
}
