// Copyright (C) 2024 Daniel Mueller <deso@posteo.net>
// SPDX-License-Identifier: GPL-3.0-or-later

#![allow(
  clippy::collapsible_else_if,
  clippy::collapsible_if,
  clippy::fn_to_numeric_cast,
  clippy::let_and_return,
  clippy::let_unit_value
)]
#![cfg_attr(docsrs, feature(doc_cfg))]

mod config;
mod transport;
mod validate;

use std::path::Path;

use anyhow::Context as _;
use anyhow::Result;

use lettre::message::header::ContentType;
use lettre::message::Attachment;
use lettre::message::Mailbox;
use lettre::message::MultiPart;
use lettre::message::SinglePart;

use tokio::fs::read;

pub use lettre::Message;

pub use crate::config::load_config;
pub use crate::config::Config;
pub use crate::config::ConfigError;
pub use crate::transport::SmtpTransport;
pub use crate::transport::Transport;
pub use crate::validate::file_exists;
pub use crate::validate::is_valid_email;


/// The subject used for every email.
pub const SUBJECT: &str = "Automatic file sent";
/// The plain text body accompanying the attachment.
pub const BODY: &str = "See attachment.";


/// Create the attachment part for the file at `path`.
async fn attachment(path: &Path) -> Result<SinglePart> {
  let data = read(path)
    .await
    .with_context(|| format!("failed to read attachment `{}`", path.display()))?;
  let name = path
    .file_name()
    .map(|name| name.to_string_lossy().to_string())
    .with_context(|| format!("attachment path `{}` has no file name", path.display()))?;
  let mime = mime_guess::from_path(path).first_or_octet_stream();
  let content_type = ContentType::parse(mime.essence_str())
    .with_context(|| format!("failed to parse content type specification `{mime}`"))?;

  Ok(Attachment::new(name).body(data, content_type))
}

/// Compose the email carrying the file at `path` to `recipient`.
pub async fn compose(config: &Config, recipient: &str, path: &Path) -> Result<Message> {
  let from = config
    .from
    .parse::<Mailbox>()
    .with_context(|| format!("failed to parse 'From' specification: `{}`", config.from))?;
  let to = recipient
    .parse::<Mailbox>()
    .with_context(|| format!("failed to parse 'To' specification: `{recipient}`"))?;
  let attachment = attachment(path).await?;

  let parts = MultiPart::mixed()
    .singlepart(SinglePart::plain(BODY.to_string()))
    .singlepart(attachment);

  let email = Message::builder()
    .from(from)
    .to(to)
    .subject(SUBJECT)
    .multipart(parts)
    .context("failed to create email message")?;
  Ok(email)
}

/// Send the file at `path` as an attachment to `recipient`, using the
/// provided transport.
///
/// The file is read as part of this operation. A single delivery
/// attempt is made.
#[cfg_attr(
  feature = "tracing",
  tracing::instrument(skip_all, fields(recipient = recipient, path = %path.display()))
)]
pub async fn send_file<T>(transport: &T, config: &Config, recipient: &str, path: &Path) -> Result<()>
where
  T: Transport,
{
  let email = compose(config, recipient, path).await?;
  #[cfg(feature = "tracing")]
  tracing::debug!(from = %config.from, "composed email");

  transport.send(email).await
}
