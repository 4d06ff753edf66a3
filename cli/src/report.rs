// Copyright (C) 2024 Daniel Mueller <deso@posteo.net>
// SPDX-License-Identifier: GPL-3.0-or-later

use std::fs::OpenOptions;
use std::io;
use std::io::Write;
use std::path::Path;
use std::sync::Mutex;

use tracing_subscriber::fmt::writer::BoxMakeWriter;


/// The target used for events logging the outcome of an invocation.
///
/// Events for this target are always enabled.
pub(crate) const OUTCOME_TARGET: &str = "automailer::outcome";


/// The final outcome of a program invocation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Outcome {
  /// The email was accepted for delivery.
  Sent,
  /// Fewer than two positional arguments were provided.
  MissingArguments,
  /// The file to send does not exist.
  FileNotFound,
  /// The recipient is not a valid email address.
  InvalidEmail,
  /// The configuration could not be opened or parsed.
  ConfigLoadFailure,
  /// Composing or delivering the email failed.
  SendError,
}

impl Outcome {
  /// The user facing message for the outcome.
  pub fn message(self) -> &'static str {
    match self {
      Self::Sent => "E-mail sent successfully.",
      Self::MissingArguments => {
        "Too few parameters. Usage: automailer <file-path> <email-address>"
      },
      Self::FileNotFound => "Error: specified file does not exist.",
      Self::InvalidEmail => "Error: invalid e-mail address.",
      Self::ConfigLoadFailure => "Error: failed to load configuration.",
      Self::SendError => "Error: failed to send e-mail.",
    }
  }

  /// The process exit status for the outcome.
  pub fn exit_code(self) -> u8 {
    match self {
      Self::Sent => 0,
      Self::MissingArguments
      | Self::FileNotFound
      | Self::InvalidEmail
      | Self::ConfigLoadFailure
      | Self::SendError => 1,
    }
  }
}


/// Print the user facing message for `outcome` to `out`.
pub(crate) fn report<W>(out: &mut W, outcome: Outcome)
where
  W: Write,
{
  // There is nobody left to tell about a broken stdout.
  let _result = writeln!(out, "{}", outcome.message());
}


/// Open the log file at `path` for appending, creating it if necessary.
///
/// If the file cannot be opened, log messages are discarded.
pub(crate) fn log_writer(path: &Path) -> BoxMakeWriter {
  match OpenOptions::new().create(true).append(true).open(path) {
    Ok(file) => BoxMakeWriter::new(Mutex::new(file)),
    Err(_err) => BoxMakeWriter::new(io::sink),
  }
}
