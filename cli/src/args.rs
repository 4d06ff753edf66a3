// Copyright (C) 2024 Daniel Mueller <deso@posteo.net>
// SPDX-License-Identifier: GPL-3.0-or-later

use std::ffi::OsString;
use std::path::PathBuf;

use clap::ArgAction;
use clap::Parser;


/// The configuration file used when none is provided.
pub(crate) const DEFAULT_CONFIG: &str = "config.json";
/// The log file used when none is provided.
pub(crate) const DEFAULT_LOG_FILE: &str = "automailer.log";


/// A program for sending a file as an email attachment.
#[derive(Debug, Parser)]
#[clap(version = env!("VERSION"))]
pub(crate) struct Args {
  /// The path to the file to send.
  pub file: Option<PathBuf>,
  /// The email address of the recipient.
  pub recipient: Option<String>,
  /// Additional arguments; ignored.
  #[clap(hide = true)]
  pub extra: Vec<OsString>,
  /// The path to the configuration file.
  #[clap(short, long, default_value = DEFAULT_CONFIG)]
  pub config: PathBuf,
  /// The path to the file to append log messages to.
  #[clap(long, default_value = DEFAULT_LOG_FILE)]
  pub log_file: PathBuf,
  /// Increase verbosity (can be supplied multiple times).
  #[clap(short = 'v', long = "verbose", global = true, action = ArgAction::Count)]
  pub verbosity: u8,
}
