// Copyright (C) 2024 Daniel Mueller <deso@posteo.net>
// SPDX-License-Identifier: GPL-3.0-or-later

#![allow(
  clippy::collapsible_if,
  clippy::fn_to_numeric_cast,
  clippy::let_and_return,
  clippy::let_unit_value
)]

mod args;
mod report;

use std::env::args_os;
use std::env::var_os;
use std::ffi::OsString;
use std::io::stdout;
use std::io::Write;
use std::process::ExitCode;

use clap::Parser as _;

use anyhow::Result;

use automailer::file_exists;
use automailer::is_valid_email;
use automailer::load_config;
use automailer::send_file;
use automailer::Config;
use automailer::SmtpTransport;
use automailer::Transport;

use tracing::debug;
use tracing::error;
use tracing::info;
use tracing::subscriber::set_default as set_default_subscriber;
use tracing::subscriber::DefaultGuard;
use tracing_subscriber::filter::EnvFilter;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::fmt::time::ChronoLocal;
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::FmtSubscriber;

use crate::args::Args;
use crate::report::log_writer;
use crate::report::report;
use crate::report::Outcome;
use crate::report::OUTCOME_TARGET;


/// Validate the inputs and send the file, mapping every failure to its
/// outcome.
///
/// `connect` creates the transport to send the email with, once all
/// inputs have been validated.
async fn run_impl<C, T>(args: Args, connect: C) -> Outcome
where
  C: FnOnce(&Config) -> Result<T>,
  T: Transport,
{
  let Args {
    file,
    recipient,
    extra: _,
    config,
    log_file: _,
    verbosity: _,
  } = args;

  let (file, recipient) = match (file, recipient) {
    (Some(file), Some(recipient)) => (file, recipient),
    _ => {
      error!(target: OUTCOME_TARGET, "{}", Outcome::MissingArguments.message());
      return Outcome::MissingArguments
    },
  };

  if !file_exists(&file) {
    error!(target: OUTCOME_TARGET, "file does not exist: {}", file.display());
    return Outcome::FileNotFound
  }

  if !is_valid_email(&recipient) {
    error!(target: OUTCOME_TARGET, "invalid email address: {recipient}");
    return Outcome::InvalidEmail
  }

  let config = match load_config(&config).await {
    Ok(config) => config,
    Err(err) => {
      error!(target: OUTCOME_TARGET, "failed to load configuration: {err}");
      return Outcome::ConfigLoadFailure
    },
  };
  debug!(?config, "loaded configuration");

  let result = match connect(&config) {
    Ok(transport) => send_file(&transport, &config, &recipient, &file).await,
    Err(err) => Err(err),
  };

  if let Err(err) = result {
    error!(target: OUTCOME_TARGET, "failed to send email: {err:#}");
    return Outcome::SendError
  }

  info!(target: OUTCOME_TARGET, "sent `{}` to {recipient}", file.display());
  Outcome::Sent
}

/// Install a subscriber writing log messages to `writer` for the
/// current thread, for as long as the returned guard lives.
///
/// Without explicitly requested verbosity, the filter directive is
/// taken from the environment.
fn setup_tracing(verbosity: u8, writer: BoxMakeWriter) -> DefaultGuard {
  // Logging problems must not get in the way of sending, so an
  // unusable directive just falls back to the default level.
  let directive = var_os(EnvFilter::DEFAULT_ENV).unwrap_or_default();
  let directive = directive.to_str().unwrap_or_default();
  setup_tracing_with(verbosity, directive, writer)
}

fn setup_tracing_with(verbosity: u8, directive: &str, writer: BoxMakeWriter) -> DefaultGuard {
  let builder = FmtSubscriber::builder()
    .with_timer(ChronoLocal::new("%Y-%m-%dT%H:%M:%S%.3f%:z".to_string()))
    .with_ansi(false)
    .with_writer(writer);

  if verbosity != 0 {
    let level = match verbosity {
      1 => LevelFilter::DEBUG,
      _ => LevelFilter::TRACE,
    };
    let subscriber = builder.with_max_level(level).finish();
    set_default_subscriber(subscriber)
  } else {
    let directive = if directive.is_empty() {
      "info"
    } else {
      directive
    };
    // Outcomes are logged no matter what the user asked for.
    let directive = format!("{directive},{OUTCOME_TARGET}=info");
    let subscriber = builder.with_env_filter(EnvFilter::new(directive)).finish();
    set_default_subscriber(subscriber)
  }
}


/// Run the program and report the outcome, if any.
async fn run<A, T, W>(args: A, out: &mut W) -> Result<ExitCode>
where
  A: IntoIterator<Item = T>,
  T: Into<OsString> + Clone,
  W: Write,
{
  let args = match Args::try_parse_from(args) {
    Ok(args) => args,
    Err(err) => match err.kind() {
      clap::error::ErrorKind::DisplayHelp | clap::error::ErrorKind::DisplayVersion => {
        let _result = write!(out, "{err}");
        return Ok(ExitCode::SUCCESS)
      },
      _ => return Err(err.into()),
    },
  };

  let _guard = setup_tracing(args.verbosity, log_writer(&args.log_file));
  let outcome = run_impl(args, SmtpTransport::new).await;
  let () = report(out, outcome);

  Ok(ExitCode::from(outcome.exit_code()))
}


#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<ExitCode> {
  run(args_os(), &mut stdout()).await
}
