// Copyright (C) 2024 Daniel Mueller <deso@posteo.net>
// SPDX-License-Identifier: GPL-3.0-or-later

use std::fmt::Debug;
use std::fmt::Formatter;
use std::fmt::Result as FmtResult;

use anyhow::Context as _;
use anyhow::Result;

use lettre::transport::smtp::authentication::Credentials;
use lettre::transport::smtp::client::Tls;
use lettre::transport::smtp::client::TlsParameters;
use lettre::AsyncSmtpTransport;
use lettre::AsyncTransport as _;
use lettre::Message;
use lettre::Tokio1Executor;

use crate::config::Config;


/// The port on which SMTP servers conventionally expect implicit TLS.
const SMTPS_PORT: u16 = 465;


/// A means for delivering a fully composed email.
#[allow(async_fn_in_trait)]
pub trait Transport {
  /// Deliver `email`, returning once it got accepted or rejected.
  async fn send(&self, email: Message) -> Result<()>;
}


/// The SMTP "mode" to use.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum SmtpMode {
  /// Upgrade the connection via STARTTLS if the server supports it.
  OpportunisticStartTls,
  /// Use full TLS mode.
  Tls,
}

impl SmtpMode {
  fn for_port(port: u16) -> Self {
    if port == SMTPS_PORT {
      Self::Tls
    } else {
      Self::OpportunisticStartTls
    }
  }
}


/// A [`Transport`] delivering emails to an SMTP server.
pub struct SmtpTransport {
  host: String,
  port: u16,
  inner: AsyncSmtpTransport<Tokio1Executor>,
}

impl SmtpTransport {
  /// Create an authenticated SMTP transport as described by `config`.
  ///
  /// No connection is established at this point.
  pub fn new(config: &Config) -> Result<Self> {
    let host = config.smtp_host.as_str();
    let port = u16::try_from(config.smtp_port)
      .with_context(|| format!("SMTP port {} is out of range", config.smtp_port))?;
    let creds = Credentials::new(config.username.clone(), config.password.clone());

    let inner = match SmtpMode::for_port(port) {
      SmtpMode::Tls => AsyncSmtpTransport::<Tokio1Executor>::relay(host)
        .context("failed to create TLS SMTP mailer")?
        .port(port)
        .credentials(creds)
        .build(),
      SmtpMode::OpportunisticStartTls => {
        let params = TlsParameters::new(host.to_string())
          .context("failed to create TLS parameters for STARTTLS SMTP mailer")?;
        AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(host)
          .port(port)
          .tls(Tls::Opportunistic(params))
          .credentials(creds)
          .build()
      },
    };

    let slf = Self {
      host: host.to_string(),
      port,
      inner,
    };
    Ok(slf)
  }
}

impl Debug for SmtpTransport {
  fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
    f.debug_struct("SmtpTransport")
      .field("host", &self.host)
      .field("port", &self.port)
      .finish_non_exhaustive()
  }
}

impl Transport for SmtpTransport {
  async fn send(&self, email: Message) -> Result<()> {
    let _response = self
      .inner
      .send(email)
      .await
      .with_context(|| format!("failed to send email via {}:{}", self.host, self.port))?;
    Ok(())
  }
}
