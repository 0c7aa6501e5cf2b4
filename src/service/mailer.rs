//! This module implements the email transport.

use crate::config::EmailConfig;
use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::{Credentials, Mechanism};
use lettre::transport::smtp::PoolConfig;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use serde::Serialize;

/// An error from the email transport.
#[derive(Debug, thiserror::Error)]
pub enum MailError {
	/// The email section is absent from the configuration.
	#[error("email transport is not configured")]
	Unconfigured,
	/// The recipient or sender address could not be parsed.
	#[error("invalid address: {0}")]
	Address(#[from] lettre::address::AddressError),
	/// The message could not be assembled.
	#[error(transparent)]
	Compose(#[from] lettre::error::Error),
	/// The relay refused or failed the operation.
	#[error("{0}")]
	Transport(String),
}

/// The transport's configuration report, as shown on the admin dashboard.
#[derive(Debug, Serialize)]
pub struct EmailStatus {
	pub configured: bool,
	pub host: String,
	pub user: String,
	pub from: String,
}

/// A transactional email transport.
///
/// The trait seam lets the dispatch pipeline run against a mock transport in
/// tests; the production implementation is [`SmtpMailer`].
#[async_trait]
pub trait Mailer {
	/// Checks connectivity and authentication against the relay, without
	/// sending anything.
	async fn verify(&self) -> bool;

	/// Sends one HTML message to the given recipient.
	async fn send(&self, to: &str, subject: &str, html: &str) -> Result<(), MailError>;
}

/// SMTP-backed mailer.
pub enum SmtpMailer {
	/// The email section is absent from the configuration.
	Unconfigured,
	/// A ready transport.
	Ready {
		transport: AsyncSmtpTransport<Tokio1Executor>,
		/// The sender identity put on every message.
		from: Mailbox,
		host: String,
		login: String,
	},
}

impl SmtpMailer {
	/// Builds a mailer from the optional configuration section.
	pub fn from_config(config: Option<&EmailConfig>) -> Result<Self, MailError> {
		let Some(config) = config else {
			return Ok(Self::Unconfigured);
		};
		let from: Mailbox = config.from.parse()?;
		let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.host)
			.map_err(|error| MailError::Transport(error.to_string()))?
			.credentials(Credentials::new(
				config.login.clone(),
				config.password.clone(),
			))
			.authentication(vec![Mechanism::Login])
			.pool_config(PoolConfig::new().max_size(20))
			.build();
		Ok(Self::Ready {
			transport,
			from,
			host: config.host.clone(),
			login: config.login.clone(),
		})
	}

	/// Returns the configuration report for the admin dashboard.
	pub fn status(&self) -> EmailStatus {
		match self {
			Self::Unconfigured => EmailStatus {
				configured: false,
				host: "Not configured".to_owned(),
				user: "Not configured".to_owned(),
				from: "Not configured".to_owned(),
			},
			Self::Ready {
				host, login, from, ..
			} => EmailStatus {
				configured: true,
				host: host.clone(),
				user: login.clone(),
				from: from.to_string(),
			},
		}
	}
}

#[async_trait]
impl Mailer for SmtpMailer {
	async fn verify(&self) -> bool {
		match self {
			Self::Unconfigured => false,
			Self::Ready { transport, .. } => transport.test_connection().await.unwrap_or(false),
		}
	}

	async fn send(&self, to: &str, subject: &str, html: &str) -> Result<(), MailError> {
		let Self::Ready {
			transport, from, ..
		} = self
		else {
			return Err(MailError::Unconfigured);
		};
		let message = Message::builder()
			.from(from.clone())
			.to(to.parse()?)
			.subject(subject)
			.header(ContentType::TEXT_HTML)
			.body(html.to_owned())?;
		transport
			.send(message)
			.await
			.map_err(|error| MailError::Transport(error.to_string()))?;
		Ok(())
	}
}
