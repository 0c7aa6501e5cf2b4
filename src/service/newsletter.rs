//! This module implements newsletter dispatch.
//!
//! A dispatch validates its input, resolves the recipient set, checks the
//! transport once, then sends to each recipient in turn. Sends are strictly
//! sequential; one failing recipient never aborts the rest of the list.

use crate::service::mailer::Mailer;
use crate::service::subscriber::{StoreError, SubscriberStore};
use tracing::error;

/// The targeting mode of a send job.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum SendMode {
	/// Send to the full active subscriber list.
	Broadcast,
	/// Send to a single caller-supplied address, bypassing the store.
	Test,
}

/// A newsletter send job. Exists only for the duration of one dispatch.
pub struct SendJob {
	/// The message subject.
	pub subject: String,
	/// The HTML body.
	pub html: String,
	/// The targeting mode.
	pub mode: SendMode,
	/// The recipient for [`SendMode::Test`].
	pub test_recipient: Option<String>,
}

/// The tally of one dispatch.
#[derive(Debug, Default)]
pub struct DispatchReport {
	/// Recipients that accepted the message.
	pub sent: usize,
	/// Recipients that failed.
	pub failed: usize,
	/// One formatted entry per failed recipient.
	pub errors: Vec<String>,
}

impl DispatchReport {
	/// A dispatch counts as delivered as soon as one recipient got the
	/// message. Callers must read `failed` and `errors` to learn about
	/// partial failure.
	pub fn delivered(&self) -> bool {
		self.sent > 0
	}
}

/// An error preventing a dispatch from starting.
///
/// Once the per-recipient loop has begun, failures are tallied in the report
/// instead of being raised here.
#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
	/// Subject or content is empty.
	#[error("{0} is required")]
	Validation(&'static str),
	/// Test mode without a recipient address.
	#[error("test mode requires a recipient address")]
	MissingTestRecipient,
	/// Broadcast mode found nobody to send to.
	#[error("no active subscribers found")]
	NoRecipients,
	/// The transport failed its configuration check; nobody was contacted.
	#[error("email transport is not configured or not working")]
	Configuration,
	/// The subscriber list could not be fetched.
	#[error(transparent)]
	Store(#[from] StoreError),
}

/// Runs a send job against the given gateways and returns the tally.
pub async fn dispatch<M: Mailer>(
	store: &SubscriberStore,
	mailer: &M,
	job: &SendJob,
) -> Result<DispatchReport, DispatchError> {
	if job.subject.trim().is_empty() {
		return Err(DispatchError::Validation("subject"));
	}
	if job.html.trim().is_empty() {
		return Err(DispatchError::Validation("content"));
	}

	let recipients = match job.mode {
		SendMode::Test => {
			let recipient = job
				.test_recipient
				.clone()
				.ok_or(DispatchError::MissingTestRecipient)?;
			vec![recipient]
		}
		SendMode::Broadcast => store
			.list_active()
			.await?
			.into_iter()
			.map(|s| s.email)
			.collect(),
	};
	if recipients.is_empty() {
		return Err(DispatchError::NoRecipients);
	}

	// A broken transport must send to nobody
	if !mailer.verify().await {
		return Err(DispatchError::Configuration);
	}

	Ok(send_each(mailer, &job.subject, &job.html, &recipients).await)
}

/// Sends the message to each recipient in turn, tallying the outcome.
async fn send_each<M: Mailer>(
	mailer: &M,
	subject: &str,
	html: &str,
	recipients: &[String],
) -> DispatchReport {
	let mut report = DispatchReport::default();
	for to in recipients {
		match mailer.send(to, subject, html).await {
			Ok(()) => report.sent += 1,
			Err(err) => {
				error!(error = %err, recipient = %to, "newsletter: send failed");
				report.failed += 1;
				report.errors.push(format!("Failed to send to {to}: {err}"));
			}
		}
	}
	report
}
