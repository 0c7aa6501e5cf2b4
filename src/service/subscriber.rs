//! This module implements the newsletter subscriber store.

use crate::util::{self, FromRow};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tokio_postgres::error::SqlState;
use tokio_postgres::Row;
use uuid::Uuid;

/// The lifecycle status of a subscriber.
///
/// Subscribers are never hard-deleted; unsubscribing flips the status.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SubscriberStatus {
	Active,
	Unsubscribed,
}

impl SubscriberStatus {
	pub fn as_str(self) -> &'static str {
		match self {
			Self::Active => "active",
			Self::Unsubscribed => "unsubscribed",
		}
	}
}

/// A newsletter subscriber.
#[derive(Clone, Deserialize, Serialize)]
pub struct Subscriber {
	/// The subscriber's id.
	pub id: Uuid,
	/// The registered email, normalized.
	pub email: String,
	/// The date at which the user subscribed.
	#[serde(with = "util::serde_date_time")]
	pub created_at: DateTime<Utc>,
	/// The signup channel, e.g. `website`.
	pub source: String,
	/// The lifecycle status.
	pub status: SubscriberStatus,
}

impl FromRow for Subscriber {
	fn from_row(row: &Row) -> Self {
		let status: String = row.get("status");
		Self {
			id: row.get("id"),
			email: row.get("email"),
			created_at: row.get("created_at"),
			source: row.get("source"),
			status: match status.as_str() {
				"unsubscribed" => SubscriberStatus::Unsubscribed,
				_ => SubscriberStatus::Active,
			},
		}
	}
}

/// The outcome of a subscribe request.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum SubscribeOutcome {
	/// A new subscriber row has been created.
	Created,
	/// The email was already registered. Treated as a success so that a
	/// repeat signup stays idempotent for the visitor.
	AlreadySubscribed,
}

/// An error from the subscriber store.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
	/// The store has no configuration.
	#[error("subscriber store is not configured")]
	Unconfigured,
	/// The underlying database failed.
	#[error(transparent)]
	Postgres(#[from] tokio_postgres::Error),
}

/// Gateway to the external row store holding subscriber records.
///
/// The client is swapped behind the lock by the reconnection task when the
/// database connection drops.
pub enum SubscriberStore {
	/// The store section is absent from the configuration.
	Unconfigured,
	/// The store is reachable through the contained client.
	Connected(RwLock<tokio_postgres::Client>),
}

impl SubscriberStore {
	/// Creates a store from a connected client.
	pub fn connected(client: tokio_postgres::Client) -> Self {
		Self::Connected(RwLock::new(client))
	}

	fn client(&self) -> Result<&RwLock<tokio_postgres::Client>, StoreError> {
		match self {
			Self::Unconfigured => Err(StoreError::Unconfigured),
			Self::Connected(client) => Ok(client),
		}
	}

	/// Replaces the inner client after a reconnection.
	///
	/// Does nothing on an unconfigured store.
	pub async fn replace_client(&self, client: tokio_postgres::Client) {
		if let Self::Connected(lock) = self {
			*lock.write().await = client;
		}
	}

	/// Registers a subscriber with the given email and source.
	///
	/// The email is normalized first. A duplicate registration is reported as
	/// [`SubscribeOutcome::AlreadySubscribed`], not as an error.
	pub async fn add(&self, email: &str, source: &str) -> Result<SubscribeOutcome, StoreError> {
		let client = self.client()?.read().await;
		let email = util::normalize_email(email);
		let status = SubscriberStatus::Active.as_str();
		let res = client
			.execute(
				"INSERT INTO newsletter_subscriber (id, email, source, status, created_at)\
					VALUES ($1, $2, $3, $4, $5)",
				&[&Uuid::new_v4(), &email, &source, &status, &Utc::now()],
			)
			.await;
		match res {
			Ok(_) => Ok(SubscribeOutcome::Created),
			Err(error) if error.code() == Some(&SqlState::UNIQUE_VIOLATION) => {
				Ok(SubscribeOutcome::AlreadySubscribed)
			}
			Err(error) => Err(error.into()),
		}
	}

	/// Returns the list of active subscribers, newest first.
	pub async fn list_active(&self) -> Result<Vec<Subscriber>, StoreError> {
		let client = self.client()?.read().await;
		let status = SubscriberStatus::Active.as_str();
		let rows = client
			.query(
				"SELECT * FROM newsletter_subscriber WHERE status = $1 ORDER BY created_at DESC",
				&[&status],
			)
			.await?;
		Ok(rows.iter().map(Subscriber::from_row).collect())
	}

	/// Marks the subscriber with the given email as unsubscribed.
	///
	/// Returns `true` if a row was updated, `false` if the email is unknown.
	pub async fn unsubscribe(&self, email: &str) -> Result<bool, StoreError> {
		let client = self.client()?.read().await;
		let email = util::normalize_email(email);
		let status = SubscriberStatus::Unsubscribed.as_str();
		let n = client
			.execute(
				"UPDATE newsletter_subscriber SET status = $1 WHERE email = $2",
				&[&status, &email],
			)
			.await?;
		Ok(n > 0)
	}
}
