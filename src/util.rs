//! Module implementing utilities.

use lazy_static::lazy_static;
use regex::Regex;

/// An object that can be instanciated from a SQL row.
pub trait FromRow {
	/// Creates an object from the given SQL row.
	///
	/// If the given row is invalid, the function panics.
	fn from_row(row: &tokio_postgres::Row) -> Self
	where
		Self: Sized;
}

/// Module handling serialization/deserialization of dates.
pub mod serde_date_time {
	use chrono::{DateTime, NaiveDateTime, Utc};
	use serde::{Deserialize, Deserializer, Serializer};

	/// Serialization format.
	pub const FORMAT: &str = "%Y-%m-%d %H:%M:%S";

	/// Serialize
	pub fn serialize<S>(date: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
	where
		S: Serializer,
	{
		let s = format!("{}", date.format(FORMAT));
		serializer.serialize_str(&s)
	}

	/// Deserialize
	pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
	where
		D: Deserializer<'de>,
	{
		let s = String::deserialize(deserializer)?;
		let dt = NaiveDateTime::parse_from_str(&s, FORMAT).map_err(serde::de::Error::custom)?;
		Ok(DateTime::<Utc>::from_naive_utc_and_offset(dt, Utc))
	}
}

lazy_static! {
	/// Email validation regex.
	static ref EMAIL_VALIDATION: Regex = Regex::new(r"^[a-zA-Z0-9.!#$%&'*+/=?^_`{|}~-]+@[a-zA-Z0-9-]+(?:\.[a-zA-Z0-9-]+)*$").unwrap();
}

/// Tells whether the given email is valid.
pub fn validate_email(email: &str) -> bool {
	EMAIL_VALIDATION.is_match(email)
}

/// Normalizes an email address for storage and comparison.
///
/// The store's uniqueness constraint applies to the normalized form, so every
/// operation must go through this function before touching the store.
pub fn normalize_email(email: &str) -> String {
	email.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn valid_emails() {
		assert!(validate_email("user@example.com"));
		assert!(validate_email("first.last+tag@sub.example.co"));
	}

	#[test]
	fn invalid_emails() {
		assert!(!validate_email(""));
		assert!(!validate_email("no-at-sign"));
		assert!(!validate_email("spaces in@example.com"));
		assert!(!validate_email("user@"));
	}

	#[test]
	fn normalization_trims_and_lowercases() {
		assert_eq!(normalize_email("  User@Example.COM "), "user@example.com");
		assert_eq!(normalize_email("plain@example.com"), "plain@example.com");
	}
}
