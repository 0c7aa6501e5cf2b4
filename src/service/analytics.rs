//! This module computes subscriber analytics.
//!
//! The snapshot is derived on demand from the full subscriber list and is
//! never cached or persisted.

use crate::service::subscriber::{Subscriber, SubscriberStatus};
use chrono::{DateTime, Duration, Timelike, Utc};
use serde::Serialize;

/// The number of days covered by the daily signup histogram.
const DAY_WINDOW: i64 = 30;

/// Signup count for one calendar day.
#[derive(Debug, Serialize)]
pub struct DayCount {
	/// The day, as `YYYY-MM-DD`.
	pub date: String,
	pub count: u32,
}

/// Signup count for one source tag.
#[derive(Debug, Serialize)]
pub struct SourceCount {
	/// The raw source string, not normalized.
	pub source: String,
	pub count: u32,
}

/// Signup count for one hour of the day.
#[derive(Debug, Serialize)]
pub struct HourCount {
	/// The hour, `0..=23`.
	pub hour: u8,
	pub count: u32,
}

/// Derived subscriber metrics.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsSnapshot {
	pub total_subscribers: usize,
	pub active_subscribers: usize,
	pub unsubscribed: usize,
	/// Daily signup counts over the trailing 30 days, zero-filled, oldest
	/// first. Signups older than the window are excluded.
	pub signups_by_day: Vec<DayCount>,
	/// Signup counts by source, sorted by descending count. Ties keep the
	/// order in which sources were first encountered.
	pub signups_by_source: Vec<SourceCount>,
	/// Signup counts by hour of day over the entire input set. Unlike the
	/// daily histogram, this one is not windowed.
	pub signups_by_hour: Vec<HourCount>,
	/// Week-over-week signup growth, in percent. `0` when the previous week
	/// had no signups.
	pub growth_rate: f64,
	/// Total signups divided by the 30-day window length.
	pub avg_daily_signups: f64,
}

/// Computes a snapshot from the given subscriber list.
///
/// `now` is the end of the observation window; dates and hours are read from
/// each subscriber's recorded UTC timestamp.
pub fn aggregate(subscribers: &[Subscriber], now: DateTime<Utc>) -> AnalyticsSnapshot {
	let total_subscribers = subscribers.len();
	let active_subscribers = subscribers
		.iter()
		.filter(|s| s.status == SubscriberStatus::Active)
		.count();
	let unsubscribed = subscribers
		.iter()
		.filter(|s| s.status == SubscriberStatus::Unsubscribed)
		.count();

	// Daily histogram, 30 calendar days ending today
	let today = now.date_naive();
	let window_start = today - Duration::days(DAY_WINDOW - 1);
	let mut signups_by_day: Vec<DayCount> = (0..DAY_WINDOW)
		.map(|i| DayCount {
			date: (window_start + Duration::days(i))
				.format("%Y-%m-%d")
				.to_string(),
			count: 0,
		})
		.collect();
	for s in subscribers {
		let date = s.created_at.date_naive();
		if date >= window_start && date <= today {
			let i = (date - window_start).num_days() as usize;
			signups_by_day[i].count += 1;
		}
	}

	// Source histogram
	let mut signups_by_source: Vec<SourceCount> = Vec::new();
	for s in subscribers {
		match signups_by_source.iter_mut().find(|c| c.source == s.source) {
			Some(entry) => entry.count += 1,
			None => signups_by_source.push(SourceCount {
				source: s.source.clone(),
				count: 1,
			}),
		}
	}
	// Stable sort keeps encounter order for equal counts
	signups_by_source.sort_by(|a, b| b.count.cmp(&a.count));

	// Hourly histogram, over the whole set
	let mut hours = [0u32; 24];
	for s in subscribers {
		hours[s.created_at.hour() as usize] += 1;
	}
	let signups_by_hour = hours
		.iter()
		.enumerate()
		.map(|(hour, count)| HourCount {
			hour: hour as u8,
			count: *count,
		})
		.collect();

	// Week-over-week growth
	let week_ago = now - Duration::days(7);
	let two_weeks_ago = now - Duration::days(14);
	let current_week = subscribers
		.iter()
		.filter(|s| s.created_at >= week_ago)
		.count();
	let previous_week = subscribers
		.iter()
		.filter(|s| s.created_at >= two_weeks_ago && s.created_at < week_ago)
		.count();
	let growth_rate = if previous_week > 0 {
		(current_week as f64 - previous_week as f64) / previous_week as f64 * 100.0
	} else {
		0.0
	};

	let avg_daily_signups = (total_subscribers as f64 / DAY_WINDOW as f64 * 100.0).round() / 100.0;

	AnalyticsSnapshot {
		total_subscribers,
		active_subscribers,
		unsubscribed,
		signups_by_day,
		signups_by_source,
		signups_by_hour,
		growth_rate,
		avg_daily_signups,
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use chrono::TimeZone;
	use uuid::Uuid;

	fn subscriber(email: &str, source: &str, created_at: DateTime<Utc>) -> Subscriber {
		Subscriber {
			id: Uuid::new_v4(),
			email: email.to_owned(),
			created_at,
			source: source.to_owned(),
			status: SubscriberStatus::Active,
		}
	}

	fn at(year: i32, month: u32, day: u32, hour: u32) -> DateTime<Utc> {
		Utc.with_ymd_and_hms(year, month, day, hour, 30, 0).unwrap()
	}

	#[test]
	fn day_histogram_is_zero_filled_and_windowed() {
		let now = at(2025, 6, 15, 12);
		let subscribers = vec![
			subscriber("a@example.com", "website", at(2025, 6, 15, 8)),
			subscriber("b@example.com", "website", at(2025, 6, 1, 9)),
			// Older than the window, excluded from the daily histogram
			subscriber("c@example.com", "website", at(2025, 1, 1, 9)),
		];
		let snapshot = aggregate(&subscribers, now);

		assert_eq!(snapshot.signups_by_day.len(), 30);
		assert_eq!(snapshot.signups_by_day[0].date, "2025-05-17");
		assert_eq!(snapshot.signups_by_day[29].date, "2025-06-15");
		assert_eq!(snapshot.signups_by_day[29].count, 1);

		let day_total: u32 = snapshot.signups_by_day.iter().map(|d| d.count).sum();
		assert_eq!(day_total, 2);
		assert!((day_total as usize) < snapshot.total_subscribers);
	}

	#[test]
	fn day_histogram_sums_to_total_when_all_recent() {
		let now = at(2025, 6, 15, 12);
		let subscribers = vec![
			subscriber("a@example.com", "website", at(2025, 6, 14, 8)),
			subscriber("b@example.com", "website", at(2025, 6, 10, 9)),
		];
		let snapshot = aggregate(&subscribers, now);
		let day_total: u32 = snapshot.signups_by_day.iter().map(|d| d.count).sum();
		assert_eq!(day_total as usize, snapshot.total_subscribers);
	}

	#[test]
	fn hour_histogram_is_not_windowed() {
		let now = at(2025, 6, 15, 12);
		let subscribers = vec![
			subscriber("a@example.com", "website", at(2025, 6, 15, 8)),
			// A year old: excluded from the daily histogram, still counted here
			subscriber("b@example.com", "website", at(2024, 6, 15, 8)),
			subscriber("c@example.com", "website", at(2025, 6, 15, 23)),
		];
		let snapshot = aggregate(&subscribers, now);

		assert_eq!(snapshot.signups_by_hour.len(), 24);
		let hour_total: u32 = snapshot.signups_by_hour.iter().map(|h| h.count).sum();
		assert_eq!(hour_total as usize, snapshot.total_subscribers);
		assert_eq!(snapshot.signups_by_hour[8].count, 2);
		assert_eq!(snapshot.signups_by_hour[23].count, 1);
	}

	#[test]
	fn source_histogram_sorts_descending() {
		let now = at(2025, 6, 15, 12);
		let subscribers = vec![
			subscriber("a@example.com", "website", at(2025, 6, 1, 8)),
			subscriber("b@example.com", "api", at(2025, 6, 2, 8)),
			subscriber("c@example.com", "website", at(2025, 6, 3, 8)),
			subscriber("d@example.com", "website", at(2025, 6, 4, 8)),
		];
		let snapshot = aggregate(&subscribers, now);

		assert_eq!(snapshot.signups_by_source.len(), 2);
		assert_eq!(snapshot.signups_by_source[0].source, "website");
		assert_eq!(snapshot.signups_by_source[0].count, 3);
		assert_eq!(snapshot.signups_by_source[1].source, "api");
		assert_eq!(snapshot.signups_by_source[1].count, 1);
	}

	#[test]
	fn source_ties_keep_encounter_order() {
		let now = at(2025, 6, 15, 12);
		let subscribers = vec![
			subscriber("a@example.com", "docs", at(2025, 6, 1, 8)),
			subscriber("b@example.com", "api", at(2025, 6, 2, 8)),
			subscriber("c@example.com", "website", at(2025, 6, 3, 8)),
			subscriber("d@example.com", "website", at(2025, 6, 4, 8)),
		];
		let snapshot = aggregate(&subscribers, now);

		assert_eq!(snapshot.signups_by_source[0].source, "website");
		// docs and api both count 1; docs was seen first
		assert_eq!(snapshot.signups_by_source[1].source, "docs");
		assert_eq!(snapshot.signups_by_source[2].source, "api");
	}

	#[test]
	fn growth_rate_is_zero_without_prior_week() {
		let now = at(2025, 6, 15, 12);
		let subscribers = vec![
			subscriber("a@example.com", "website", at(2025, 6, 14, 8)),
			subscriber("b@example.com", "website", at(2025, 6, 13, 8)),
		];
		let snapshot = aggregate(&subscribers, now);
		assert_eq!(snapshot.growth_rate, 0.0);
	}

	#[test]
	fn growth_rate_compares_weeks() {
		let now = at(2025, 6, 15, 12);
		let subscribers = vec![
			// Current week: 3 signups
			subscriber("a@example.com", "website", at(2025, 6, 14, 8)),
			subscriber("b@example.com", "website", at(2025, 6, 13, 8)),
			subscriber("c@example.com", "website", at(2025, 6, 12, 8)),
			// Previous week: 2 signups
			subscriber("d@example.com", "website", at(2025, 6, 5, 8)),
			subscriber("e@example.com", "website", at(2025, 6, 4, 8)),
		];
		let snapshot = aggregate(&subscribers, now);
		assert_eq!(snapshot.growth_rate, 50.0);
	}

	#[test]
	fn average_daily_signups_divides_by_fixed_window() {
		let now = at(2025, 6, 15, 12);
		let subscribers: Vec<_> = (0..7)
			.map(|i| subscriber(&format!("s{i}@example.com"), "website", at(2025, 6, 14, 8)))
			.collect();
		let snapshot = aggregate(&subscribers, now);
		// 7 / 30, rounded to two decimals
		assert_eq!(snapshot.avg_daily_signups, 0.23);
	}

	#[test]
	fn empty_set_yields_empty_snapshot() {
		let snapshot = aggregate(&[], at(2025, 6, 15, 12));
		assert_eq!(snapshot.total_subscribers, 0);
		assert_eq!(snapshot.growth_rate, 0.0);
		assert_eq!(snapshot.avg_daily_signups, 0.0);
		assert_eq!(snapshot.signups_by_day.len(), 30);
		assert!(snapshot.signups_by_day.iter().all(|d| d.count == 0));
		assert!(snapshot.signups_by_source.is_empty());
	}

	#[test]
	fn status_counts_split_by_lifecycle() {
		let now = at(2025, 6, 15, 12);
		let mut unsubscribed = subscriber("a@example.com", "website", at(2025, 6, 1, 8));
		unsubscribed.status = SubscriberStatus::Unsubscribed;
		let subscribers = vec![
			unsubscribed,
			subscriber("b@example.com", "website", at(2025, 6, 2, 8)),
		];
		let snapshot = aggregate(&subscribers, now);
		assert_eq!(snapshot.total_subscribers, 2);
		assert_eq!(snapshot.active_subscribers, 1);
		assert_eq!(snapshot.unsubscribed, 1);
	}
}
