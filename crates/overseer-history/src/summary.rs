//! Time-bucketed activity summaries for the dashboard.
//!
//! [`HistorySummaries`] rolls per-month record counts into trailing 5-month
//! windows. A window offset of 0 ends at the present month; each step back
//! shifts the window by a full 5 months. The store only reports months that
//! have activity, so the summary layer rebuilds the full calendar grid and
//! fills the quiet months with zero counts.
//!
//! The month arithmetic is calendar subtraction with year rollover: one
//! month before January is December of the prior year.

use chrono::{DateTime, Datelike, Utc};
use serde::{Deserialize, Serialize};

use overseer_core::{OverseerError, OverseerResult, StoreErrorKind};

use crate::record::HistoryRecord;
use crate::store::{HistoryStore, MonthCount};

/// The number of months in one summary window.
pub const WINDOW_MONTHS: u32 = 5;

/// One slot of a summary window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthBucket {
    /// The calendar year.
    pub year: i32,
    /// The calendar month, 1-12.
    pub month: u32,
    /// Number of history records in that month; 0 when none.
    pub count: u64,
}

/// Resolves the calendar (year, month) a number of months before `now`.
///
/// Negative `months` moves forward. Only the year/month pair matters here;
/// days never participate in window math.
fn months_ago(now: DateTime<Utc>, months: i32) -> (i32, u32) {
    let total = now.year() * 12 + i32::try_from(now.month()).unwrap_or(1) - 1 - months;
    let year = total.div_euclid(12);
    let month = u32::try_from(total.rem_euclid(12)).unwrap_or(0) + 1;
    (year, month)
}

/// Summary queries over a [`HistoryStore`].
pub struct HistorySummaries<'a> {
    store: &'a dyn HistoryStore,
}

impl<'a> HistorySummaries<'a> {
    /// Creates a summary view over a store.
    pub const fn new(store: &'a dyn HistoryStore) -> Self {
        Self { store }
    }

    /// The 5-month window ending at the present month.
    pub async fn latest_summaries(&self) -> OverseerResult<Vec<MonthBucket>> {
        self.summarize(0).await
    }

    /// The 5-month window selected by `window_offset`, oldest bucket first.
    ///
    /// Offset 0 ends at the present month; each step toward negative moves
    /// one full window (5 months) further back.
    pub async fn summarize(&self, window_offset: i32) -> OverseerResult<Vec<MonthBucket>> {
        self.summarize_at(Utc::now(), window_offset).await
    }

    /// [`summarize`](Self::summarize) against an explicit reference instant.
    pub async fn summarize_at(
        &self,
        now: DateTime<Utc>,
        window_offset: i32,
    ) -> OverseerResult<Vec<MonthBucket>> {
        let current_diff = -5 * window_offset;
        let window = i32::try_from(WINDOW_MONTHS).unwrap_or(5);
        let (start_year, start_month) = months_ago(now, window + current_diff);
        let (stop_year, stop_month) = months_ago(now, current_diff);

        // The window excludes its start month, so querying begins one past
        // it. A window spanning a year boundary needs two pieces.
        let rows = if start_month > stop_month {
            let mut rows = self.aggregate(start_month + 1, 12, start_year).await?;
            rows.extend(self.aggregate(1, stop_month, stop_year).await?);
            rows
        } else {
            self.aggregate(start_month + 1, stop_month, start_year).await?
        };

        Ok(fill_window(&rows, start_month, start_year))
    }

    /// The records for one bucket of a window, with the resolved month.
    ///
    /// `bucket_index` is 0-based, oldest bucket first, matching the order
    /// [`summarize`](Self::summarize) returns.
    pub async fn month_detail(
        &self,
        window_offset: i32,
        bucket_index: u32,
    ) -> OverseerResult<(Vec<HistoryRecord>, (i32, u32))> {
        self.month_detail_at(Utc::now(), window_offset, bucket_index)
            .await
    }

    /// [`month_detail`](Self::month_detail) against an explicit instant.
    pub async fn month_detail_at(
        &self,
        now: DateTime<Utc>,
        window_offset: i32,
        bucket_index: u32,
    ) -> OverseerResult<(Vec<HistoryRecord>, (i32, u32))> {
        let current_ref = -5 * window_offset;
        let window = i32::try_from(WINDOW_MONTHS).unwrap_or(5);
        let index = i32::try_from(bucket_index).unwrap_or(0);
        let current_diff = current_ref + window - (index + 1);
        let (year, month) = months_ago(now, current_diff);
        let records = self.store.for_month(month, year).await?;
        Ok((records, (year, month)))
    }

    /// Runs one aggregate query, reclassifying failures.
    ///
    /// A store reporting `SchemaMissing` becomes the setup-hint error; any
    /// other store failure is re-raised as a query error with the original
    /// message preserved.
    async fn aggregate(
        &self,
        month_start: u32,
        month_end: u32,
        year: i32,
    ) -> OverseerResult<Vec<MonthCount>> {
        self.store
            .aggregate_counts(month_start, month_end, year)
            .await
            .map_err(|err| match err.kind {
                StoreErrorKind::SchemaMissing => {
                    tracing::warn!("history table missing during summary query");
                    OverseerError::SchemaMissing {
                        hint: "Run the history install migration, then retry".to_string(),
                        detail: err.message,
                    }
                }
                _ => OverseerError::Query(err.message),
            })
    }
}

/// Builds the canonical 5-bucket grid and merges the aggregate rows into it.
///
/// Rows must arrive ascending by (year, month), the order the store
/// guarantees; each row is consumed by the single grid slot it matches and
/// every other slot keeps its zero count.
fn fill_window(rows: &[MonthCount], start_month: u32, start_year: i32) -> Vec<MonthBucket> {
    let mut buckets: Vec<MonthBucket> = (0..WINDOW_MONTHS)
        .map(|i| MonthBucket {
            month: (start_month + i) % 12 + 1,
            year: start_year + i32::try_from((start_month + i) / 12).unwrap_or(0),
            count: 0,
        })
        .collect();

    let mut rows = rows.iter().peekable();
    for bucket in &mut buckets {
        if let Some(row) = rows.peek() {
            if row.year == bucket.year && row.month == bucket.month {
                bucket.count = row.count;
                rows.next();
            }
        }
    }
    buckets
}
