//! History persistence: append-only writes, flexible reads.
//!
//! [`HistoryStore`] is the storage contract for history rows: record one
//! row per tracked mutation, then read them back by table, by record, by
//! month, or as per-month aggregate counts. [`InMemoryHistoryStore`] is the
//! default implementation.
//!
//! Concurrent writers are serialized only by the underlying store's own
//! concurrency control; this layer adds no locking of its own, so rows from
//! two simultaneous requests land in whatever order the store yields.

use std::cmp::Ordering;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering as AtomicOrdering};
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use chrono::{DateTime, Datelike, Utc};
use serde::{Deserialize, Serialize};

use overseer_core::settings::DEFAULT_ITEMS_PER_PAGE;
use overseer_core::{OverseerResult, StoreError};

use crate::record::{HistoryRecord, HISTORY_TABLE};

/// Filter and sort parameters for history reads.
///
/// # Examples
///
/// ```
/// use overseer_history::store::HistoryQuery;
///
/// let params = HistoryQuery::new().query("alice").sort("updated_at", true);
/// assert_eq!(params.query.as_deref(), Some("alice"));
/// assert!(params.sort_descending);
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HistoryQuery {
    /// Substring matched case-insensitively against message or username.
    pub query: Option<String>,
    /// Field to sort by; unknown fields leave insertion order.
    pub sort: Option<String>,
    /// Whether to reverse the sort.
    pub sort_descending: bool,
}

impl HistoryQuery {
    /// Creates empty parameters: no filter, insertion order.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the substring filter.
    #[must_use]
    pub fn query(mut self, text: impl Into<String>) -> Self {
        self.query = Some(text.into());
        self
    }

    /// Sets the sort field and direction.
    #[must_use]
    pub fn sort(mut self, field: impl Into<String>, descending: bool) -> Self {
        self.sort = Some(field.into());
        self.sort_descending = descending;
        self
    }
}

/// One aggregate row: how many history records exist for a month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthCount {
    /// The calendar year.
    pub year: i32,
    /// The calendar month, 1-12.
    pub month: u32,
    /// Number of records in that month.
    pub count: u64,
}

/// The storage contract for history rows.
///
/// `aggregate_counts` reports failures as structured [`StoreError`]s so the
/// summary layer can distinguish a missing history table from any other
/// query failure without inspecting message text.
#[async_trait]
pub trait HistoryStore: Send + Sync {
    /// Writes one history row stamped from the given instant.
    ///
    /// `month`/`year` are derived from `at`; validation failures (month,
    /// year range, missing message or table) surface to the caller.
    async fn record_at(
        &self,
        message: &str,
        item: i64,
        table: &str,
        username: &str,
        at: DateTime<Utc>,
    ) -> OverseerResult<HistoryRecord>;

    /// Writes one history row stamped from the current time.
    async fn record(
        &self,
        message: &str,
        item: i64,
        table: &str,
        username: &str,
    ) -> OverseerResult<HistoryRecord> {
        self.record_at(message, item, table, username, Utc::now())
            .await
    }

    /// All rows for a table, ascending by update time.
    async fn most_recent_for_table(&self, table: &str) -> OverseerResult<Vec<HistoryRecord>>;

    /// Filtered, sorted, paginated rows for a table.
    ///
    /// Returns `(page_count, rows)`. With `all` set, every matching row is
    /// returned and `page_count` is 1. `page` is 1-indexed; a `per_page` of
    /// zero falls back to the default page size.
    async fn for_table(
        &self,
        table: &str,
        params: &HistoryQuery,
        all: bool,
        page: usize,
        per_page: usize,
    ) -> OverseerResult<(usize, Vec<HistoryRecord>)>;

    /// Filtered, sorted rows for one record, unpaginated.
    async fn for_record(
        &self,
        table: &str,
        item: i64,
        params: &HistoryQuery,
    ) -> OverseerResult<Vec<HistoryRecord>>;

    /// All rows stamped with the given month and year.
    async fn for_month(&self, month: u32, year: i32) -> OverseerResult<Vec<HistoryRecord>>;

    /// Per-month record counts for the inclusive month range of one year.
    ///
    /// One row per month that has at least one record, ascending by
    /// (year, month); months with no records are absent. Gap-filling is the
    /// summary layer's job.
    async fn aggregate_counts(
        &self,
        month_start: u32,
        month_end: u32,
        year: i32,
    ) -> Result<Vec<MonthCount>, StoreError>;
}

/// Returns `true` when the record matches the substring query on message
/// or username (case-insensitive, OR semantics).
fn matches_query(record: &HistoryRecord, query: &str) -> bool {
    let query = query.to_lowercase();
    record.message.to_lowercase().contains(&query)
        || record.username.to_lowercase().contains(&query)
}

fn compare_by(a: &HistoryRecord, b: &HistoryRecord, field: &str) -> Ordering {
    match field {
        "id" => a.id.cmp(&b.id),
        "message" => a.message.cmp(&b.message),
        "username" => a.username.cmp(&b.username),
        "item" => a.item.cmp(&b.item),
        "table" => a.table.cmp(&b.table),
        "month" => a.month.cmp(&b.month),
        "year" => a.year.cmp(&b.year),
        "created_at" => a.created_at.cmp(&b.created_at),
        "updated_at" => a.updated_at.cmp(&b.updated_at),
        _ => Ordering::Equal,
    }
}

/// Applies the query's filter and sort to an owned record list.
fn filter_and_sort(mut records: Vec<HistoryRecord>, params: &HistoryQuery) -> Vec<HistoryRecord> {
    if let Some(ref query) = params.query {
        records.retain(|r| matches_query(r, query));
    }
    if let Some(ref field) = params.sort {
        records.sort_by(|a, b| {
            let cmp = compare_by(a, b, field);
            if params.sort_descending {
                cmp.reverse()
            } else {
                cmp
            }
        });
    }
    records
}

/// In-memory implementation of [`HistoryStore`].
///
/// Rows live in a `Vec` behind `Arc<RwLock>` with an atomic id counter.
/// [`drop_table`](Self::drop_table) simulates the not-yet-installed state:
/// every operation then reports `SchemaMissing`, which is how a fresh
/// deployment looks before the history migration has run.
#[derive(Debug, Clone)]
pub struct InMemoryHistoryStore {
    records: Arc<RwLock<Vec<HistoryRecord>>>,
    next_id: Arc<AtomicU64>,
    installed: Arc<AtomicBool>,
}

impl InMemoryHistoryStore {
    /// Creates an empty store with the history table installed.
    pub fn new() -> Self {
        Self {
            records: Arc::new(RwLock::new(Vec::new())),
            next_id: Arc::new(AtomicU64::new(1)),
            installed: Arc::new(AtomicBool::new(true)),
        }
    }

    /// Simulates the history table being absent.
    pub fn drop_table(&self) {
        self.installed.store(false, AtomicOrdering::SeqCst);
    }

    /// Re-installs the history table.
    pub fn install_table(&self) {
        self.installed.store(true, AtomicOrdering::SeqCst);
    }

    /// The total number of stored rows.
    pub fn count(&self) -> usize {
        self.records.read().unwrap().len()
    }

    /// Removes every stored row.
    pub fn clear(&self) {
        self.records.write().unwrap().clear();
    }

    fn check_installed(&self) -> Result<(), StoreError> {
        if self.installed.load(AtomicOrdering::SeqCst) {
            Ok(())
        } else {
            Err(StoreError::schema_missing(format!(
                "no such table: {HISTORY_TABLE}"
            )))
        }
    }

    fn snapshot(&self) -> Vec<HistoryRecord> {
        self.records.read().unwrap().clone()
    }
}

impl Default for InMemoryHistoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl HistoryStore for InMemoryHistoryStore {
    async fn record_at(
        &self,
        message: &str,
        item: i64,
        table: &str,
        username: &str,
        at: DateTime<Utc>,
    ) -> OverseerResult<HistoryRecord> {
        self.check_installed()?;
        let record = HistoryRecord {
            id: self.next_id.fetch_add(1, AtomicOrdering::Relaxed),
            message: message.to_string(),
            username: username.to_string(),
            item,
            table: table.to_string(),
            month: at.month(),
            year: at.year(),
            created_at: at,
            updated_at: at,
        };
        record.validate()?;
        tracing::debug!(table = %record.table, item = record.item, "recording history row");
        self.records.write().unwrap().push(record.clone());
        Ok(record)
    }

    async fn most_recent_for_table(&self, table: &str) -> OverseerResult<Vec<HistoryRecord>> {
        self.check_installed()?;
        let mut records: Vec<HistoryRecord> = self
            .snapshot()
            .into_iter()
            .filter(|r| r.table == table)
            .collect();
        records.sort_by(|a, b| a.updated_at.cmp(&b.updated_at));
        Ok(records)
    }

    async fn for_table(
        &self,
        table: &str,
        params: &HistoryQuery,
        all: bool,
        page: usize,
        per_page: usize,
    ) -> OverseerResult<(usize, Vec<HistoryRecord>)> {
        self.check_installed()?;
        let records: Vec<HistoryRecord> = self
            .snapshot()
            .into_iter()
            .filter(|r| r.table == table)
            .collect();
        let records = filter_and_sort(records, params);

        if all {
            return Ok((1, records));
        }
        let per_page = if per_page == 0 {
            DEFAULT_ITEMS_PER_PAGE
        } else {
            per_page
        };
        let page = page.max(1);
        let page_count = records.len().div_ceil(per_page);
        let rows: Vec<HistoryRecord> = records
            .into_iter()
            .skip((page - 1) * per_page)
            .take(per_page)
            .collect();
        Ok((page_count, rows))
    }

    async fn for_record(
        &self,
        table: &str,
        item: i64,
        params: &HistoryQuery,
    ) -> OverseerResult<Vec<HistoryRecord>> {
        self.check_installed()?;
        let records: Vec<HistoryRecord> = self
            .snapshot()
            .into_iter()
            .filter(|r| r.table == table && r.item == item)
            .collect();
        Ok(filter_and_sort(records, params))
    }

    async fn for_month(&self, month: u32, year: i32) -> OverseerResult<Vec<HistoryRecord>> {
        self.check_installed()?;
        Ok(self
            .snapshot()
            .into_iter()
            .filter(|r| r.month == month && r.year == year)
            .collect())
    }

    async fn aggregate_counts(
        &self,
        month_start: u32,
        month_end: u32,
        year: i32,
    ) -> Result<Vec<MonthCount>, StoreError> {
        self.check_installed()?;
        let mut counts: Vec<MonthCount> = Vec::new();
        for month in month_start..=month_end {
            let count = self
                .records
                .read()
                .unwrap()
                .iter()
                .filter(|r| r.year == year && r.month == month)
                .count() as u64;
            if count > 0 {
                counts.push(MonthCount { year, month, count });
            }
        }
        Ok(counts)
    }
}
