//! The persisted history record.
//!
//! One [`HistoryRecord`] is written per tracked mutation that produced a
//! non-empty change message. Records are append-only: after creation only
//! the store-managed timestamps may move, and this subsystem never deletes
//! them. The `table`/`item` pair identifies the originating entity with no
//! referential-integrity guarantee; history rows outlive their subjects.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use overseer_core::ValidationError;

/// The conventional name of the backing table.
pub const HISTORY_TABLE: &str = "overseer_histories";

/// The earliest supported record year.
pub const MIN_YEAR: i32 = 2010;
/// The latest supported record year.
pub const MAX_YEAR: i32 = 2020;

/// A single change-history row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryRecord {
    /// Auto-generated primary key.
    pub id: u64,
    /// The human-readable change description.
    pub message: String,
    /// Who made the change; empty when no user was signed in.
    pub username: String,
    /// The originating record's primary key.
    pub item: i64,
    /// The originating entity's display label.
    pub table: String,
    /// Month of the change, 1-12, always set together with `year`.
    pub month: u32,
    /// Year of the change, within the supported range.
    pub year: i32,
    /// When the row was created.
    pub created_at: DateTime<Utc>,
    /// When the row was last touched by the store.
    pub updated_at: DateTime<Utc>,
}

impl HistoryRecord {
    /// Checks the record invariants: month in 1-12, year in the supported
    /// range, message and table present.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.message.is_empty() {
            return Err(ValidationError::new("message is required", "required"));
        }
        if self.table.is_empty() {
            return Err(ValidationError::new("table is required", "required"));
        }
        if !(1..=12).contains(&self.month) {
            return Err(
                ValidationError::new("month must be between 1 and 12", "month_range")
                    .with_param("month", self.month.to_string()),
            );
        }
        if !(MIN_YEAR..=MAX_YEAR).contains(&self.year) {
            return Err(ValidationError::new(
                format!("year must be between {MIN_YEAR} and {MAX_YEAR}"),
                "year_range",
            )
            .with_param("year", self.year.to_string()));
        }
        Ok(())
    }
}

impl std::fmt::Display for HistoryRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "[{}/{}] {} #{}: {}",
            self.month, self.year, self.table, self.item, self.message
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn record() -> HistoryRecord {
        let at = Utc.with_ymd_and_hms(2013, 7, 14, 12, 0, 0).unwrap();
        HistoryRecord {
            id: 1,
            message: "Changed name, email".to_string(),
            username: "alice@example.com".to_string(),
            item: 42,
            table: "Users".to_string(),
            month: 7,
            year: 2013,
            created_at: at,
            updated_at: at,
        }
    }

    #[test]
    fn test_valid_record_passes() {
        assert!(record().validate().is_ok());
    }

    #[test]
    fn test_empty_username_is_allowed() {
        let mut rec = record();
        rec.username = String::new();
        assert!(rec.validate().is_ok());
    }

    #[test]
    fn test_missing_message_fails() {
        let mut rec = record();
        rec.message = String::new();
        let err = rec.validate().unwrap_err();
        assert_eq!(err.code, "required");
    }

    #[test]
    fn test_missing_table_fails() {
        let mut rec = record();
        rec.table = String::new();
        assert!(rec.validate().is_err());
    }

    #[test]
    fn test_month_bounds() {
        let mut rec = record();
        rec.month = 0;
        assert_eq!(rec.validate().unwrap_err().code, "month_range");
        rec.month = 13;
        assert_eq!(rec.validate().unwrap_err().code, "month_range");
        rec.month = 1;
        assert!(rec.validate().is_ok());
        rec.month = 12;
        assert!(rec.validate().is_ok());
    }

    #[test]
    fn test_year_bounds() {
        let mut rec = record();
        rec.year = 2009;
        assert_eq!(rec.validate().unwrap_err().code, "year_range");
        rec.year = 2021;
        assert_eq!(rec.validate().unwrap_err().code, "year_range");
        rec.year = MIN_YEAR;
        assert!(rec.validate().is_ok());
        rec.year = MAX_YEAR;
        assert!(rec.validate().is_ok());
    }

    #[test]
    fn test_display_format() {
        let text = record().to_string();
        assert!(text.contains("7/2013"));
        assert!(text.contains("Users #42"));
        assert!(text.contains("Changed name, email"));
    }

    #[test]
    fn test_serde_round_trip() {
        let rec = record();
        let json = serde_json::to_string(&rec).unwrap();
        let back: HistoryRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(back, rec);
    }
}
