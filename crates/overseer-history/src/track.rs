//! History entry points for tracked mutations.
//!
//! The surrounding framework calls [`HistoryTracker::record_update`] after
//! every tracked save with the before/after state; nothing is persisted
//! when the diff comes back empty. Inserts and deletes go through
//! [`HistoryTracker::record_event`] with a caller-supplied message.

use chrono::{DateTime, Utc};
use serde_json::Value;

use overseer_core::OverseerResult;
use overseer_model::reflection::ModelInfo;

use crate::describe::{describe_update, AssociationSets};
use crate::record::HistoryRecord;
use crate::store::HistoryStore;

/// The identity provider contract: whoever is signed in right now.
///
/// The display string (typically an email address) is stored verbatim as
/// the history row's username.
pub trait CurrentUser {
    /// The user's display string.
    fn display(&self) -> &str;
}

impl CurrentUser for &str {
    fn display(&self) -> &str {
        self
    }
}

impl CurrentUser for String {
    fn display(&self) -> &str {
        self
    }
}

/// Maps an optional signed-in user to the stored username.
///
/// Absence is recorded as the empty string, never null.
pub fn username_of(user: Option<&dyn CurrentUser>) -> String {
    user.map_or_else(String::new, |u| u.display().to_string())
}

/// Writes history rows for tracked mutations.
pub struct HistoryTracker<'a> {
    store: &'a dyn HistoryStore,
}

impl<'a> HistoryTracker<'a> {
    /// Creates a tracker over a store.
    pub const fn new(store: &'a dyn HistoryStore) -> Self {
        Self { store }
    }

    /// Describes and records an update operation.
    ///
    /// Returns `Ok(None)` without touching the store when the diff finds
    /// no changes. The row's `item` is taken from the new snapshot's `id`
    /// field and its `table` is the model's display name.
    #[allow(clippy::too_many_arguments)]
    pub async fn record_update(
        &self,
        model: &ModelInfo,
        old: &Value,
        new: &Value,
        before: &AssociationSets,
        after: &AssociationSets,
        modified_labels: &[String],
        user: Option<&dyn CurrentUser>,
    ) -> OverseerResult<Option<HistoryRecord>> {
        self.record_update_at(model, old, new, before, after, modified_labels, user, Utc::now())
            .await
    }

    /// [`record_update`](Self::record_update) stamped from an explicit instant.
    #[allow(clippy::too_many_arguments)]
    pub async fn record_update_at(
        &self,
        model: &ModelInfo,
        old: &Value,
        new: &Value,
        before: &AssociationSets,
        after: &AssociationSets,
        modified_labels: &[String],
        user: Option<&dyn CurrentUser>,
        at: DateTime<Utc>,
    ) -> OverseerResult<Option<HistoryRecord>> {
        let Some(message) = describe_update(model, old, new, before, after, modified_labels)
        else {
            tracing::debug!(model = %model.name, "no changes detected, skipping history row");
            return Ok(None);
        };
        let item = new.get("id").and_then(Value::as_i64).unwrap_or(0);
        let record = self
            .store
            .record_at(&message, item, &model.pretty_name(), &username_of(user), at)
            .await?;
        Ok(Some(record))
    }

    /// Records a history row for any operation with a caller-built message.
    pub async fn record_event(
        &self,
        message: &str,
        item: i64,
        model: &ModelInfo,
        user: Option<&dyn CurrentUser>,
    ) -> OverseerResult<HistoryRecord> {
        self.store
            .record(message, item, &model.pretty_name(), &username_of(user))
            .await
    }

    /// [`record_event`](Self::record_event) stamped from an explicit instant.
    pub async fn record_event_at(
        &self,
        message: &str,
        item: i64,
        model: &ModelInfo,
        user: Option<&dyn CurrentUser>,
        at: DateTime<Utc>,
    ) -> OverseerResult<HistoryRecord> {
        self.store
            .record_at(message, item, &model.pretty_name(), &username_of(user), at)
            .await
    }
}
