//! Integration tests for the history pipeline: tracked updates flowing
//! through the describer into the store, table/record reads with search and
//! pagination, and month-bucketed summaries with gap filling.

use chrono::{DateTime, TimeZone, Utc};
use serde_json::json;

use overseer_history::describe::AssociationSets;
use overseer_history::store::{HistoryQuery, HistoryStore, InMemoryHistoryStore};
use overseer_history::summary::HistorySummaries;
use overseer_history::track::{CurrentUser, HistoryTracker};
use overseer_model::associations::{AssociationDescriptor, AssociationKind};
use overseer_model::fields::FieldDescriptor;
use overseer_model::reflection::ModelInfo;
use overseer_model::registry::ModelRegistry;

// ── Helpers ─────────────────────────────────────────────────────────

fn at(year: i32, month: u32, day: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, 10, 0, 0).unwrap()
}

fn player_model() -> ModelInfo {
    ModelInfo::new("Player", "players")
        .field(FieldDescriptor::new("id", "BigAutoField").serial())
        .field(FieldDescriptor::new("name", "CharField").length(100))
        .field(FieldDescriptor::new("position", "CharField").nullable())
        .field(FieldDescriptor::new("team_id", "IntegerField").nullable())
        .field(FieldDescriptor::new("created_at", "DateTimeField"))
        .field(FieldDescriptor::new("updated_at", "DateTimeField"))
        .association(
            AssociationDescriptor::new("team", AssociationKind::ManyToOne, "Team")
                .own_key(vec!["team_id"])
                .related_key(vec!["id"]),
        )
        .association(AssociationDescriptor::new(
            "fan_clubs",
            AssociationKind::ManyToMany,
            "FanClub",
        ))
}

// ═════════════════════════════════════════════════════════════════════
// 1. Tracked update -> described message -> stored row
// ═════════════════════════════════════════════════════════════════════

#[tokio::test]
async fn test_update_flows_into_store() {
    let store = InMemoryHistoryStore::new();
    let tracker = HistoryTracker::new(&store);
    let model = player_model();

    let old = json!({"id": 3, "name": "Sam", "position": "keeper", "team_id": 1});
    let new = json!({"id": 3, "name": "Sam", "position": "striker", "team_id": 2});
    let before = AssociationSets::new().with("fan_clubs", vec![10, 11]);
    let after = AssociationSets::new().with("fan_clubs", vec![11, 12]);

    let record = tracker
        .record_update_at(
            &model,
            &old,
            &new,
            &before,
            &after,
            &[],
            Some(&"alice@x.com" as &dyn CurrentUser),
            at(2013, 7, 14),
        )
        .await
        .unwrap()
        .expect("changes should produce a row");

    assert_eq!(
        record.message,
        "Removed Fan_clubs #10 associations, Added Fan_clubs #12 associations, \
         Changed position, associated Team"
    );
    assert_eq!(record.table, "Player");
    assert_eq!(record.item, 3);
    assert_eq!((record.month, record.year), (7, 2013));

    let rows = store.most_recent_for_table("Player").await.unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].username, "alice@x.com");
}

#[tokio::test]
async fn test_noop_update_stores_nothing() {
    let store = InMemoryHistoryStore::new();
    let tracker = HistoryTracker::new(&store);
    let model = player_model();

    let snap = json!({"id": 3, "name": "Sam"});
    let sets = AssociationSets::new().with("fan_clubs", vec![1]);
    let result = tracker
        .record_update_at(&model, &snap, &snap, &sets, &sets, &[], None, at(2013, 7, 1))
        .await
        .unwrap();

    assert!(result.is_none());
    assert_eq!(store.count(), 0);
}

// ═════════════════════════════════════════════════════════════════════
// 2. Table and record reads: search, sort, pagination
// ═════════════════════════════════════════════════════════════════════

async fn seed_player_history(store: &InMemoryHistoryStore) {
    let tracker = HistoryTracker::new(store);
    let model = player_model();
    for i in 1..=25_i64 {
        let user = if i % 2 == 0 { "bob@x.com" } else { "alice@x.com" };
        let day = u32::try_from(i).unwrap().min(28);
        tracker
            .record_event_at(
                &format!("Updated player {i}"),
                i,
                &model,
                Some(&user as &dyn CurrentUser),
                at(2013, 7, day),
            )
            .await
            .unwrap();
    }
}

#[tokio::test]
async fn test_for_table_pagination() {
    let store = InMemoryHistoryStore::new();
    seed_player_history(&store).await;

    let params = HistoryQuery::new().sort("updated_at", false);
    let (pages, rows) = store.for_table("Player", &params, false, 2, 10).await.unwrap();
    assert_eq!(pages, 3);
    assert_eq!(rows.len(), 10);
    assert_eq!(rows[0].item, 11);
    assert_eq!(rows[9].item, 20);
}

#[tokio::test]
async fn test_for_table_search_or_semantics() {
    let store = InMemoryHistoryStore::new();
    seed_player_history(&store).await;

    // Matches usernames only.
    let (_, rows) = store
        .for_table("Player", &HistoryQuery::new().query("bob"), true, 1, 0)
        .await
        .unwrap();
    assert_eq!(rows.len(), 12);
    assert!(rows.iter().all(|r| r.username == "bob@x.com"));

    // Matches messages only.
    let (_, rows) = store
        .for_table("Player", &HistoryQuery::new().query("player 7"), true, 1, 0)
        .await
        .unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].item, 7);
}

#[tokio::test]
async fn test_for_record_scoped_history() {
    let store = InMemoryHistoryStore::new();
    seed_player_history(&store).await;

    let rows = store
        .for_record("Player", 7, &HistoryQuery::new())
        .await
        .unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].message, "Updated player 7");
    assert_eq!(rows[0].item, 7);
}

// ═════════════════════════════════════════════════════════════════════
// 3. Summaries: gap filling and year boundaries
// ═════════════════════════════════════════════════════════════════════

#[tokio::test]
async fn test_summary_over_year_boundary_with_gaps() {
    let store = InMemoryHistoryStore::new();
    let tracker = HistoryTracker::new(&store);
    let model = player_model();

    // Two events in December 2012, one in February 2013.
    for (when, item) in [
        (at(2012, 12, 1), 1),
        (at(2012, 12, 9), 2),
        (at(2013, 2, 20), 3),
    ] {
        tracker
            .record_event_at("Created player", item, &model, None, when)
            .await
            .unwrap();
    }

    let summaries = HistorySummaries::new(&store);
    let buckets = summaries.summarize_at(at(2013, 3, 15), 0).await.unwrap();

    let triples: Vec<(i32, u32, u64)> =
        buckets.iter().map(|b| (b.year, b.month, b.count)).collect();
    assert_eq!(
        triples,
        vec![
            (2012, 11, 0),
            (2012, 12, 2),
            (2013, 1, 0),
            (2013, 2, 1),
            (2013, 3, 0),
        ]
    );
}

#[tokio::test]
async fn test_summary_and_month_detail_agree() {
    let store = InMemoryHistoryStore::new();
    let tracker = HistoryTracker::new(&store);
    let model = player_model();

    tracker
        .record_event_at("Created player", 1, &model, None, at(2013, 5, 2))
        .await
        .unwrap();
    tracker
        .record_event_at("Deleted player", 1, &model, None, at(2013, 5, 28))
        .await
        .unwrap();

    let summaries = HistorySummaries::new(&store);
    let buckets = summaries.summarize_at(at(2013, 8, 1), 0).await.unwrap();
    let may = buckets.iter().find(|b| b.month == 5).unwrap();
    assert_eq!(may.count, 2);

    let (records, (year, month)) = summaries
        .month_detail_at(at(2013, 8, 1), 0, 1)
        .await
        .unwrap();
    assert_eq!((year, month), (2013, 5));
    assert_eq!(records.len(), 2);
}

// ═════════════════════════════════════════════════════════════════════
// 4. Registry wiring: the history model itself is never tracked
// ═════════════════════════════════════════════════════════════════════

#[test]
fn test_registry_excludes_history_model() {
    let mut registry = ModelRegistry::new().exclude("History");
    registry.register(player_model());
    registry.register(ModelInfo::new("History", overseer_history::HISTORY_TABLE));

    assert!(registry.is_registered("Player"));
    assert!(!registry.is_registered("History"));
    assert_eq!(registry.len(), 1);
}

// ═════════════════════════════════════════════════════════════════════
// 5. Missing history table is surfaced with a setup hint
// ═════════════════════════════════════════════════════════════════════

#[tokio::test]
async fn test_summary_on_fresh_deployment_explains_setup() {
    let store = InMemoryHistoryStore::new();
    store.drop_table();

    let summaries = HistorySummaries::new(&store);
    let err = summaries.summarize_at(at(2013, 8, 1), 0).await.unwrap_err();
    let text = err.to_string();
    assert!(text.contains("install migration"));
    assert!(text.contains("overseer_histories"));
}
