//! Tests for the async service and its collaborator seams.

use async_trait::async_trait;
use callmetrics_analytics::{
    AnalyticsService, CallRecord, CallRecordStore, FixedClock, InMemoryCallStore,
    JsonFileCallStore, RangeRequest, SyntheticCallGenerator,
};
use callmetrics_common::test_utils::{init_test_logging, mock_timestamp};
use callmetrics_common::{CallMetricsError, OwnerId, Result};
use callmetrics_config::{Config, ConfigCache, DurationUnit};
use std::sync::Arc;

struct FailingStore;

#[async_trait]
impl CallRecordStore for FailingStore {
    async fn records_for_owner(&self, _owner_id: &OwnerId) -> Result<Vec<CallRecord>> {
        Err(CallMetricsError::storage("backend unavailable"))
    }

    fn name(&self) -> &'static str {
        "failing"
    }
}

fn fixed_service(store: Arc<dyn CallRecordStore>, cache: Arc<ConfigCache>) -> AnalyticsService {
    let clock = Arc::new(FixedClock::new(mock_timestamp(2024, 3, 15, 12, 0, 0)));
    AnalyticsService::with_clock(store, clock, cache)
}

#[tokio::test]
async fn test_report_from_in_memory_store() {
    init_test_logging();

    let store = Arc::new(InMemoryCallStore::new(vec![
        CallRecord::new("a", "alice", 240, mock_timestamp(2024, 3, 14, 9, 0, 0))
            .with_sentiment(2.0, 1.0, 1.0),
        CallRecord::new("b", "bob", 60, mock_timestamp(2024, 3, 14, 9, 0, 0)),
    ]));
    let service = fixed_service(store, Arc::new(ConfigCache::default()));

    let response = service
        .report(&OwnerId::from("alice"), &RangeRequest::trailing())
        .await
        .unwrap();

    assert_eq!(response.total_calls, 1);
    assert_eq!(response.average_call_duration, 240);
    assert_eq!(response.sentiment_data.positive, 50);
    assert_eq!(response.nps_score, 25);
    assert_eq!(response.call_trends.len(), 8);
}

#[tokio::test]
async fn test_config_updates_apply_to_next_report() {
    let store = Arc::new(InMemoryCallStore::new(vec![CallRecord::new(
        "a",
        "alice",
        240,
        mock_timestamp(2024, 3, 14, 9, 0, 0),
    )]));
    let cache = Arc::new(ConfigCache::default());
    let service = fixed_service(store, Arc::clone(&cache));
    let alice = OwnerId::from("alice");

    let before = service.report(&alice, &RangeRequest::trailing()).await.unwrap();
    assert_eq!(before.average_call_duration, 240);

    let mut config = Config::default();
    config.analytics.average_duration_unit = DurationUnit::Minutes;
    config.analytics.default_lookback_days = 2;
    cache.update(config).unwrap();

    let after = service.report(&alice, &RangeRequest::trailing()).await.unwrap();
    assert_eq!(after.average_call_duration, 4);
    assert_eq!(after.call_trends.len(), 3);
}

#[tokio::test]
async fn test_json_file_store_with_synthetic_records() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("calls.json");
    let now = mock_timestamp(2024, 3, 15, 12, 0, 0);

    let mut records =
        SyntheticCallGenerator::new(OwnerId::from("alice"), 5, 99).generate(40, now);
    records.extend(SyntheticCallGenerator::new(OwnerId::from("bob"), 5, 100).generate(10, now));
    JsonFileCallStore::new(&path).save_all(&records).await.unwrap();

    let service = fixed_service(
        Arc::new(JsonFileCallStore::new(&path)),
        Arc::new(ConfigCache::default()),
    );
    let report = service
        .analyze(&OwnerId::from("alice"), &RangeRequest::trailing())
        .await
        .unwrap();

    assert_eq!(report.metrics.total_calls, 40);
    assert!(report.metrics.sentiment.is_normalized());
    assert!(report.trends.iter().all(|b| b.sentiment.is_normalized()));
    assert_eq!(
        report.trends.iter().map(|b| b.call_count).sum::<u64>(),
        40
    );
}

#[tokio::test]
async fn test_store_failure_propagates() {
    let service = fixed_service(Arc::new(FailingStore), Arc::new(ConfigCache::default()));

    let err = service
        .report(&OwnerId::from("alice"), &RangeRequest::trailing())
        .await
        .unwrap_err();

    assert!(matches!(err, CallMetricsError::Storage { .. }));
    assert!(!err.is_client_error());
}

#[tokio::test]
async fn test_invalid_range_is_client_error() {
    let service = fixed_service(
        Arc::new(InMemoryCallStore::default()),
        Arc::new(ConfigCache::default()),
    );

    let err = service
        .report(
            &OwnerId::from("alice"),
            &RangeRequest::between("03/01/2024", "2024-03-10"),
        )
        .await
        .unwrap_err();

    assert!(err.is_client_error());
}

#[tokio::test]
async fn test_concurrent_reports() {
    let store = Arc::new(InMemoryCallStore::new(
        SyntheticCallGenerator::new(OwnerId::from("alice"), 7, 5)
            .generate(100, mock_timestamp(2024, 3, 15, 12, 0, 0)),
    ));
    let service = fixed_service(store, Arc::new(ConfigCache::default()));

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let service = service.clone();
            tokio::spawn(async move {
                service
                    .report(&OwnerId::from("alice"), &RangeRequest::trailing())
                    .await
            })
        })
        .collect();

    let mut responses = Vec::new();
    for handle in handles {
        responses.push(handle.await.unwrap().unwrap());
    }
    assert!(responses.windows(2).all(|w| w[0] == w[1]));
}
