//! Async entry point composing a record store, a clock and the shared
//! configuration.

use crate::clock::{Clock, SystemClock};
use crate::range::RangeRequest;
use crate::report::{AnalyticsReport, ReportEngine, ReportResponse};
use crate::store::CallRecordStore;
use callmetrics_common::{OwnerId, Result};
use callmetrics_config::ConfigCache;
use std::sync::Arc;
use tracing::{info, instrument};

/// Produces reports for owners from whatever store it is given.
#[derive(Clone)]
pub struct AnalyticsService {
    store: Arc<dyn CallRecordStore>,
    clock: Arc<dyn Clock>,
    config: Arc<ConfigCache>,
}

impl AnalyticsService {
    /// Creates a service using the system clock.
    pub fn new(store: Arc<dyn CallRecordStore>, config: Arc<ConfigCache>) -> Self {
        Self::with_clock(store, Arc::new(SystemClock), config)
    }

    /// Creates a service with an explicit clock.
    pub fn with_clock(
        store: Arc<dyn CallRecordStore>,
        clock: Arc<dyn Clock>,
        config: Arc<ConfigCache>,
    ) -> Self {
        Self {
            store,
            clock,
            config,
        }
    }

    /// Computes the full report for `owner_id`.
    pub async fn analyze(&self, owner_id: &OwnerId, request: &RangeRequest) -> Result<AnalyticsReport> {
        let engine = self.engine()?;
        self.compute(&engine, owner_id, request).await
    }

    /// Computes the report for `owner_id` in its wire shape.
    pub async fn report(&self, owner_id: &OwnerId, request: &RangeRequest) -> Result<ReportResponse> {
        let engine = self.engine()?;
        let report = self.compute(&engine, owner_id, request).await?;
        Ok(report.to_response(engine.duration_unit()))
    }

    /// One configuration snapshot is used for a whole computation, so a
    /// concurrent update never produces a mixed report.
    fn engine(&self) -> Result<ReportEngine> {
        ReportEngine::new(&self.config.get().analytics)
    }

    #[instrument(skip(self, engine, owner_id, request), fields(owner = %owner_id, store = self.store.name()))]
    async fn compute(
        &self,
        engine: &ReportEngine,
        owner_id: &OwnerId,
        request: &RangeRequest,
    ) -> Result<AnalyticsReport> {
        let records = self.store.records_for_owner(owner_id).await?;
        info!(count = records.len(), "Fetched call records");

        engine.compute(&records, owner_id, request, self.clock.now())
    }
}
