//! Subcommand implementations. Each returns the text to print.

use crate::cli::{ReportArgs, SeedArgs};
use crate::error::{CliError, CliResult};
use callmetrics_analytics::{
    AnalyticsService, Clock, FixedClock, JsonFileCallStore, RangeRequest, SyntheticCallGenerator,
    SystemClock,
};
use callmetrics_common::{validate_non_empty, OwnerId, Timestamp};
use callmetrics_config::{Config, ConfigCache};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::{info, instrument};

/// Runs `callmetrics report` and returns the JSON report.
#[instrument(skip(config, args), fields(owner = %args.owner))]
pub async fn run_report(config: Config, args: &ReportArgs) -> CliResult<String> {
    let owner = owner_arg(&args.owner)?;
    let records_path = args
        .records
        .clone()
        .or_else(|| config.storage.records_path.clone())
        .ok_or_else(|| {
            CliError::invalid_argument(
                "records",
                "no records file given and storage.records_path is not configured",
            )
        })?;

    let clock: Arc<dyn Clock> = match parse_now(args.now.as_deref())? {
        Some(at) => Arc::new(FixedClock::new(at)),
        None => Arc::new(SystemClock),
    };

    let service = AnalyticsService::with_clock(
        Arc::new(JsonFileCallStore::new(records_path)),
        clock,
        Arc::new(ConfigCache::new(config)),
    );
    let request = RangeRequest {
        start_date: args.start.clone(),
        end_date: args.end.clone(),
    };

    let response = service.report(&owner, &request).await?;
    info!(total_calls = response.total_calls, "Report ready");

    let json = if args.pretty {
        serde_json::to_string_pretty(&response)?
    } else {
        serde_json::to_string(&response)?
    };
    Ok(json)
}

/// Runs `callmetrics seed`. Returns the records as JSON, or a one-line
/// summary when they were written to a file.
#[instrument(skip(args), fields(owner = %args.owner, count = args.count))]
pub async fn run_seed(args: &SeedArgs) -> CliResult<String> {
    let owner = owner_arg(&args.owner)?;
    let now = parse_now(args.now.as_deref())?.unwrap_or_else(Utc::now);
    let records = SyntheticCallGenerator::new(owner.clone(), args.days, args.seed)
        .generate(args.count, now);

    match &args.output {
        Some(path) => {
            JsonFileCallStore::new(path).save_all(&records).await?;
            info!(path = %path.display(), "Synthetic records written");
            Ok(format!(
                "Wrote {} records for {} to {}",
                records.len(),
                owner,
                path.display()
            ))
        }
        None => Ok(serde_json::to_string_pretty(&records)?),
    }
}

fn owner_arg(raw: &str) -> CliResult<OwnerId> {
    Ok(OwnerId::new(validate_non_empty(raw, "owner")?))
}

fn parse_now(raw: Option<&str>) -> CliResult<Option<Timestamp>> {
    raw.map(|value| {
        DateTime::parse_from_rfc3339(value)
            .map(|ts| ts.with_timezone(&Utc))
            .map_err(|e| CliError::invalid_argument("now", e.to_string()))
    })
    .transpose()
}
