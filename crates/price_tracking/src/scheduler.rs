use std::{
    collections::HashMap, env, panic::AssertUnwindSafe, sync::Arc, time::Duration,
};

use futures::FutureExt;
use model::location::Location;
use tokio::{sync::Mutex, task::JoinHandle, time};
use utility::id::Id;

use crate::{
    database::{Database, LocationRepo},
    ingest::ingest_location_prices,
    source::PriceSource,
    RequestError, RequestResult,
};

pub const DEFAULT_INGEST_INTERVAL: Duration = Duration::from_secs(60 * 60);

/// Reads `INGEST_INTERVAL_SECS`, falling back to the hourly default.
pub fn interval_from_env() -> Duration {
    env::var("INGEST_INTERVAL_SECS")
        .ok()
        .and_then(|value| value.parse().ok())
        .map(Duration::from_secs)
        .unwrap_or(DEFAULT_INGEST_INTERVAL)
}

/// Runs the recurring ingestion jobs, one tokio task per location.
///
/// Jobs are started explicitly when a location is created (and for every
/// stored location at startup) and cancelled explicitly when it is deleted,
/// so the control flow stays visible to the caller. A failing run is logged
/// and retried at the next tick; there is no retry inside a run.
pub struct IngestScheduler<D, S>
where
    D: Database + 'static,
    S: PriceSource + 'static,
{
    database: D,
    source: Arc<S>,
    interval: Duration,
    tasks: Arc<Mutex<HashMap<i64, JoinHandle<()>>>>,
}

impl<D, S> Clone for IngestScheduler<D, S>
where
    D: Database + 'static,
    S: PriceSource + 'static,
{
    fn clone(&self) -> Self {
        Self {
            database: self.database.clone(),
            source: self.source.clone(),
            interval: self.interval,
            tasks: self.tasks.clone(),
        }
    }
}

impl<D, S> IngestScheduler<D, S>
where
    D: Database + 'static,
    S: PriceSource + 'static,
{
    pub fn new(database: D, source: S, interval: Duration) -> Self {
        Self {
            database,
            source: Arc::new(source),
            interval,
            tasks: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Starts the recurring ingestion job for a location. The first run
    /// happens right away, further runs follow the configured interval.
    /// Scheduling an already scheduled location is a no-op.
    pub async fn schedule(&self, location: Id<Location>) {
        let mut tasks = self.tasks.lock().await;
        if tasks.contains_key(&location.raw()) {
            return;
        }

        let database = self.database.clone();
        let source = self.source.clone();
        let interval = self.interval;
        let handle = tokio::spawn(async move {
            let mut ticker = time::interval(interval);
            loop {
                ticker.tick().await;
                let run = AssertUnwindSafe(ingest_location_prices(
                    &database,
                    source.as_ref(),
                    location,
                ))
                .catch_unwind()
                .await;
                match run {
                    Ok(Ok(outcome)) => {
                        log::debug!(
                            "ingestion run for location {location}: {outcome:?}"
                        );
                    }
                    Ok(Err(RequestError::NotFound)) => {
                        log::info!(
                            "location {location} no longer exists, \
                             stopping its ingestion job"
                        );
                        break;
                    }
                    Ok(Err(why)) => {
                        log::error!(
                            "ingestion run for location {location} failed: {why}"
                        );
                    }
                    Err(why) => {
                        log::error!(
                            "ingestion run for location {location} panicked: {why:?}"
                        );
                    }
                }
            }
        });
        tasks.insert(location.raw(), handle);
    }

    /// Stops the recurring job of a location, e.g. when it is deleted.
    pub async fn cancel(&self, location: Id<Location>) {
        if let Some(handle) = self.tasks.lock().await.remove(&location.raw()) {
            handle.abort();
        }
    }

    /// Restores the jobs for every stored location, used at startup.
    pub async fn schedule_all(&self) -> RequestResult<()> {
        let locations = self.database.auto().get_all_locations().await?;
        for location in locations {
            self.schedule(location.id).await;
        }
        Ok(())
    }
}
