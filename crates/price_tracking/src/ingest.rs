use std::collections::HashSet;

use model::{
    location::Location,
    price::{PriceObservation, PriceStatistics},
    station::Station,
    WithId,
};
use utility::id::{Id, IdWrapper};

use crate::{
    database::{Database, DatabaseTransaction, LocationRepo, PriceRepo, StationRepo},
    source::PriceSource,
    statistics::compute_statistics,
    RequestError, RequestResult,
};

/// What a single ingestion run did.
#[derive(Debug, Clone, PartialEq)]
pub enum IngestOutcome {
    /// The upstream API returned no entries at all. Expected, no writes.
    EmptyResponse,
    /// Prices and cheapest stations match the latest stored observation, so
    /// no new history point was written.
    Unchanged,
    /// A new observation was stored.
    Stored(WithId<PriceObservation>),
}

/// Fetches the current prices for a location, determines the cheapest
/// stations and persists a new history point.
///
/// A new observation is only written when the (station set, statistics)
/// tuple differs from the latest stored one; unchanged prices between two
/// runs therefore do not grow the history. Station resolution still runs in
/// that case, keeping the user association fresh.
pub async fn ingest_location_prices<D, S>(
    database: &D,
    source: &S,
    location_id: Id<Location>,
) -> RequestResult<IngestOutcome>
where
    D: Database,
    S: PriceSource,
{
    let location = database.auto().get_location(location_id).await?;

    let batch = source
        .fetch_station_prices(&location.content)
        .await
        .map_err(|why| RequestError::Upstream(Box::new(why)))?;

    if batch.entry_count == 0 {
        log::debug!("no stations returned for location {}", location.id);
        return Ok(IngestOutcome::EmptyResponse);
    }
    if batch.records.is_empty() {
        return Err(RequestError::DataIntegrity(format!(
            "all {} station entries for location {} lacked price data",
            batch.entry_count, location.id
        )));
    }

    let (cheapest, stats) = compute_statistics(&batch.records)?;

    // Observation and station links become visible to readers atomically.
    let mut tx = database.transaction().await?;

    let mut stations = Vec::with_capacity(cheapest.len());
    for station in cheapest {
        stations.push(tx.resolve_station(location.content.user, station).await?);
    }
    let station_ids = stations
        .iter()
        .map(|station| station.id)
        .collect::<Vec<_>>();

    if let Some(latest) = tx.latest_observation(location.id).await? {
        if is_unchanged(&latest.content, &stats, &station_ids) {
            tx.commit().await?;
            log::debug!("prices for location {} unchanged", location.id);
            return Ok(IngestOutcome::Unchanged);
        }
    }

    let observation = tx
        .insert_observation(location.id, stats, &station_ids)
        .await?;
    tx.commit().await?;

    log::info!(
        "stored price observation {} for location {}",
        observation.id,
        location.id
    );
    Ok(IngestOutcome::Stored(observation))
}

/// Station sets compare as unordered sets; the statistics compare by exact
/// float equality.
fn is_unchanged(
    latest: &PriceObservation,
    stats: &PriceStatistics,
    stations: &[Id<Station>],
) -> bool {
    let latest_set: HashSet<i64> =
        latest.stations.iter().map(|id| id.raw()).collect();
    let new_set: HashSet<i64> = stations.raw().into_iter().collect();
    latest_set == new_set && latest.stats == *stats
}
