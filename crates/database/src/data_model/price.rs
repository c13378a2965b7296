use async_trait::async_trait;
use chrono::{DateTime, Local};
use indexmap::IndexMap;
use model::{
    location::Location,
    price::{PriceObservation, PriceStatistics},
    station::Station,
    WithId,
};
use price_tracking::database::{PriceRepo, Result};
use sqlx::prelude::FromRow;
use utility::id::Id;

use crate::{
    queries::price::{insert, latest_row, link_station, since, station_links},
    PgDatabaseAutocommit, PgDatabaseTransaction,
};

#[derive(Debug, Clone, FromRow)]
pub struct ObservationRow {
    pub id: i64,
    pub location_id: i64,
    pub datetime: DateTime<Local>,
    pub min_amount: f64,
    pub max_amount: f64,
    pub average_amount: f64,
    pub median_amount: f64,
}

impl ObservationRow {
    pub fn to_model(self, stations: Vec<i64>) -> WithId<PriceObservation> {
        WithId::new(
            Id::new(self.id),
            PriceObservation {
                location: Id::new(self.location_id),
                datetime: self.datetime,
                stations: stations.into_iter().map(Id::new).collect(),
                stats: PriceStatistics {
                    min_amount: self.min_amount,
                    max_amount: self.max_amount,
                    average_amount: self.average_amount,
                    median_amount: self.median_amount,
                },
            },
        )
    }
}

/// One row of the observation-with-links join; `station_id` is null for
/// observations without any cheapest station.
#[derive(Debug, Clone, FromRow)]
pub struct ObservationStationRow {
    pub id: i64,
    pub location_id: i64,
    pub datetime: DateTime<Local>,
    pub min_amount: f64,
    pub max_amount: f64,
    pub average_amount: f64,
    pub median_amount: f64,
    pub station_id: Option<i64>,
}

/// Collapses the join rows back into observations. An index map keeps the
/// datetime order the database returned the rows in.
pub fn gather(rows: Vec<ObservationStationRow>) -> Vec<WithId<PriceObservation>> {
    let mut by_ids: IndexMap<i64, WithId<PriceObservation>> = IndexMap::new();
    for row in rows {
        let entry = by_ids.entry(row.id).or_insert_with(|| {
            WithId::new(
                Id::new(row.id),
                PriceObservation {
                    location: Id::new(row.location_id),
                    datetime: row.datetime,
                    stations: vec![],
                    stats: PriceStatistics {
                        min_amount: row.min_amount,
                        max_amount: row.max_amount,
                        average_amount: row.average_amount,
                        median_amount: row.median_amount,
                    },
                },
            )
        });
        if let Some(station_id) = row.station_id {
            entry.content.stations.push(Id::new(station_id));
        }
    }
    by_ids.into_values().collect()
}

#[async_trait]
impl PriceRepo for PgDatabaseAutocommit {
    async fn latest_observation(
        &mut self,
        location: Id<Location>,
    ) -> Result<Option<WithId<PriceObservation>>> {
        match latest_row(&self.pool, location).await? {
            Some(row) => {
                let links =
                    station_links(&self.pool, Id::new(row.id)).await?;
                Ok(Some(row.to_model(links)))
            }
            None => Ok(None),
        }
    }

    async fn insert_observation(
        &mut self,
        location: Id<Location>,
        stats: PriceStatistics,
        stations: &[Id<Station>],
    ) -> Result<WithId<PriceObservation>> {
        let row = insert(&self.pool, location, &stats).await?;
        for station in stations {
            link_station(&self.pool, Id::new(row.id), station.raw()).await?;
        }
        let links = stations.iter().map(|station| station.raw()).collect();
        Ok(row.to_model(links))
    }

    async fn observations_since(
        &mut self,
        location: Id<Location>,
        cutoff: Option<DateTime<Local>>,
    ) -> Result<Vec<WithId<PriceObservation>>> {
        since(&self.pool, location, cutoff).await
    }
}

#[async_trait]
impl<'a> PriceRepo for PgDatabaseTransaction<'a> {
    async fn latest_observation(
        &mut self,
        location: Id<Location>,
    ) -> Result<Option<WithId<PriceObservation>>> {
        match latest_row(&mut *self.tx, location).await? {
            Some(row) => {
                let links =
                    station_links(&mut *self.tx, Id::new(row.id)).await?;
                Ok(Some(row.to_model(links)))
            }
            None => Ok(None),
        }
    }

    async fn insert_observation(
        &mut self,
        location: Id<Location>,
        stats: PriceStatistics,
        stations: &[Id<Station>],
    ) -> Result<WithId<PriceObservation>> {
        let row = insert(&mut *self.tx, location, &stats).await?;
        for station in stations {
            link_station(&mut *self.tx, Id::new(row.id), station.raw()).await?;
        }
        let links = stations.iter().map(|station| station.raw()).collect();
        Ok(row.to_model(links))
    }

    async fn observations_since(
        &mut self,
        location: Id<Location>,
        cutoff: Option<DateTime<Local>>,
    ) -> Result<Vec<WithId<PriceObservation>>> {
        since(&mut *self.tx, location, cutoff).await
    }
}
