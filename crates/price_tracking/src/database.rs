use std::{error, result};

use async_trait::async_trait;
use chrono::{DateTime, Local};
use model::{
    location::{Location, User},
    price::{PriceObservation, PriceStatistics},
    station::Station,
    WithId,
};
use utility::id::Id;

#[derive(Debug)]
pub enum DatabaseError {
    NotFound,
    Other(Box<dyn error::Error + Send + Sync>),
}

pub type Result<T> = result::Result<T, DatabaseError>;

#[async_trait]
pub trait LocationRepo {
    async fn get_location(
        &mut self,
        id: Id<Location>,
    ) -> Result<WithId<Location>>;

    /// All locations of all users, used to restore the ingestion schedules
    /// at startup.
    async fn get_all_locations(&mut self) -> Result<Vec<WithId<Location>>>;

    async fn get_locations_for_user(
        &mut self,
        user: Id<User>,
    ) -> Result<Vec<WithId<Location>>>;

    async fn count_locations_for_user(&mut self, user: Id<User>) -> Result<u64>;

    async fn insert_location(
        &mut self,
        location: Location,
    ) -> Result<WithId<Location>>;

    /// Deletes the location; price history cascades at storage level.
    async fn delete_location(&mut self, id: Id<Location>) -> Result<()>;
}

#[async_trait]
pub trait StationRepo {
    /// Get-or-create by the upstream id, then associate `user`. Both steps
    /// are idempotent and must be race-safe: of two concurrent ingestions
    /// discovering the same new station, the loser falls back to the
    /// existing row instead of surfacing a uniqueness violation.
    async fn resolve_station(
        &mut self,
        user: Id<User>,
        station: WithId<Station>,
    ) -> Result<WithId<Station>>;

    async fn get_stations_for_user(
        &mut self,
        user: Id<User>,
    ) -> Result<Vec<WithId<Station>>>;
}

#[async_trait]
pub trait PriceRepo {
    /// The most recent observation for the location, if any.
    async fn latest_observation(
        &mut self,
        location: Id<Location>,
    ) -> Result<Option<WithId<PriceObservation>>>;

    /// Inserts a new observation together with its station links. The
    /// timestamp is assigned at insert time by the storage layer.
    async fn insert_observation(
        &mut self,
        location: Id<Location>,
        stats: PriceStatistics,
        stations: &[Id<Station>],
    ) -> Result<WithId<PriceObservation>>;

    /// Observations for the location with `datetime >= cutoff` (all of them
    /// for `None`), ordered by ascending datetime.
    async fn observations_since(
        &mut self,
        location: Id<Location>,
        cutoff: Option<DateTime<Local>>,
    ) -> Result<Vec<WithId<PriceObservation>>>;
}

pub trait DatabaseOperations: LocationRepo + StationRepo + PriceRepo {}

#[async_trait]
pub trait DatabaseTransaction: DatabaseOperations {
    async fn commit(self) -> Result<()>;
}

pub trait DatabaseAutocommit: DatabaseOperations {}

/// Storage abstraction for the price tracking domain. Multiple concurrent
/// accesses should be possible by e.g. cloning the database object.
#[async_trait]
pub trait Database: Clone + Send + Sync + Sized {
    type Transaction: DatabaseTransaction + Send;
    type Autocommit: DatabaseAutocommit + Send;

    fn auto(&self) -> Self::Autocommit;

    async fn transaction(&self) -> Result<Self::Transaction>;
}
