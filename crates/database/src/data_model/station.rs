use async_trait::async_trait;
use model::{location::User, station::Station, WithId};
use price_tracking::database::{Result, StationRepo};
use sqlx::prelude::FromRow;
use utility::id::Id;

use crate::{
    queries::station::{associate_user, get, get_for_user, insert_if_absent},
    PgDatabaseAutocommit, PgDatabaseTransaction,
};

#[derive(Debug, Clone, FromRow)]
pub struct StationRow {
    pub id: i64,
    pub name: String,
    pub address: String,
    pub postal_code: String,
    pub city: String,
    pub latitude: f64,
    pub longitude: f64,
}

impl StationRow {
    pub fn to_model(self) -> WithId<Station> {
        WithId::new(
            Id::new(self.id),
            Station {
                name: self.name,
                address: self.address,
                postal_code: self.postal_code,
                city: self.city,
                latitude: self.latitude,
                longitude: self.longitude,
            },
        )
    }
}

#[async_trait]
impl StationRepo for PgDatabaseAutocommit {
    async fn resolve_station(
        &mut self,
        user: Id<User>,
        station: WithId<Station>,
    ) -> Result<WithId<Station>> {
        insert_if_absent(&self.pool, &station).await?;
        associate_user(&self.pool, station.id, user).await?;
        get(&self.pool, station.id).await
    }

    async fn get_stations_for_user(
        &mut self,
        user: Id<User>,
    ) -> Result<Vec<WithId<Station>>> {
        get_for_user(&self.pool, user).await
    }
}

#[async_trait]
impl<'a> StationRepo for PgDatabaseTransaction<'a> {
    async fn resolve_station(
        &mut self,
        user: Id<User>,
        station: WithId<Station>,
    ) -> Result<WithId<Station>> {
        insert_if_absent(&mut *self.tx, &station).await?;
        associate_user(&mut *self.tx, station.id, user).await?;
        get(&mut *self.tx, station.id).await
    }

    async fn get_stations_for_user(
        &mut self,
        user: Id<User>,
    ) -> Result<Vec<WithId<Station>>> {
        get_for_user(&mut *self.tx, user).await
    }
}
