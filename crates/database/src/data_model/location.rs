use async_trait::async_trait;
use model::{
    location::{FuelType, Location, LocationKind, RegionType, User},
    WithId,
};
use price_tracking::database::{LocationRepo, Result};
use sqlx::prelude::FromRow;
use utility::id::Id;

use crate::{
    invalid_row,
    queries::location::{count_for_user, delete, get, get_all, get_for_user, insert},
    PgDatabaseAutocommit, PgDatabaseTransaction,
};

#[derive(Debug, Clone, FromRow)]
pub struct LocationRow {
    pub id: i64,
    pub user_id: i64,
    pub name: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub region_code: Option<i32>,
    pub region_type: Option<String>,
    pub fuel_type: String,
}

impl LocationRow {
    /// Rehydrates the address/region sum type from the nullable columns.
    /// The CHECK constraint keeps invalid combinations out of the table, so
    /// hitting one here means the row was tampered with.
    pub fn to_model(self) -> Result<WithId<Location>> {
        let kind = match (
            self.latitude,
            self.longitude,
            self.region_code,
            self.region_type.as_deref(),
        ) {
            (Some(latitude), Some(longitude), None, None) => {
                LocationKind::Address {
                    latitude,
                    longitude,
                }
            }
            (None, None, Some(code), Some(region_type)) => LocationKind::Region {
                code,
                region_type: RegionType::from_code(region_type).ok_or_else(
                    || {
                        invalid_row(format!(
                            "location {} has unknown region type {:?}",
                            self.id, region_type
                        ))
                    },
                )?,
            },
            _ => {
                return Err(invalid_row(format!(
                    "location {} mixes address and region fields",
                    self.id
                )))
            }
        };

        let fuel_type = FuelType::from_code(&self.fuel_type).ok_or_else(|| {
            invalid_row(format!(
                "location {} has unknown fuel type {:?}",
                self.id, self.fuel_type
            ))
        })?;

        Ok(WithId::new(
            Id::new(self.id),
            Location {
                name: self.name,
                kind,
                fuel_type,
                user: Id::new(self.user_id),
            },
        ))
    }
}

#[async_trait]
impl LocationRepo for PgDatabaseAutocommit {
    async fn get_location(
        &mut self,
        id: Id<Location>,
    ) -> Result<WithId<Location>> {
        get(&self.pool, id).await
    }

    async fn get_all_locations(&mut self) -> Result<Vec<WithId<Location>>> {
        get_all(&self.pool).await
    }

    async fn get_locations_for_user(
        &mut self,
        user: Id<User>,
    ) -> Result<Vec<WithId<Location>>> {
        get_for_user(&self.pool, user).await
    }

    async fn count_locations_for_user(&mut self, user: Id<User>) -> Result<u64> {
        count_for_user(&self.pool, user).await
    }

    async fn insert_location(
        &mut self,
        location: Location,
    ) -> Result<WithId<Location>> {
        insert(&self.pool, location).await
    }

    async fn delete_location(&mut self, id: Id<Location>) -> Result<()> {
        delete(&self.pool, id).await
    }
}

#[async_trait]
impl<'a> LocationRepo for PgDatabaseTransaction<'a> {
    async fn get_location(
        &mut self,
        id: Id<Location>,
    ) -> Result<WithId<Location>> {
        get(&mut *self.tx, id).await
    }

    async fn get_all_locations(&mut self) -> Result<Vec<WithId<Location>>> {
        get_all(&mut *self.tx).await
    }

    async fn get_locations_for_user(
        &mut self,
        user: Id<User>,
    ) -> Result<Vec<WithId<Location>>> {
        get_for_user(&mut *self.tx, user).await
    }

    async fn count_locations_for_user(&mut self, user: Id<User>) -> Result<u64> {
        count_for_user(&mut *self.tx, user).await
    }

    async fn insert_location(
        &mut self,
        location: Location,
    ) -> Result<WithId<Location>> {
        insert(&mut *self.tx, location).await
    }

    async fn delete_location(&mut self, id: Id<Location>) -> Result<()> {
        delete(&mut *self.tx, id).await
    }
}
