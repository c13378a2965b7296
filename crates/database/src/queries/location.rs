use model::{
    location::{Location, LocationKind, User},
    WithId,
};
use price_tracking::database::{DatabaseError, Result};
use sqlx::{Executor, Postgres};
use utility::id::Id;

use crate::data_model::location::LocationRow;

use super::convert_error;

pub async fn get<'c, E>(executor: E, id: Id<Location>) -> Result<WithId<Location>>
where
    E: Executor<'c, Database = Postgres>,
{
    sqlx::query_as(
        "
        SELECT
            id, user_id, name, latitude, longitude,
            region_code, region_type, fuel_type
        FROM
            locations
        WHERE id = $1;
        ",
    )
    .bind(id.raw())
    .fetch_one(executor)
    .await
    .map_err(convert_error)
    .and_then(|row: LocationRow| row.to_model())
}

pub async fn get_all<'c, E>(executor: E) -> Result<Vec<WithId<Location>>>
where
    E: Executor<'c, Database = Postgres>,
{
    sqlx::query_as(
        "
        SELECT
            id, user_id, name, latitude, longitude,
            region_code, region_type, fuel_type
        FROM
            locations
        ORDER BY id;
        ",
    )
    .fetch_all(executor)
    .await
    .map_err(convert_error)?
    .into_iter()
    .map(|row: LocationRow| row.to_model())
    .collect()
}

pub async fn get_for_user<'c, E>(
    executor: E,
    user: Id<User>,
) -> Result<Vec<WithId<Location>>>
where
    E: Executor<'c, Database = Postgres>,
{
    sqlx::query_as(
        "
        SELECT
            id, user_id, name, latitude, longitude,
            region_code, region_type, fuel_type
        FROM
            locations
        WHERE user_id = $1
        ORDER BY id;
        ",
    )
    .bind(user.raw())
    .fetch_all(executor)
    .await
    .map_err(convert_error)?
    .into_iter()
    .map(|row: LocationRow| row.to_model())
    .collect()
}

pub async fn count_for_user<'c, E>(executor: E, user: Id<User>) -> Result<u64>
where
    E: Executor<'c, Database = Postgres>,
{
    sqlx::query_scalar("SELECT COUNT(*) FROM locations WHERE user_id = $1;")
        .bind(user.raw())
        .fetch_one(executor)
        .await
        .map_err(convert_error)
        .map(|count: i64| count as u64)
}

pub async fn insert<'c, E>(
    executor: E,
    location: Location,
) -> Result<WithId<Location>>
where
    E: Executor<'c, Database = Postgres>,
{
    let (latitude, longitude, region_code, region_type) = match &location.kind {
        LocationKind::Address {
            latitude,
            longitude,
        } => (Some(*latitude), Some(*longitude), None, None),
        LocationKind::Region { code, region_type } => {
            (None, None, Some(*code), Some(region_type.code()))
        }
    };

    sqlx::query_as(
        "
        INSERT INTO locations(
            user_id,
            name,
            latitude,
            longitude,
            region_code,
            region_type,
            fuel_type
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        RETURNING
            id, user_id, name, latitude, longitude,
            region_code, region_type, fuel_type;
        ",
    )
    .bind(location.user.raw())
    .bind(&location.name)
    .bind(latitude)
    .bind(longitude)
    .bind(region_code)
    .bind(region_type)
    .bind(location.fuel_type.code())
    .fetch_one(executor)
    .await
    .map_err(convert_error)
    .and_then(|row: LocationRow| row.to_model())
}

pub async fn delete<'c, E>(executor: E, id: Id<Location>) -> Result<()>
where
    E: Executor<'c, Database = Postgres>,
{
    let result = sqlx::query("DELETE FROM locations WHERE id = $1;")
        .bind(id.raw())
        .execute(executor)
        .await
        .map_err(convert_error)?;

    if result.rows_affected() == 0 {
        return Err(DatabaseError::NotFound);
    }
    Ok(())
}
