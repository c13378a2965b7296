use model::{
    location::User,
    station::Station,
    WithId,
};
use price_tracking::database::Result;
use sqlx::{Executor, Postgres};
use utility::id::Id;

use crate::data_model::station::StationRow;

use super::convert_error;

/// Creates the station if its upstream id is not known yet. Of two
/// concurrent ingestions racing on the same new id, the loser simply keeps
/// the winner's row.
pub async fn insert_if_absent<'c, E>(
    executor: E,
    station: &WithId<Station>,
) -> Result<()>
where
    E: Executor<'c, Database = Postgres>,
{
    sqlx::query(
        "
        INSERT INTO stations(
            id,
            name,
            address,
            postal_code,
            city,
            latitude,
            longitude
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        ON CONFLICT (id) DO NOTHING;
        ",
    )
    .bind(station.id.raw())
    .bind(&station.content.name)
    .bind(&station.content.address)
    .bind(&station.content.postal_code)
    .bind(&station.content.city)
    .bind(station.content.latitude)
    .bind(station.content.longitude)
    .execute(executor)
    .await
    .map_err(convert_error)
    .map(|_| ())
}

/// Associates the user with the station; already associated users are a
/// no-op.
pub async fn associate_user<'c, E>(
    executor: E,
    station: Id<Station>,
    user: Id<User>,
) -> Result<()>
where
    E: Executor<'c, Database = Postgres>,
{
    sqlx::query(
        "
        INSERT INTO station_users(station_id, user_id)
        VALUES ($1, $2)
        ON CONFLICT DO NOTHING;
        ",
    )
    .bind(station.raw())
    .bind(user.raw())
    .execute(executor)
    .await
    .map_err(convert_error)
    .map(|_| ())
}

pub async fn get<'c, E>(executor: E, id: Id<Station>) -> Result<WithId<Station>>
where
    E: Executor<'c, Database = Postgres>,
{
    sqlx::query_as(
        "
        SELECT
            id, name, address, postal_code, city, latitude, longitude
        FROM
            stations
        WHERE id = $1;
        ",
    )
    .bind(id.raw())
    .fetch_one(executor)
    .await
    .map_err(convert_error)
    .map(|row: StationRow| row.to_model())
}

pub async fn get_for_user<'c, E>(
    executor: E,
    user: Id<User>,
) -> Result<Vec<WithId<Station>>>
where
    E: Executor<'c, Database = Postgres>,
{
    sqlx::query_as(
        "
        SELECT
            s.id, s.name, s.address, s.postal_code, s.city,
            s.latitude, s.longitude
        FROM
            stations s
            JOIN station_users su ON su.station_id = s.id
        WHERE su.user_id = $1
        ORDER BY s.id;
        ",
    )
    .bind(user.raw())
    .fetch_all(executor)
    .await
    .map_err(convert_error)
    .map(|rows: Vec<StationRow>| {
        rows.into_iter().map(|row| row.to_model()).collect()
    })
}
