use chrono::{DateTime, Local};
use model::{
    location::Location,
    price::{PriceObservation, PriceStatistics},
    WithId,
};
use price_tracking::database::Result;
use sqlx::{Executor, Postgres};
use utility::id::Id;

use crate::data_model::price::{ObservationRow, ObservationStationRow};

use super::convert_error;

pub async fn latest_row<'c, E>(
    executor: E,
    location: Id<Location>,
) -> Result<Option<ObservationRow>>
where
    E: Executor<'c, Database = Postgres>,
{
    sqlx::query_as(
        "
        SELECT
            id, location_id, datetime,
            min_amount, max_amount, average_amount, median_amount
        FROM
            price_observations
        WHERE location_id = $1
        ORDER BY datetime DESC, id DESC
        LIMIT 1;
        ",
    )
    .bind(location.raw())
    .fetch_optional(executor)
    .await
    .map_err(convert_error)
}

pub async fn station_links<'c, E>(
    executor: E,
    observation: Id<PriceObservation>,
) -> Result<Vec<i64>>
where
    E: Executor<'c, Database = Postgres>,
{
    sqlx::query_scalar(
        "
        SELECT station_id
        FROM price_observation_stations
        WHERE observation_id = $1
        ORDER BY station_id;
        ",
    )
    .bind(observation.raw())
    .fetch_all(executor)
    .await
    .map_err(convert_error)
}

/// Inserts the observation row itself; the timestamp is assigned by the
/// database at insert time.
pub async fn insert<'c, E>(
    executor: E,
    location: Id<Location>,
    stats: &PriceStatistics,
) -> Result<ObservationRow>
where
    E: Executor<'c, Database = Postgres>,
{
    sqlx::query_as(
        "
        INSERT INTO price_observations(
            location_id,
            min_amount,
            max_amount,
            average_amount,
            median_amount
        )
        VALUES ($1, $2, $3, $4, $5)
        RETURNING
            id, location_id, datetime,
            min_amount, max_amount, average_amount, median_amount;
        ",
    )
    .bind(location.raw())
    .bind(stats.min_amount)
    .bind(stats.max_amount)
    .bind(stats.average_amount)
    .bind(stats.median_amount)
    .fetch_one(executor)
    .await
    .map_err(convert_error)
}

pub async fn link_station<'c, E>(
    executor: E,
    observation: Id<PriceObservation>,
    station: i64,
) -> Result<()>
where
    E: Executor<'c, Database = Postgres>,
{
    sqlx::query(
        "
        INSERT INTO price_observation_stations(observation_id, station_id)
        VALUES ($1, $2)
        ON CONFLICT DO NOTHING;
        ",
    )
    .bind(observation.raw())
    .bind(station)
    .execute(executor)
    .await
    .map_err(convert_error)
    .map(|_| ())
}

/// All observations of a location from `cutoff` on (or all of them), with
/// their station links, ordered by ascending datetime.
pub async fn since<'c, E>(
    executor: E,
    location: Id<Location>,
    cutoff: Option<DateTime<Local>>,
) -> Result<Vec<WithId<PriceObservation>>>
where
    E: Executor<'c, Database = Postgres>,
{
    sqlx::query_as(
        "
        SELECT
            o.id, o.location_id, o.datetime,
            o.min_amount, o.max_amount, o.average_amount, o.median_amount,
            l.station_id
        FROM
            price_observations o
            LEFT JOIN price_observation_stations l ON l.observation_id = o.id
        WHERE
            o.location_id = $1
            AND ($2::timestamptz IS NULL OR o.datetime >= $2)
        ORDER BY o.datetime ASC, o.id ASC, l.station_id ASC;
        ",
    )
    .bind(location.raw())
    .bind(cutoff)
    .fetch_all(executor)
    .await
    .map_err(convert_error)
    .map(|rows: Vec<ObservationStationRow>| {
        crate::data_model::price::gather(rows)
    })
}
