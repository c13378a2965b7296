use chrono::Local;
use model::{
    location::{Location, User},
    price::{
        DateRange, HistoryPoint, HourlyAverage, MonthDayAverage,
        PriceObservation, StationFrequency, WeekdayAverage,
    },
    station::Station,
    WithId,
};
use utility::id::Id;

use crate::{
    aggregate,
    database::{Database, LocationRepo, PriceRepo, StationRepo},
    RequestError, RequestResult, LOCATION_LIMIT,
};

/// Service facade over the storage layer, used by the web handlers and the
/// ingestion scheduler.
#[derive(Debug, Clone)]
pub struct Client<D>
where
    D: Database + Send + Sync + Sized + 'static,
{
    pub database: D,
}

impl<D> Client<D>
where
    D: Database,
{
    pub fn new(database: D) -> Self {
        Self { database }
    }

    /// Loads the location and checks that it belongs to `user`. A location
    /// of another user answers `Forbidden` without disclosing anything
    /// else; a missing location answers `NotFound`.
    async fn authorized_location(
        &self,
        user: Id<User>,
        id: Id<Location>,
    ) -> RequestResult<WithId<Location>> {
        let location = self.database.auto().get_location(id).await?;
        if location.content.user != user {
            return Err(RequestError::Forbidden);
        }
        Ok(location)
    }
}

// - Locations -

impl<D> Client<D>
where
    D: Database,
{
    pub async fn get_locations(
        &self,
        user: Id<User>,
    ) -> RequestResult<Vec<WithId<Location>>> {
        Ok(self.database.auto().get_locations_for_user(user).await?)
    }

    pub async fn get_location(
        &self,
        user: Id<User>,
        id: Id<Location>,
    ) -> RequestResult<WithId<Location>> {
        self.authorized_location(user, id).await
    }

    pub async fn create_location(
        &self,
        location: Location,
    ) -> RequestResult<WithId<Location>> {
        let mut auto = self.database.auto();
        let count = auto.count_locations_for_user(location.user).await?;
        if count as usize >= LOCATION_LIMIT {
            return Err(RequestError::LimitReached(LOCATION_LIMIT));
        }
        Ok(auto.insert_location(location).await?)
    }

    pub async fn delete_location(
        &self,
        user: Id<User>,
        id: Id<Location>,
    ) -> RequestResult<()> {
        let location = self.authorized_location(user, id).await?;
        Ok(self.database.auto().delete_location(location.id).await?)
    }
}

// - Stations -

impl<D> Client<D>
where
    D: Database,
{
    pub async fn get_stations(
        &self,
        user: Id<User>,
    ) -> RequestResult<Vec<WithId<Station>>> {
        Ok(self.database.auto().get_stations_for_user(user).await?)
    }
}

// - Price history and aggregations -

impl<D> Client<D>
where
    D: Database,
{
    /// The shared read path all aggregations build on: authorization, then
    /// windowing relative to the wall clock at call time.
    async fn windowed_observations(
        &self,
        user: Id<User>,
        location: Id<Location>,
        range: Option<DateRange>,
    ) -> RequestResult<Vec<WithId<PriceObservation>>> {
        let location = self.authorized_location(user, location).await?;
        let cutoff = range.map(|range| range.cutoff(Local::now()));
        Ok(self
            .database
            .auto()
            .observations_since(location.id, cutoff)
            .await?)
    }

    pub async fn price_history(
        &self,
        user: Id<User>,
        location: Id<Location>,
        range: Option<DateRange>,
    ) -> RequestResult<Vec<HistoryPoint>> {
        self.windowed_observations(user, location, range)
            .await
            .map(aggregate::history)
    }

    pub async fn price_by_hour(
        &self,
        user: Id<User>,
        location: Id<Location>,
        range: Option<DateRange>,
    ) -> RequestResult<Vec<HourlyAverage>> {
        self.windowed_observations(user, location, range)
            .await
            .map(|observations| aggregate::average_by_hour(&observations))
    }

    pub async fn price_by_day_of_week(
        &self,
        user: Id<User>,
        location: Id<Location>,
        range: Option<DateRange>,
    ) -> RequestResult<Vec<WeekdayAverage>> {
        self.windowed_observations(user, location, range)
            .await
            .map(|observations| aggregate::average_by_day_of_week(&observations))
    }

    pub async fn price_by_day_of_month(
        &self,
        user: Id<User>,
        location: Id<Location>,
        range: Option<DateRange>,
    ) -> RequestResult<Vec<MonthDayAverage>> {
        self.windowed_observations(user, location, range)
            .await
            .map(|observations| {
                aggregate::average_by_day_of_month(&observations)
            })
    }

    pub async fn price_station_frequency(
        &self,
        user: Id<User>,
        location: Id<Location>,
        range: Option<DateRange>,
    ) -> RequestResult<Vec<StationFrequency>> {
        self.windowed_observations(user, location, range)
            .await
            .map(|observations| aggregate::station_frequency(&observations))
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;
    use model::location::{FuelType, LocationKind};

    use super::*;
    use crate::testing::MockDatabase;

    fn location(user: i64) -> Location {
        Location {
            name: "Home".to_owned(),
            kind: LocationKind::Address {
                latitude: 48.2082,
                longitude: 16.3738,
            },
            fuel_type: FuelType::Diesel,
            user: Id::new(user),
        }
    }

    #[tokio::test]
    async fn missing_location_answers_not_found() {
        let client = Client::new(MockDatabase::new());
        let result = client
            .price_history(Id::new(1), Id::new(999), None)
            .await;
        assert!(matches!(result, Err(RequestError::NotFound)));
    }

    #[tokio::test]
    async fn foreign_location_answers_forbidden() {
        let database = MockDatabase::new();
        let owned = database.seed_location(location(1)).await;

        let client = Client::new(database);
        let result = client.price_history(Id::new(2), owned.id, None).await;
        assert!(matches!(result, Err(RequestError::Forbidden)));

        // The same distinction holds for deletion.
        let result = client.delete_location(Id::new(2), owned.id).await;
        assert!(matches!(result, Err(RequestError::Forbidden)));
    }

    #[tokio::test]
    async fn own_location_is_readable() {
        let database = MockDatabase::new();
        let owned = database.seed_location(location(1)).await;

        let client = Client::new(database);
        let history =
            client.price_history(Id::new(1), owned.id, None).await.unwrap();
        assert!(history.is_empty());
    }

    #[tokio::test]
    async fn location_limit_rejects_further_creations() {
        let database = MockDatabase::new();
        for _ in 0..LOCATION_LIMIT {
            database.seed_location(location(1)).await;
        }

        let client = Client::new(database);
        let result = client.create_location(location(1)).await;
        assert!(matches!(
            result,
            Err(RequestError::LimitReached(LOCATION_LIMIT))
        ));

        // Another user is unaffected by the first user's limit.
        client.create_location(location(2)).await.unwrap();
    }

    #[tokio::test]
    async fn date_ranges_cut_the_history_at_fixed_day_counts() {
        let database = MockDatabase::new();
        let owned = database.seed_location(location(1)).await;

        let now = Local::now();
        for offset_days in [200, 100, 32, 10, 1] {
            database
                .seed_observation(
                    owned.id,
                    now - Duration::days(offset_days),
                    &[1],
                    1.0,
                )
                .await;
        }

        let client = Client::new(database);
        for (range, expected) in [
            (Some(DateRange::OneWeek), 1),
            (Some(DateRange::OneMonth), 2),
            (Some(DateRange::ThreeMonths), 3),
            (Some(DateRange::SixMonths), 4),
            (None, 5),
        ] {
            let history = client
                .price_history(Id::new(1), owned.id, range)
                .await
                .unwrap();
            assert_eq!(history.len(), expected, "range {range:?}");
        }
    }

    #[tokio::test]
    async fn history_is_ordered_by_ascending_datetime() {
        let database = MockDatabase::new();
        let owned = database.seed_location(location(1)).await;

        let now = Local::now();
        for offset_days in [3, 30, 12] {
            database
                .seed_observation(
                    owned.id,
                    now - Duration::days(offset_days),
                    &[1],
                    1.0,
                )
                .await;
        }

        let client = Client::new(database);
        let history =
            client.price_history(Id::new(1), owned.id, None).await.unwrap();
        let datetimes =
            history.iter().map(|point| point.datetime).collect::<Vec<_>>();
        let mut sorted = datetimes.clone();
        sorted.sort();
        assert_eq!(datetimes, sorted);
    }
}
