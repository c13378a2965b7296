//! In-memory storage and source doubles for the orchestration tests.

use std::{
    collections::BTreeMap,
    error, fmt,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc, Mutex,
    },
};

use async_trait::async_trait;
use chrono::{DateTime, Local};
use model::{
    location::{Location, User},
    price::{PriceObservation, PriceStatistics},
    station::Station,
    WithId,
};
use utility::id::Id;

use crate::{
    database::{
        Database, DatabaseAutocommit, DatabaseError, DatabaseOperations,
        DatabaseTransaction, LocationRepo, PriceRepo, Result, StationRepo,
    },
    source::{PriceSource, SourceBatch},
};

#[derive(Debug, Default)]
struct State {
    next_location_id: i64,
    locations: BTreeMap<i64, Location>,
    stations: BTreeMap<i64, Station>,
    station_users: BTreeMap<i64, Vec<i64>>,
    next_observation_id: i64,
    observations: Vec<WithId<PriceObservation>>,
}

#[derive(Debug, Clone, Default)]
pub struct MockDatabase {
    state: Arc<Mutex<State>>,
}

impl MockDatabase {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn seed_location(&self, location: Location) -> WithId<Location> {
        self.auto().insert_location(location).await.unwrap()
    }

    pub async fn seed_observation(
        &self,
        location: Id<Location>,
        datetime: DateTime<Local>,
        stations: &[i64],
        min_amount: f64,
    ) -> WithId<PriceObservation> {
        let mut state = self.state.lock().unwrap();
        state.next_observation_id += 1;
        let observation = WithId::new(
            Id::new(state.next_observation_id),
            PriceObservation {
                location,
                datetime,
                stations: stations.iter().map(|id| Id::new(*id)).collect(),
                stats: PriceStatistics {
                    min_amount,
                    max_amount: min_amount,
                    average_amount: min_amount,
                    median_amount: min_amount,
                },
            },
        );
        state.observations.push(observation.clone());
        observation
    }

    pub async fn station_count(&self) -> usize {
        self.state.lock().unwrap().stations.len()
    }

    pub async fn observation_count(&self) -> usize {
        self.state.lock().unwrap().observations.len()
    }

    pub async fn station_users(&self, station: i64) -> Vec<i64> {
        self.state
            .lock()
            .unwrap()
            .station_users
            .get(&station)
            .cloned()
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone)]
pub struct MockExecutor {
    state: Arc<Mutex<State>>,
}

#[async_trait]
impl Database for MockDatabase {
    type Transaction = MockExecutor;
    type Autocommit = MockExecutor;

    fn auto(&self) -> Self::Autocommit {
        MockExecutor {
            state: self.state.clone(),
        }
    }

    async fn transaction(&self) -> Result<Self::Transaction> {
        Ok(self.auto())
    }
}

impl DatabaseOperations for MockExecutor {}
impl DatabaseAutocommit for MockExecutor {}

#[async_trait]
impl DatabaseTransaction for MockExecutor {
    async fn commit(self) -> Result<()> {
        Ok(())
    }
}

#[async_trait]
impl LocationRepo for MockExecutor {
    async fn get_location(
        &mut self,
        id: Id<Location>,
    ) -> Result<WithId<Location>> {
        self.state
            .lock()
            .unwrap()
            .locations
            .get(&id.raw())
            .cloned()
            .map(|location| WithId::new(id, location))
            .ok_or(DatabaseError::NotFound)
    }

    async fn get_all_locations(&mut self) -> Result<Vec<WithId<Location>>> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .locations
            .iter()
            .map(|(id, location)| WithId::new(Id::new(*id), location.clone()))
            .collect())
    }

    async fn get_locations_for_user(
        &mut self,
        user: Id<User>,
    ) -> Result<Vec<WithId<Location>>> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .locations
            .iter()
            .filter(|(_, location)| location.user == user)
            .map(|(id, location)| WithId::new(Id::new(*id), location.clone()))
            .collect())
    }

    async fn count_locations_for_user(&mut self, user: Id<User>) -> Result<u64> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .locations
            .values()
            .filter(|location| location.user == user)
            .count() as u64)
    }

    async fn insert_location(
        &mut self,
        location: Location,
    ) -> Result<WithId<Location>> {
        let mut state = self.state.lock().unwrap();
        state.next_location_id += 1;
        let id = state.next_location_id;
        state.locations.insert(id, location.clone());
        Ok(WithId::new(Id::new(id), location))
    }

    async fn delete_location(&mut self, id: Id<Location>) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        if state.locations.remove(&id.raw()).is_none() {
            return Err(DatabaseError::NotFound);
        }
        state
            .observations
            .retain(|observation| observation.content.location != id);
        Ok(())
    }
}

#[async_trait]
impl StationRepo for MockExecutor {
    async fn resolve_station(
        &mut self,
        user: Id<User>,
        station: WithId<Station>,
    ) -> Result<WithId<Station>> {
        let mut state = self.state.lock().unwrap();
        let id = station.id.raw();
        state
            .stations
            .entry(id)
            .or_insert_with(|| station.content.clone());
        let users = state.station_users.entry(id).or_default();
        if !users.contains(&user.raw()) {
            users.push(user.raw());
        }
        let content = state.stations[&id].clone();
        Ok(WithId::new(station.id, content))
    }

    async fn get_stations_for_user(
        &mut self,
        user: Id<User>,
    ) -> Result<Vec<WithId<Station>>> {
        let state = self.state.lock().unwrap();
        Ok(state
            .stations
            .iter()
            .filter(|(id, _)| {
                state
                    .station_users
                    .get(id)
                    .is_some_and(|users| users.contains(&user.raw()))
            })
            .map(|(id, station)| WithId::new(Id::new(*id), station.clone()))
            .collect())
    }
}

#[async_trait]
impl PriceRepo for MockExecutor {
    async fn latest_observation(
        &mut self,
        location: Id<Location>,
    ) -> Result<Option<WithId<PriceObservation>>> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .observations
            .iter()
            .filter(|observation| observation.content.location == location)
            .max_by_key(|observation| observation.content.datetime)
            .cloned())
    }

    async fn insert_observation(
        &mut self,
        location: Id<Location>,
        stats: PriceStatistics,
        stations: &[Id<Station>],
    ) -> Result<WithId<PriceObservation>> {
        let mut state = self.state.lock().unwrap();
        state.next_observation_id += 1;
        let observation = WithId::new(
            Id::new(state.next_observation_id),
            PriceObservation {
                location,
                datetime: Local::now(),
                stations: stations.to_vec(),
                stats,
            },
        );
        state.observations.push(observation.clone());
        Ok(observation)
    }

    async fn observations_since(
        &mut self,
        location: Id<Location>,
        cutoff: Option<DateTime<Local>>,
    ) -> Result<Vec<WithId<PriceObservation>>> {
        let mut observations = self
            .state
            .lock()
            .unwrap()
            .observations
            .iter()
            .filter(|observation| observation.content.location == location)
            .filter(|observation| {
                cutoff.map_or(true, |cutoff| {
                    observation.content.datetime >= cutoff
                })
            })
            .cloned()
            .collect::<Vec<_>>();
        observations.sort_by_key(|observation| observation.content.datetime);
        Ok(observations)
    }
}

// - Price source double -

#[derive(Debug)]
pub struct MockSourceError(String);

impl fmt::Display for MockSourceError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl error::Error for MockSourceError {}

#[derive(Debug, Clone)]
pub struct MockSource {
    batch: SourceBatch,
    error: Option<String>,
    vary: Option<Arc<AtomicUsize>>,
}

impl MockSource {
    pub fn with_batch(
        entry_count: usize,
        records: Vec<model::price::PriceRecord>,
    ) -> Self {
        Self {
            batch: SourceBatch {
                entry_count,
                records,
            },
            error: None,
            vary: None,
        }
    }

    /// A source whose single station reports a different price on every
    /// fetch, so change detection never suppresses a write.
    pub fn varying(station_id: i64) -> Self {
        let record = model::price::PriceRecord {
            station: WithId::new(
                Id::new(station_id),
                Station {
                    name: format!("Station {station_id}"),
                    address: format!("Address {station_id}"),
                    postal_code: "1010".to_owned(),
                    city: "Wien".to_owned(),
                    latitude: 48.0,
                    longitude: 16.0,
                },
            ),
            fuel_type: model::location::FuelType::Diesel,
            amount: "1.000".to_owned(),
        };
        Self {
            batch: SourceBatch {
                entry_count: 1,
                records: vec![record],
            },
            error: None,
            vary: Some(Arc::new(AtomicUsize::new(0))),
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            batch: SourceBatch {
                entry_count: 0,
                records: vec![],
            },
            error: Some(message.to_owned()),
            vary: None,
        }
    }
}

#[async_trait]
impl PriceSource for MockSource {
    type Error = MockSourceError;

    async fn fetch_station_prices(
        &self,
        _location: &Location,
    ) -> std::result::Result<SourceBatch, MockSourceError> {
        if let Some(message) = &self.error {
            return Err(MockSourceError(message.clone()));
        }
        let mut batch = self.batch.clone();
        if let Some(counter) = &self.vary {
            let tick = counter.fetch_add(1, Ordering::SeqCst);
            for record in &mut batch.records {
                record.amount = format!("1.{tick:03}");
            }
        }
        Ok(batch)
    }
}
