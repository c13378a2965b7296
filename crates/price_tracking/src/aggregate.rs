use std::collections::BTreeMap;

use chrono::{Datelike, Timelike};
use model::{
    price::{
        HistoryPoint, HourlyAverage, MonthDayAverage, PriceObservation,
        StationFrequency, WeekdayAverage,
    },
    WithId,
};
use utility::id::Id;

/// Raw history projection, in the ascending datetime order of the input.
pub fn history(observations: Vec<WithId<PriceObservation>>) -> Vec<HistoryPoint> {
    observations.into_iter().map(HistoryPoint::from).collect()
}

/// Average minimum amount per hour of day. Hours without observations are
/// omitted rather than zero-filled; the result is sorted by ascending hour.
pub fn average_by_hour(
    observations: &[WithId<PriceObservation>],
) -> Vec<HourlyAverage> {
    grouped_averages(observations, |observation| observation.datetime.hour())
        .into_iter()
        .map(|(hour, value)| HourlyAverage { hour, value })
        .collect()
}

/// Average minimum amount per ISO weekday (1 = Monday .. 7 = Sunday),
/// sorted by ascending day number.
pub fn average_by_day_of_week(
    observations: &[WithId<PriceObservation>],
) -> Vec<WeekdayAverage> {
    grouped_averages(observations, |observation| {
        observation.datetime.weekday().number_from_monday()
    })
    .into_iter()
    .map(|(day_of_week, value)| WeekdayAverage { day_of_week, value })
    .collect()
}

/// Average minimum amount per calendar day of month (1-31), sorted by
/// ascending day number.
pub fn average_by_day_of_month(
    observations: &[WithId<PriceObservation>],
) -> Vec<MonthDayAverage> {
    grouped_averages(observations, |observation| observation.datetime.day())
        .into_iter()
        .map(|(day_of_month, value)| MonthDayAverage {
            day_of_month,
            value,
        })
        .collect()
}

/// Per-station selection frequency: appearances in cheapest sets divided by
/// the total number of windowed observations. An observation may name
/// several cheapest stations, so the frequencies need not sum to one. The
/// result is sorted by ascending station id.
pub fn station_frequency(
    observations: &[WithId<PriceObservation>],
) -> Vec<StationFrequency> {
    if observations.is_empty() {
        return vec![];
    }

    let mut appearances: BTreeMap<i64, usize> = BTreeMap::new();
    for observation in observations {
        for station in &observation.content.stations {
            *appearances.entry(station.raw()).or_default() += 1;
        }
    }

    let total = observations.len() as f64;
    appearances
        .into_iter()
        .map(|(station, count)| StationFrequency {
            station: Id::new(station),
            frequency: count as f64 / total,
        })
        .collect()
}

fn grouped_averages<K>(
    observations: &[WithId<PriceObservation>],
    key: K,
) -> BTreeMap<u32, f64>
where
    K: Fn(&PriceObservation) -> u32,
{
    let mut groups: BTreeMap<u32, (f64, usize)> = BTreeMap::new();
    for observation in observations {
        let entry = groups.entry(key(&observation.content)).or_default();
        entry.0 += observation.content.stats.min_amount;
        entry.1 += 1;
    }
    groups
        .into_iter()
        .map(|(key, (sum, count))| (key, sum / count as f64))
        .collect()
}

#[cfg(test)]
mod tests {
    use chrono::{Local, TimeZone};
    use model::price::PriceStatistics;

    use super::*;

    fn observation(
        id: i64,
        datetime: chrono::DateTime<Local>,
        stations: &[i64],
        min_amount: f64,
    ) -> WithId<PriceObservation> {
        WithId::new(
            Id::new(id),
            PriceObservation {
                location: Id::new(1),
                datetime,
                stations: stations.iter().map(|id| Id::new(*id)).collect(),
                stats: PriceStatistics {
                    min_amount,
                    max_amount: min_amount + 0.5,
                    average_amount: min_amount + 0.2,
                    median_amount: min_amount + 0.1,
                },
            },
        )
    }

    fn at(day: u32, hour: u32) -> chrono::DateTime<Local> {
        Local.with_ymd_and_hms(2022, 8, day, hour, 0, 0).unwrap()
    }

    #[test]
    fn hour_groups_are_averaged_and_sorted() {
        // Insertion order deliberately shuffled; hours 0, 3 and 12 are the
        // only populated groups.
        let observations = vec![
            observation(1, at(1, 12), &[1], 1.0),
            observation(2, at(2, 0), &[1], 2.0),
            observation(3, at(3, 12), &[1], 1.5),
            observation(4, at(4, 3), &[1], 1.2),
            observation(5, at(5, 0), &[1], 1.0),
            observation(6, at(6, 12), &[1], 2.0),
        ];
        let result = average_by_hour(&observations);
        assert_eq!(
            result,
            vec![
                HourlyAverage { hour: 0, value: 1.5 },
                HourlyAverage { hour: 3, value: 1.2 },
                HourlyAverage { hour: 12, value: 1.5 },
            ]
        );
    }

    #[test]
    fn day_of_week_uses_iso_numbering() {
        // 2022-08-01 was a Monday, 2022-08-07 a Sunday.
        let observations = vec![
            observation(1, at(7, 9), &[1], 3.0),
            observation(2, at(1, 9), &[1], 1.0),
            observation(3, at(8, 9), &[1], 2.0),
        ];
        let result = average_by_day_of_week(&observations);
        assert_eq!(
            result,
            vec![
                WeekdayAverage { day_of_week: 1, value: 1.5 },
                WeekdayAverage { day_of_week: 7, value: 3.0 },
            ]
        );
    }

    #[test]
    fn day_of_month_groups_by_calendar_day() {
        let observations = vec![
            observation(1, at(31, 9), &[1], 1.0),
            observation(2, at(2, 9), &[1], 2.0),
            observation(3, at(2, 18), &[1], 3.0),
        ];
        let result = average_by_day_of_month(&observations);
        assert_eq!(
            result,
            vec![
                MonthDayAverage { day_of_month: 2, value: 2.5 },
                MonthDayAverage { day_of_month: 31, value: 1.0 },
            ]
        );
    }

    #[test]
    fn station_frequency_counts_appearances_per_observation() {
        let observations = vec![
            observation(1, at(1, 9), &[10, 20], 1.0),
            observation(2, at(2, 9), &[10], 1.0),
            observation(3, at(3, 9), &[30], 1.0),
            observation(4, at(4, 9), &[], 1.0),
        ];
        let result = station_frequency(&observations);
        assert_eq!(
            result,
            vec![
                StationFrequency { station: Id::new(10), frequency: 0.5 },
                StationFrequency { station: Id::new(20), frequency: 0.25 },
                StationFrequency { station: Id::new(30), frequency: 0.25 },
            ]
        );
    }

    #[test]
    fn station_frequency_is_sorted_by_station_id() {
        let observations = vec![
            observation(1, at(1, 9), &[42], 1.0),
            observation(2, at(2, 9), &[7], 1.0),
            observation(3, at(3, 9), &[23], 1.0),
        ];
        let ids = station_frequency(&observations)
            .into_iter()
            .map(|entry| entry.station.raw())
            .collect::<Vec<_>>();
        assert_eq!(ids, vec![7, 23, 42]);
    }

    #[test]
    fn station_frequency_of_no_observations_is_empty() {
        assert!(station_frequency(&[]).is_empty());
    }

    #[test]
    fn history_keeps_the_input_order() {
        let observations = vec![
            observation(1, at(1, 9), &[1], 1.0),
            observation(2, at(2, 9), &[1], 2.0),
        ];
        let result = history(observations);
        assert_eq!(result[0].id.raw(), 1);
        assert_eq!(result[1].id.raw(), 2);
    }
}
