use chrono::{DateTime, Duration, Local};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use utility::id::{HasId, Id};

use crate::{
    location::{FuelType, Location},
    station::Station,
    WithId,
};

/// A single usable price parsed from one upstream station entry.
///
/// The amount stays the decimal string reported by the API until statistics
/// are computed, so no float round-off is introduced while parsing.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceRecord {
    pub station: WithId<Station>,
    pub fuel_type: FuelType,
    pub amount: String,
}

/// Aggregate statistics over all prices seen in one ingestion run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct PriceStatistics {
    pub min_amount: f64,
    pub max_amount: f64,
    pub average_amount: f64,
    pub median_amount: f64,
}

/// One timestamped ingestion result for a location: the statistics plus the
/// set of stations that held the minimum price. Append-only, ordered by
/// `datetime`.
#[derive(Debug, Clone, PartialEq, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct PriceObservation {
    pub location: Id<Location>,
    pub datetime: DateTime<Local>,
    pub stations: Vec<Id<Station>>,
    #[serde(flatten)]
    pub stats: PriceStatistics,
}

impl HasId for PriceObservation {
    type IdType = i64;
}

/// The read-facing projection of an observation. Only the minimum amount is
/// exposed to readers; the remaining statistics are internal.
#[derive(Debug, Clone, PartialEq, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct HistoryPoint {
    pub id: Id<PriceObservation>,
    pub location: Id<Location>,
    pub datetime: DateTime<Local>,
    pub stations: Vec<Id<Station>>,
    pub min_amount: f64,
}

impl From<WithId<PriceObservation>> for HistoryPoint {
    fn from(observation: WithId<PriceObservation>) -> Self {
        HistoryPoint {
            id: observation.id,
            location: observation.content.location,
            datetime: observation.content.datetime,
            stations: observation.content.stations,
            min_amount: observation.content.stats.min_amount,
        }
    }
}

/// Relative windows the read endpoints accept via the `date_range` query
/// parameter. Months are counted as fixed day spans so a "month" always
/// covers the same number of days.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateRange {
    OneWeek,
    OneMonth,
    ThreeMonths,
    SixMonths,
}

impl DateRange {
    /// Parses the query parameter value. Unknown values map to `None`,
    /// which readers treat as "unbounded".
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "1w" => Some(Self::OneWeek),
            "1m" => Some(Self::OneMonth),
            "3m" => Some(Self::ThreeMonths),
            "6m" => Some(Self::SixMonths),
            _ => None,
        }
    }

    pub fn days_back(&self) -> i64 {
        match self {
            Self::OneWeek => 7,
            Self::OneMonth => 31,
            Self::ThreeMonths => 93,
            Self::SixMonths => 186,
        }
    }

    /// The inclusive lower bound of the window relative to `now`.
    pub fn cutoff(&self, now: DateTime<Local>) -> DateTime<Local> {
        now - Duration::days(self.days_back())
    }
}

/// Average minimum amount per hour of day (0-23).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct HourlyAverage {
    pub hour: u32,
    pub value: f64,
}

/// Average minimum amount per ISO weekday (1 = Monday .. 7 = Sunday).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct WeekdayAverage {
    pub day_of_week: u32,
    pub value: f64,
}

/// Average minimum amount per calendar day of month (1-31).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct MonthDayAverage {
    pub day_of_month: u32,
    pub value: f64,
}

/// How often a station appeared in the cheapest set, relative to the number
/// of windowed observations.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct StationFrequency {
    pub station: Id<Station>,
    pub frequency: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn date_range_parses_known_values() {
        assert_eq!(DateRange::parse("1w"), Some(DateRange::OneWeek));
        assert_eq!(DateRange::parse("1m"), Some(DateRange::OneMonth));
        assert_eq!(DateRange::parse("3m"), Some(DateRange::ThreeMonths));
        assert_eq!(DateRange::parse("6m"), Some(DateRange::SixMonths));
        assert_eq!(DateRange::parse("12m"), None);
        assert_eq!(DateRange::parse(""), None);
    }

    #[test]
    fn date_range_uses_fixed_day_counts() {
        assert_eq!(DateRange::OneWeek.days_back(), 7);
        assert_eq!(DateRange::OneMonth.days_back(), 31);
        assert_eq!(DateRange::ThreeMonths.days_back(), 93);
        assert_eq!(DateRange::SixMonths.days_back(), 186);
    }

    #[test]
    fn cutoff_is_relative_to_the_passed_instant() {
        let now = Local::now();
        assert_eq!(DateRange::OneMonth.cutoff(now), now - Duration::days(31));
    }

    #[test]
    fn history_point_exposes_only_the_minimum_amount() {
        let observation = WithId::new(
            Id::new(4),
            PriceObservation {
                location: Id::new(2),
                datetime: Local::now(),
                stations: vec![Id::new(10), Id::new(11)],
                stats: PriceStatistics {
                    min_amount: 1.1,
                    max_amount: 1.9,
                    average_amount: 1.4,
                    median_amount: 1.3,
                },
            },
        );
        let point = HistoryPoint::from(observation.clone());
        assert_eq!(point.id, observation.id);
        assert_eq!(point.min_amount, 1.1);
        let json = serde_json::to_value(&point).unwrap();
        assert!(json.get("maxAmount").is_none());
        assert!(json.get("averageAmount").is_none());
        assert!(json.get("medianAmount").is_none());
    }
}
