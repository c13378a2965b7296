use itertools::Itertools;
use model::{
    price::{PriceRecord, PriceStatistics},
    station::Station,
    WithId,
};

use crate::{RequestError, RequestResult};

/// Reduces the parsed price records of one ingestion run to the cheapest
/// station set and the aggregate statistics.
///
/// The cheapest set contains every record priced `<=` the minimum rather
/// than `==`, which tolerates the noise introduced by the decimal-to-float
/// conversion; in practice it is the set of all stations tied at the
/// minimum, with no arbitrary tie-break.
///
/// Calling this with zero records is a precondition violation; the caller
/// has to skip the call when parsing produced nothing.
pub fn compute_statistics(
    records: &[PriceRecord],
) -> RequestResult<(Vec<WithId<Station>>, PriceStatistics)> {
    assert!(
        !records.is_empty(),
        "compute_statistics requires at least one price record"
    );

    let mut amounts = Vec::with_capacity(records.len());
    for record in records {
        let amount: f64 = record.amount.parse().map_err(|_| {
            RequestError::DataIntegrity(format!(
                "unparsable price amount {:?} for station {}",
                record.amount, record.station.id
            ))
        })?;
        amounts.push(amount);
    }

    let min_amount = amounts.iter().copied().fold(f64::INFINITY, f64::min);
    let max_amount = amounts.iter().copied().fold(f64::NEG_INFINITY, f64::max);

    let cheapest = records
        .iter()
        .zip(&amounts)
        .filter(|(_, amount)| **amount <= min_amount)
        .map(|(record, _)| record.station.clone())
        .collect::<Vec<_>>();

    let average_amount = amounts.iter().sum::<f64>() / amounts.len() as f64;
    let median_amount = median(&amounts);

    Ok((
        cheapest,
        PriceStatistics {
            min_amount,
            max_amount,
            average_amount,
            median_amount,
        },
    ))
}

fn median(amounts: &[f64]) -> f64 {
    let sorted = amounts
        .iter()
        .copied()
        .sorted_by(|a, b| a.total_cmp(b))
        .collect::<Vec<_>>();
    let middle = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        (sorted[middle - 1] + sorted[middle]) / 2.0
    } else {
        sorted[middle]
    }
}

#[cfg(test)]
mod tests {
    use model::location::FuelType;
    use utility::id::Id;

    use super::*;

    fn record(station_id: i64, amount: &str) -> PriceRecord {
        PriceRecord {
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
            fuel_type: FuelType::Diesel,
            amount: amount.to_owned(),
        }
    }

    #[test]
    fn includes_all_stations_tied_at_the_minimum() {
        let records = [
            record(1, "1.0"),
            record(2, "1.0"),
            record(3, "1.5"),
            record(4, "2.0"),
        ];
        let (cheapest, stats) = compute_statistics(&records).unwrap();

        let cheapest_ids =
            cheapest.iter().map(|s| s.id.raw()).collect::<Vec<_>>();
        assert_eq!(cheapest_ids, vec![1, 2]);
        assert_eq!(stats.min_amount, 1.0);
        assert_eq!(stats.max_amount, 2.0);
        assert_eq!(stats.average_amount, 1.375);
        assert_eq!(stats.median_amount, 1.25);
    }

    #[test]
    fn median_of_odd_count_is_the_middle_value() {
        let records = [record(1, "1.2"), record(2, "1.8"), record(3, "1.4")];
        let (_, stats) = compute_statistics(&records).unwrap();
        assert_eq!(stats.median_amount, 1.4);
    }

    #[test]
    fn single_record_is_its_own_statistics() {
        let records = [record(7, "1.339")];
        let (cheapest, stats) = compute_statistics(&records).unwrap();
        assert_eq!(cheapest.len(), 1);
        assert_eq!(cheapest[0].id.raw(), 7);
        assert_eq!(stats.min_amount, 1.339);
        assert_eq!(stats.max_amount, 1.339);
        assert_eq!(stats.average_amount, 1.339);
        assert_eq!(stats.median_amount, 1.339);
    }

    #[test]
    fn unparsable_amount_is_a_data_integrity_error() {
        let records = [record(1, "not-a-price")];
        match compute_statistics(&records) {
            Err(RequestError::DataIntegrity(_)) => {}
            other => panic!("expected data integrity error, got {other:?}"),
        }
    }

    #[test]
    #[should_panic]
    fn empty_input_violates_the_precondition() {
        let _ = compute_statistics(&[]);
    }
}
