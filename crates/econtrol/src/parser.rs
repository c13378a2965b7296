use model::{price::PriceRecord, station::Station, WithId};
use price_tracking::source::SourceBatch;
use utility::geo::round_coordinate;
use utility::id::Id;

use crate::model::GasStationEntry;

/// Converts the raw entries of one station search response into usable
/// price records.
///
/// A malformed entry only drops that entry, never the batch; the ingestion
/// orchestrator decides what an entirely unusable batch means.
pub fn parse_entries(raw: Vec<serde_json::Value>) -> SourceBatch {
    let entry_count = raw.len();
    let records = raw
        .into_iter()
        .filter_map(|value| match serde_json::from_value::<GasStationEntry>(value)
        {
            Ok(entry) => parse_entry(entry),
            Err(why) => {
                log::warn!("dropping malformed station entry: {why}");
                None
            }
        })
        .collect();
    SourceBatch {
        entry_count,
        records,
    }
}

/// Parses a single station entry, or `None` for entries without any price.
///
/// Price-less entries belong to closed stations; experience shows the API
/// returns them at least sometimes even when they are not requested.
///
/// The API may list several prices per station, with the queried fuel type
/// always first; only that first entry is used. The amount is carried as a
/// decimal string, coordinates are rounded to the precision the rest of the
/// system works with.
pub fn parse_entry(entry: GasStationEntry) -> Option<PriceRecord> {
    let price = entry.prices.first()?;
    let fuel_type = price.fuel_type;
    let amount = price.amount.to_string();

    let location = entry.location;
    let name = entry.name.unwrap_or_else(|| {
        format!(
            "{}, {} {}",
            location.address, location.postal_code, location.city
        )
    });

    let station = Station {
        name,
        address: location.address,
        postal_code: location.postal_code,
        city: location.city,
        latitude: round_coordinate(location.latitude),
        longitude: round_coordinate(location.longitude),
    };

    Some(PriceRecord {
        station: WithId::new(Id::new(entry.id), station),
        fuel_type,
        amount,
    })
}
