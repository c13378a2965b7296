use std::error;

use async_trait::async_trait;
use model::{location::Location, price::PriceRecord};

/// Outcome of one upstream fetch: how many raw entries the API returned and
/// the subset that carried a usable price. Entries without price data are
/// expected (closed stations) and are dropped during parsing; keeping the
/// raw count lets the ingestion orchestrator tell a benign empty response
/// apart from a batch where every entry was unusable.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceBatch {
    pub entry_count: usize,
    pub records: Vec<PriceRecord>,
}

/// A provider of current station prices for a location.
#[async_trait]
pub trait PriceSource: Send + Sync {
    type Error: error::Error + Send + Sync + 'static;

    async fn fetch_station_prices(
        &self,
        location: &Location,
    ) -> Result<SourceBatch, Self::Error>;
}
