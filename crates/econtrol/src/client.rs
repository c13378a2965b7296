use std::env;
use std::time::Duration;

use async_trait::async_trait;
use model::location::{Location, LocationKind};
use price_tracking::source::{PriceSource, SourceBatch};

use crate::model::ApiErrorBody;
use crate::{parser, ApiError, ECONTROL_API_URL};

/// How long a single price request may take. There is no retry; a timed out
/// run is simply repeated at the next scheduled tick.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

pub struct EControlClient {
    base_url: String,
    http: reqwest::Client,
}

impl EControlClient {
    pub fn new(base_url: impl Into<String>) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self {
            base_url: base_url.into(),
            http,
        })
    }

    /// Builds a client against `ECONTROL_API_URL`, falling back to the
    /// public API.
    pub fn from_env() -> Result<Self, ApiError> {
        let base_url =
            env::var("ECONTROL_API_URL").unwrap_or_else(|_| ECONTROL_API_URL.to_owned());
        Self::new(base_url)
    }

    /// Fetches the raw station entries for a location.
    ///
    /// Entries are returned undecoded so that a single malformed entry can
    /// be dropped during parsing instead of failing the whole response.
    pub async fn fetch_raw_entries(
        &self,
        location: &Location,
    ) -> Result<Vec<serde_json::Value>, ApiError> {
        let url = stations_url(&self.base_url, location);
        log::debug!("requesting station prices: {url}");

        let response = self.http.get(&url).send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(upstream_error(status, &body));
        }

        Ok(serde_json::from_str(&body)?)
    }
}

#[async_trait]
impl PriceSource for EControlClient {
    type Error = ApiError;

    async fn fetch_station_prices(
        &self,
        location: &Location,
    ) -> Result<SourceBatch, ApiError> {
        let raw = self.fetch_raw_entries(location).await?;
        Ok(parser::parse_entries(raw))
    }
}

/// Maps a non-2xx response to an error. The API documents a structured
/// error body; a body that does not match it fails the call with the decode
/// error instead.
fn upstream_error(status_code: reqwest::StatusCode, body: &str) -> ApiError {
    match serde_json::from_str::<ApiErrorBody>(body) {
        Ok(error) => ApiError::Upstream {
            status_code,
            code: error.code,
            name: error.name,
            message: error.exception_message,
        },
        Err(why) => ApiError::Json(why),
    }
}

/// The station search endpoint for a location, depending on whether it is
/// tracked by coordinates or by administrative region.
fn stations_url(base_url: &str, location: &Location) -> String {
    let fuel_type = location.fuel_type.code();
    match &location.kind {
        LocationKind::Address {
            latitude,
            longitude,
        } => format!(
            "{base_url}/search/gas-stations/by-address\
             ?latitude={latitude}&longitude={longitude}&fuelType={fuel_type}"
        ),
        LocationKind::Region { code, region_type } => format!(
            "{base_url}/search/gas-stations/by-region\
             ?code={code}&type={}&fuelType={fuel_type}",
            region_type.code()
        ),
    }
}
