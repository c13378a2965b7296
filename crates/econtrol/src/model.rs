//! Raw response shapes of the E-Control API.

use model::location::FuelType;
use serde::Deserialize;

/// One element of the station search response.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GasStationEntry {
    pub id: i64,
    // Some stations come without a name; a display name is derived from the
    // address during parsing.
    #[serde(default)]
    pub name: Option<String>,
    pub location: StationLocation,
    // Closed stations are returned with an empty price list.
    #[serde(default)]
    pub prices: Vec<FuelPrice>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StationLocation {
    pub address: String,
    pub postal_code: String,
    pub city: String,
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FuelPrice {
    pub fuel_type: FuelType,
    pub amount: f64,
}

/// Structured body the API sends along with non-2xx responses.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiErrorBody {
    pub code: i32,
    pub name: String,
    pub exception_message: String,
}
