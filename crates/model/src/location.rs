use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use utility::id::{HasId, Id};

use crate::ExampleData;

/// Marker for the account-owning side of the system. Accounts themselves
/// live in the session layer; this core only ever refers to them by id.
#[derive(Debug, Clone, Copy, JsonSchema)]
pub struct User;

impl HasId for User {
    type IdType = i64;
}

/// Fuel types supported by the upstream price API.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema,
)]
pub enum FuelType {
    #[serde(rename = "DIE")]
    Diesel,
    #[serde(rename = "SUP")]
    Super,
    #[serde(rename = "GAS")]
    Gas,
}

impl FuelType {
    /// The code used both in upstream query strings and in storage.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Diesel => "DIE",
            Self::Super => "SUP",
            Self::Gas => "GAS",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "DIE" => Some(Self::Diesel),
            "SUP" => Some(Self::Super),
            "GAS" => Some(Self::Gas),
            _ => None,
        }
    }
}

/// Administrative region kinds the upstream API can be queried by.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema,
)]
pub enum RegionType {
    #[serde(rename = "BL")]
    Bundesland,
    #[serde(rename = "PB")]
    District,
}

impl RegionType {
    pub fn code(&self) -> &'static str {
        match self {
            Self::Bundesland => "BL",
            Self::District => "PB",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "BL" => Some(Self::Bundesland),
            "PB" => Some(Self::District),
            _ => None,
        }
    }
}

/// The two mutually exclusive ways a location can be tracked. Modelling this
/// as a sum type makes the "coordinates and region populated at once" state
/// unrepresentable; the storage layer mirrors it with a CHECK constraint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum LocationKind {
    #[serde(rename_all = "camelCase")]
    Address { latitude: f64, longitude: f64 },
    #[serde(rename_all = "camelCase")]
    Region { code: i32, region_type: RegionType },
}

/// A user-defined place or region whose fuel prices are tracked.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Location {
    pub name: String,
    #[serde(flatten)]
    pub kind: LocationKind,
    pub fuel_type: FuelType,
    // Never taken from client input and never exposed; always set from the
    // authenticated user.
    #[serde(skip)]
    pub user: Id<User>,
}

impl HasId for Location {
    type IdType = i64;
}

impl ExampleData for Location {
    fn example_data() -> Self {
        Location {
            name: "Home".to_owned(),
            kind: LocationKind::Address {
                latitude: 48.2082,
                longitude: 16.3738,
            },
            fuel_type: FuelType::Diesel,
            user: Id::new(1),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fuel_type_codes_round_trip() {
        for fuel_type in [FuelType::Diesel, FuelType::Super, FuelType::Gas] {
            assert_eq!(FuelType::from_code(fuel_type.code()), Some(fuel_type));
        }
        assert_eq!(FuelType::from_code("XXX"), None);
    }

    #[test]
    fn region_type_codes_round_trip() {
        for region_type in [RegionType::Bundesland, RegionType::District] {
            assert_eq!(
                RegionType::from_code(region_type.code()),
                Some(region_type)
            );
        }
        assert_eq!(RegionType::from_code(""), None);
    }

    #[test]
    fn location_kind_serializes_tagged() {
        let kind = LocationKind::Region {
            code: 7,
            region_type: RegionType::District,
        };
        let json = serde_json::to_value(&kind).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"type": "region", "code": 7, "regionType": "PB"})
        );
    }
}
