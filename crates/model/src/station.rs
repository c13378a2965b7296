use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use utility::id::HasId;

use crate::ExampleData;

/// A physical gas station as reported by the upstream API.
///
/// The id is the upstream-supplied identifier and doubles as the primary
/// key; it is never generated locally.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Station {
    pub name: String,
    pub address: String,
    pub postal_code: String,
    pub city: String,
    pub latitude: f64,
    pub longitude: f64,
}

impl HasId for Station {
    type IdType = i64;
}

impl ExampleData for Station {
    fn example_data() -> Self {
        Station {
            name: "Tankstelle Praterstern".to_owned(),
            address: "Praterstern 1".to_owned(),
            postal_code: "1020".to_owned(),
            city: "Wien".to_owned(),
            latitude: 48.2186522,
            longitude: 16.3911323,
        }
    }
}
