//! Request and response DTOs for the Climatiq API.
//!
//! # Design
//! The upstream owns these schemas. Request models serialize only the fields
//! that are set. Response models type the fields callers commonly read and
//! keep everything else in a flattened `extra` map, so a response can be
//! relayed without losing data. Shapes are trusted as-is; serde is the only
//! check.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// GWP horizon used by the upstream to compute CO2e.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CalculationMethod {
    Ar4,
    Ar5,
    Ar6,
}

// ---------------------------------------------------------------------------
// Requests
// ---------------------------------------------------------------------------

/// Search filters for `POST /search`. `SelectorModel::default()` serializes to `{}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SelectorModel {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub query: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub activity_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sector: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_dataset: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub year: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub year_released: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_lca_activity: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub access_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub calculation_method: Option<CalculationMethod>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub results_per_page: Option<u32>,
}

/// Lookup keys for `GET /emission-factors`, sent as query parameters.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParametersModel {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub activity_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub year: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub calculation_method: Option<CalculationMethod>,
}

/// Identifies the factor an estimate should use.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EmissionFactorSelector {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub activity_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub year: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

/// Body of `POST /estimate`.
///
/// `parameters` is activity-specific, e.g. `{"energy": 100, "energy_unit": "kWh"}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EstimationModel {
    pub emission_factor: EmissionFactorSelector,
    pub parameters: Map<String, Value>,
}

/// Query parameters for `GET /data/v1/search`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub query: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub year: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub calculation_method: Option<CalculationMethod>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub results_per_page: Option<u32>,
}

// ---------------------------------------------------------------------------
// Responses
// ---------------------------------------------------------------------------

/// One emission factor as the upstream returned it.
///
/// The JSON object is kept whole so that re-serializing gives back exactly
/// what was received (integer factors, `null`s and unexpected value types
/// included). The accessors are typed views that return `None` when a field
/// is absent or has another shape.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EmissionFactorResponse {
    pub fields: Map<String, Value>,
}

impl EmissionFactorResponse {
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    fn str_field(&self, key: &str) -> Option<&str> {
        self.fields.get(key).and_then(Value::as_str)
    }

    pub fn activity_id(&self) -> Option<&str> {
        self.str_field("activity_id")
    }

    pub fn id(&self) -> Option<&str> {
        self.str_field("id")
    }

    pub fn name(&self) -> Option<&str> {
        self.str_field("name")
    }

    pub fn category(&self) -> Option<&str> {
        self.str_field("category")
    }

    pub fn source(&self) -> Option<&str> {
        self.str_field("source")
    }

    pub fn region(&self) -> Option<&str> {
        self.str_field("region")
    }

    pub fn unit_type(&self) -> Option<&str> {
        self.str_field("unit_type")
    }

    pub fn unit(&self) -> Option<&str> {
        self.str_field("unit")
    }

    pub fn factor(&self) -> Option<f64> {
        self.fields.get("factor").and_then(Value::as_f64)
    }

    /// Accepts a number or a numeric string (`2021` or `"2021"`).
    pub fn year(&self) -> Option<u16> {
        match self.fields.get("year")? {
            Value::Number(n) => n.as_u64().and_then(|y| u16::try_from(y).ok()),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }
}

impl From<Map<String, Value>> for EmissionFactorResponse {
    fn from(fields: Map<String, Value>) -> Self {
        Self { fields }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityData {
    pub activity_value: f64,
    pub activity_unit: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EstimationResponse {
    pub co2e: f64,
    pub co2e_unit: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub co2e_calculation_method: Option<CalculationMethod>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub emission_factor: Option<EmissionFactorResponse>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub activity_data: Option<ActivityData>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// One selectable unit type and its units.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitType {
    pub unit_type: String,
    pub units: Vec<String>,
}

/// Response of `GET /unit-types`.
///
/// Serializes as `{"unit_types": [...]}`; deserializes from that or from a
/// bare array.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "UnitTypesPayload")]
pub struct UnitTypesResponse {
    pub unit_types: Vec<UnitType>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum UnitTypesPayload {
    Wrapped { unit_types: Vec<UnitType> },
    Bare(Vec<UnitType>),
}

impl From<UnitTypesPayload> for UnitTypesResponse {
    fn from(payload: UnitTypesPayload) -> Self {
        match payload {
            UnitTypesPayload::Wrapped { unit_types } | UnitTypesPayload::Bare(unit_types) => {
                Self { unit_types }
            }
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DataVersionsResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latest_release: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latest_major: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latest_minor: Option<u32>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Management metadata; the upstream schema is opaque.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ManagementResponse {
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

/// A search hit from `GET /data/v1/search`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmissionFactor {
    pub id: String,
    pub name: String,
    pub category: String,
    pub source: String,
    pub region: String,
    pub year: u16,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResponse {
    pub results: Vec<EmissionFactor>,
    pub current_page: u32,
    pub last_page: u32,
    pub total_results: u64,
}
