//! Store listing types.

use serde::{Deserialize, Serialize};

use crate::coord::GeoPoint;
use crate::render::{Feature, Geometry};

/// A store returned by the backend.
///
/// Only the position is required. Fields the backend sends beyond `id`,
/// `name`, `lat` and `lng` are kept in `extra` and passed through to the
/// map layer as feature properties.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawStore")]
pub struct Store {
    pub id: String,
    pub name: String,
    pub lat: f64,
    pub lng: f64,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl Store {
    pub fn new(id: impl Into<String>, name: impl Into<String>, lat: f64, lng: f64) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            lat,
            lng,
            extra: serde_json::Map::new(),
        }
    }

    pub fn position(&self) -> GeoPoint {
        GeoPoint::new(self.lat, self.lng)
    }

    /// Point feature carrying the store's id, name and extra fields.
    pub fn to_feature(&self) -> Feature {
        let mut feature = Feature::new(Geometry::point(self.position()));
        feature.properties = self.extra.clone();
        feature
            .with_property("id", self.id.as_str())
            .with_property("name", self.name.as_str())
    }
}

/// Wire shape of a store item. Ids may be numbers or strings.
#[derive(Deserialize)]
struct RawStore {
    #[serde(default)]
    id: Option<serde_json::Value>,
    #[serde(default)]
    name: Option<String>,
    lat: f64,
    lng: f64,
    #[serde(flatten)]
    extra: serde_json::Map<String, serde_json::Value>,
}

impl From<RawStore> for Store {
    fn from(raw: RawStore) -> Self {
        let id = match raw.id {
            Some(serde_json::Value::String(s)) => s,
            Some(serde_json::Value::Null) | None => format!("{:.6},{:.6}", raw.lat, raw.lng),
            Some(other) => other.to_string(),
        };

        Store {
            id,
            name: raw.name.unwrap_or_default(),
            lat: raw.lat,
            lng: raw.lng,
            extra: raw.extra,
        }
    }
}
