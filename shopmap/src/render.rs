//! Rendering sink for map layers.
//!
//! The map display draws GeoJSON sources keyed by layer id. The fetch core
//! hands it [`FeatureCollection`]s through the [`RenderSink`] trait and never
//! touches the display directly.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use serde::ser::{SerializeStruct, Serializer};
use serde::Serialize;

use crate::coord::GeoPoint;

/// Layer that shows stores fetched for the viewport.
pub const STORE_LAYER: &str = "store-layer";

/// Layer that shows the driving route.
pub const ROUTE_LAYER: &str = "route-layer";

/// A GeoJSON position, `[longitude, latitude]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Position(pub [f64; 2]);

impl From<GeoPoint> for Position {
    fn from(point: GeoPoint) -> Self {
        Position([point.lng, point.lat])
    }
}

/// GeoJSON geometry subset used by the map layers.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "coordinates")]
pub enum Geometry {
    Point(Position),
    LineString(Vec<Position>),
    Polygon(Vec<Vec<Position>>),
}

impl Geometry {
    pub fn point(point: GeoPoint) -> Self {
        Geometry::Point(point.into())
    }

    pub fn line_string(points: &[GeoPoint]) -> Self {
        Geometry::LineString(points.iter().copied().map(Position::from).collect())
    }
}

/// A geometry with free-form properties.
#[derive(Debug, Clone, PartialEq)]
pub struct Feature {
    pub geometry: Geometry,
    pub properties: serde_json::Map<String, serde_json::Value>,
}

impl Feature {
    pub fn new(geometry: Geometry) -> Self {
        Self {
            geometry,
            properties: serde_json::Map::new(),
        }
    }

    pub fn with_property(mut self, key: &str, value: impl Into<serde_json::Value>) -> Self {
        self.properties.insert(key.to_string(), value.into());
        self
    }
}

impl Serialize for Feature {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("Feature", 3)?;
        state.serialize_field("type", "Feature")?;
        state.serialize_field("geometry", &self.geometry)?;
        state.serialize_field("properties", &self.properties)?;
        state.end()
    }
}

/// Collection of features drawn as one layer.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeatureCollection {
    pub features: Vec<Feature>,
}

impl FeatureCollection {
    pub fn new(features: Vec<Feature>) -> Self {
        Self { features }
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    /// GeoJSON text for the collection.
    pub fn to_geojson(&self) -> String {
        // Serializing plain maps, strings and finite numbers cannot fail;
        // non-finite numbers become `null`.
        serde_json::to_string(self).unwrap_or_else(|_| String::from("{}"))
    }
}

impl Serialize for FeatureCollection {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("FeatureCollection", 2)?;
        state.serialize_field("type", "FeatureCollection")?;
        state.serialize_field("features", &self.features)?;
        state.end()
    }
}

/// Receives geometry for the display layer.
///
/// Called from the session's evaluation path once per successful fetch;
/// implementations forward to whatever thread owns the map widget.
pub trait RenderSink: Send + Sync {
    /// Replaces the contents of `layer_id` with `collection`.
    fn render(&self, layer_id: &str, collection: FeatureCollection);
}

impl<T: RenderSink + ?Sized> RenderSink for Arc<T> {
    fn render(&self, layer_id: &str, collection: FeatureCollection) {
        (**self).render(layer_id, collection)
    }
}

/// Sink that keeps the latest collection per layer in memory.
///
/// Useful for headless runs and tests.
#[derive(Debug, Default)]
pub struct MemoryRenderSink {
    layers: Mutex<HashMap<String, FeatureCollection>>,
    renders: Mutex<Vec<String>>,
}

impl MemoryRenderSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Latest collection drawn on `layer_id`.
    pub fn layer(&self, layer_id: &str) -> Option<FeatureCollection> {
        self.layers
            .lock()
            .ok()
            .and_then(|layers| layers.get(layer_id).cloned())
    }

    /// Layer ids in the order they were rendered.
    pub fn render_log(&self) -> Vec<String> {
        self.renders
            .lock()
            .map(|renders| renders.clone())
            .unwrap_or_default()
    }

    pub fn render_count(&self) -> usize {
        self.renders.lock().map(|r| r.len()).unwrap_or(0)
    }
}

impl RenderSink for MemoryRenderSink {
    fn render(&self, layer_id: &str, collection: FeatureCollection) {
        if let Ok(mut layers) = self.layers.lock() {
            layers.insert(layer_id.to_string(), collection);
        }
        if let Ok(mut renders) = self.renders.lock() {
            renders.push(layer_id.to_string());
        }
    }
}
