//! Driving route between two points via an OSRM server.
//!
//! The route is requested as a GeoJSON line, drawn on
//! [`ROUTE_LAYER`](crate::render::ROUTE_LAYER) and its bounds are used to fit
//! the camera.

use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, warn};

use crate::coord::{GeoPoint, TileBounds};
use crate::http::{AsyncHttpClient, HttpError};
use crate::render::{Feature, FeatureCollection, Geometry, RenderSink, ROUTE_LAYER};

/// Default OSRM server.
pub const DEFAULT_OSRM_URL: &str = "http://localhost:5000";

/// Default routing profile.
pub const DEFAULT_ROUTE_PROFILE: &str = "driving";

/// Errors from route fetching.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RouteError {
    #[error("Route request failed: {0}")]
    Http(#[from] HttpError),

    #[error("Failed to parse route response: {0}")]
    Json(String),

    /// OSRM answered with a code other than `Ok`.
    #[error("Routing service error: {0}")]
    Api(String),

    #[error("No route found")]
    NoRoute,
}

/// OSRM server settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteSourceConfig {
    pub osrm_url: String,
    pub profile: String,
}

impl Default for RouteSourceConfig {
    fn default() -> Self {
        Self {
            osrm_url: DEFAULT_OSRM_URL.to_string(),
            profile: DEFAULT_ROUTE_PROFILE.to_string(),
        }
    }
}

/// A route as a polyline plus totals.
#[derive(Debug, Clone, PartialEq)]
pub struct Route {
    pub coordinates: Vec<GeoPoint>,
    /// Meters.
    pub distance_m: f64,
    /// Seconds.
    pub duration_s: f64,
}

impl Route {
    /// Bounding box of the route, for fitting the camera.
    pub fn bounds(&self) -> Option<TileBounds> {
        TileBounds::from_points(&self.coordinates)
    }

    pub fn to_feature(&self) -> Feature {
        Feature::new(Geometry::line_string(&self.coordinates))
            .with_property("distance_m", self.distance_m)
            .with_property("duration_s", self.duration_s)
    }

    pub fn to_collection(&self) -> FeatureCollection {
        FeatureCollection::new(vec![self.to_feature()])
    }
}

/// Draws `route` on the route layer.
pub fn render_route<R: RenderSink + ?Sized>(route: &Route, sink: &R) {
    sink.render(ROUTE_LAYER, route.to_collection());
}

#[derive(Deserialize)]
struct OsrmRouteResponse {
    code: String,
    #[serde(default)]
    routes: Vec<OsrmRoute>,
}

#[derive(Deserialize)]
struct OsrmRoute {
    geometry: OsrmGeometry,
    #[serde(default)]
    distance: f64,
    #[serde(default)]
    duration: f64,
}

#[derive(Deserialize)]
struct OsrmGeometry {
    coordinates: Vec<[f64; 2]>,
}

/// Fetches routes from OSRM's `/route` service.
pub struct RouteSource<C: AsyncHttpClient> {
    client: C,
    config: RouteSourceConfig,
}

impl<C: AsyncHttpClient> RouteSource<C> {
    pub fn new(client: C, config: RouteSourceConfig) -> Self {
        Self { client, config }
    }

    /// URL for a route from `from` to `to`. OSRM takes `lng,lat` pairs.
    pub fn route_url(&self, from: GeoPoint, to: GeoPoint) -> String {
        format!(
            "{}/route/v1/{}/{},{};{},{}?geometries=geojson&overview=full",
            self.config.osrm_url.trim_end_matches('/'),
            self.config.profile,
            from.lng,
            from.lat,
            to.lng,
            to.lat
        )
    }

    /// Fetches the first route OSRM proposes.
    pub async fn fetch_route(&self, from: GeoPoint, to: GeoPoint) -> Result<Route, RouteError> {
        let url = self.route_url(from, to);
        let bytes = self.client.get(&url).await?;

        let route = parse_route_response(&bytes).inspect_err(|e| {
            warn!(%url, error = %e, "Route lookup failed");
        })?;

        debug!(
            points = route.coordinates.len(),
            distance_m = route.distance_m,
            duration_s = route.duration_s,
            "Route received"
        );
        Ok(route)
    }
}

fn parse_route_response(bytes: &[u8]) -> Result<Route, RouteError> {
    let response: OsrmRouteResponse =
        serde_json::from_slice(bytes).map_err(|e| RouteError::Json(e.to_string()))?;

    if response.code != "Ok" {
        return Err(RouteError::Api(response.code));
    }

    let route = response.routes.into_iter().next().ok_or(RouteError::NoRoute)?;
    if route.geometry.coordinates.is_empty() {
        return Err(RouteError::NoRoute);
    }

    Ok(Route {
        coordinates: route
            .geometry
            .coordinates
            .into_iter()
            .map(|[lng, lat]| GeoPoint::new(lat, lng))
            .collect(),
        distance_m: route.distance,
        duration_s: route.duration,
    })
}
