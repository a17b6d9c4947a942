//! `shopmap route`: driving route between two points.

use clap::Args;
use serde::Serialize;
use shopmap::coord::{GeoPoint, TileBounds};
use shopmap::http::AsyncReqwestClient;
use shopmap::render::FeatureCollection;
use shopmap::route::{Route, RouteSource};

use super::common::{parse_point, to_json, CommandContext};
use crate::error::CliError;

/// Arguments for `shopmap route`.
#[derive(Debug, Args)]
pub struct RouteArgs {
    /// Start as lat,lng
    #[arg(long, value_parser = parse_point, allow_hyphen_values = true)]
    pub from: GeoPoint,

    /// Destination as lat,lng
    #[arg(long, value_parser = parse_point, allow_hyphen_values = true)]
    pub to: GeoPoint,

    /// OSRM server, overriding [route] osrm_url from the config file
    #[arg(long)]
    pub osrm_url: Option<String>,
}

#[derive(Serialize)]
struct RouteReport {
    distance_m: f64,
    duration_s: f64,
    bounds: Option<TileBounds>,
    geojson: FeatureCollection,
}

impl From<&Route> for RouteReport {
    fn from(route: &Route) -> Self {
        Self {
            distance_m: route.distance_m,
            duration_s: route.duration_s,
            bounds: route.bounds(),
            geojson: route.to_collection(),
        }
    }
}

/// Run `shopmap route`.
pub fn run(ctx: &CommandContext, args: RouteArgs) -> Result<(), CliError> {
    let mut config = ctx.config.route_source_config();
    if let Some(url) = args.osrm_url {
        config.osrm_url = url;
    }

    let source = RouteSource::new(AsyncReqwestClient::new()?, config);
    let runtime = ctx.runtime()?;
    let route = runtime.block_on(source.fetch_route(args.from, args.to))?;

    println!("{}", to_json(&RouteReport::from(&route))?);
    Ok(())
}
