//! `shopmap replay`: feed recorded camera-idle events through a debounced
//! session.
//!
//! The input holds one JSON object per line; `delay_ms` is the pause before
//! the event is sent:
//!
//! ```text
//! {"delay_ms": 0,  "top_left": {"lat": 10.78, "lng": 106.69}, "top_right": {...}, "bottom_left": {...}, "bottom_right": {...}, "zoom": 16}
//! {"delay_ms": 40, "north": 10.78, "west": 106.69, "south": 10.77, "east": 106.71, "zoom": 16}
//! ```
//!
//! Blank lines and lines starting with `#` are skipped.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use clap::Args;
use serde::Deserialize;
use shopmap::cache::TileCache;
use shopmap::coord::{GeoPoint, TileRange, Viewport};
use shopmap::http::AsyncReqwestClient;
use shopmap::render::{MemoryRenderSink, STORE_LAYER};
use shopmap::stores::{FetchError, HttpStoreSource, Store, StoreSource};
use shopmap::viewport::{FetchOutcome, MapSession, ViewportFetcher};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::info;

use super::common::{to_json, CommandContext};
use crate::error::CliError;

/// Arguments for `shopmap replay`.
#[derive(Debug, Args)]
pub struct ReplayArgs {
    /// File with one camera event per line
    pub file: PathBuf,

    /// Do not contact the store endpoint; every fetch returns no stores
    #[arg(long)]
    pub dry_run: bool,

    /// Print the final store layer as GeoJSON
    #[arg(long)]
    pub geojson: bool,
}

/// One recorded camera-idle event.
#[derive(Debug, Clone, PartialEq)]
pub struct CameraEvent {
    pub delay: Duration,
    pub viewport: Viewport,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawCorners {
    Screen {
        top_left: GeoPoint,
        top_right: GeoPoint,
        bottom_left: GeoPoint,
        bottom_right: GeoPoint,
    },
    Bounds {
        north: f64,
        west: f64,
        south: f64,
        east: f64,
    },
}

#[derive(Deserialize)]
struct RawEvent {
    #[serde(default)]
    delay_ms: u64,
    zoom: i32,
    #[serde(flatten)]
    corners: RawCorners,
}

/// Parses a replay file's contents.
pub fn parse_events(content: &str) -> Result<Vec<CameraEvent>, CliError> {
    let mut events = Vec::new();

    for (index, line) in content.lines().enumerate() {
        let line_number = index + 1;
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let replay_error = |message: String| CliError::Replay {
            line: line_number,
            message,
        };

        let raw: RawEvent =
            serde_json::from_str(line).map_err(|e| replay_error(e.to_string()))?;

        let viewport = match raw.corners {
            RawCorners::Screen {
                top_left,
                top_right,
                bottom_left,
                bottom_right,
            } => Viewport::new(top_left, top_right, bottom_left, bottom_right, raw.zoom),
            RawCorners::Bounds {
                north,
                west,
                south,
                east,
            } => Viewport::from_bounds(
                GeoPoint::new(north, west),
                GeoPoint::new(south, east),
                raw.zoom,
            ),
        }
        .map_err(|e| replay_error(e.to_string()))?;

        events.push(CameraEvent {
            delay: Duration::from_millis(raw.delay_ms),
            viewport,
        });
    }

    Ok(events)
}

fn read_events(path: &Path) -> Result<Vec<CameraEvent>, CliError> {
    let content = std::fs::read_to_string(path).map_err(|error| CliError::FileRead {
        path: path.display().to_string(),
        error,
    })?;
    parse_events(&content)
}

/// Store source for dry runs: accepts every request and returns no stores.
struct DryRunSource;

impl StoreSource for DryRunSource {
    async fn fetch_stores(&self, zoom: u8, range: &TileRange) -> Result<Vec<Store>, FetchError> {
        info!(zoom, range = %range, "Dry run: would fetch stores");
        Ok(Vec::new())
    }
}

/// One printed line per evaluation.
fn describe(outcome: &FetchOutcome) -> String {
    match outcome {
        FetchOutcome::BelowMinZoom => "below_min_zoom".to_string(),
        FetchOutcome::CacheHit(range) => format!("cache_hit {}", range),
        FetchOutcome::Fetched { range, items } => {
            format!("fetched {} tiles={} items={}", range, range.tile_count(), items.len())
        }
        FetchOutcome::Failed { range, error } => format!("failed {} error=\"{}\"", range, error),
        FetchOutcome::Rejected(e) => format!("rejected error=\"{}\"", e),
    }
}

/// Run `shopmap replay`.
pub fn run(ctx: &CommandContext, args: ReplayArgs) -> Result<(), CliError> {
    let events = read_events(&args.file)?;
    info!(events = events.len(), file = %args.file.display(), "Replaying camera events");

    let runtime = ctx.runtime()?;
    let sink = Arc::new(MemoryRenderSink::new());

    if args.dry_run {
        runtime.block_on(replay(ctx, DryRunSource, Arc::clone(&sink), events));
    } else {
        let source_config = ctx.config.store_source_config();
        if !source_config.is_configured() {
            return Err(CliError::Fetch(FetchError::NotConfigured));
        }
        let client = AsyncReqwestClient::with_timeout(source_config.timeout)?;
        let source = HttpStoreSource::new(client, source_config);
        runtime.block_on(replay(ctx, source, Arc::clone(&sink), events));
    }

    if args.geojson {
        let layer = sink.layer(STORE_LAYER).unwrap_or_default();
        println!("{}", to_json(&layer)?);
    }
    Ok(())
}

async fn replay<S: StoreSource + 'static>(
    ctx: &CommandContext,
    source: S,
    sink: Arc<MemoryRenderSink>,
    events: Vec<CameraEvent>,
) {
    let fetcher = ViewportFetcher::new(source, sink)
        .with_config(ctx.config.fetch_config())
        .with_cache(TileCache::new(ctx.config.tile_cache_config()));

    let (outcome_tx, mut outcome_rx) = mpsc::unbounded_channel();
    let session = MapSession::spawn_with_outcomes(
        fetcher,
        ctx.config.session_config(),
        CancellationToken::new(),
        outcome_tx,
    );

    let printer = tokio::spawn(async move {
        let mut evaluations = 0usize;
        while let Some(outcome) = outcome_rx.recv().await {
            println!("{}", describe(&outcome));
            evaluations += 1;
        }
        evaluations
    });

    let sent = events.len();
    for event in events {
        tokio::time::sleep(event.delay).await;
        session.camera_idle(event.viewport);
    }

    session.finish().await;
    // The session dropped its outcome sender, so the printer drains and ends
    let evaluations = printer.await.unwrap_or_default();

    info!(events = sent, evaluations, "Replay complete");
}
