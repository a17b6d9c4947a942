//! `shopmap fetch`: evaluate one viewport against the store endpoint.

use std::sync::Arc;

use clap::Args;
use shopmap::cache::TileCache;
use shopmap::http::AsyncReqwestClient;
use shopmap::render::{FeatureCollection, MemoryRenderSink, STORE_LAYER};
use shopmap::stores::{FetchError, HttpStoreSource};
use shopmap::viewport::{FetchOutcome, ViewportFetcher};
use tracing::info;

use super::common::{to_json, CommandContext, ViewportArgs};
use crate::error::CliError;

/// Arguments for `shopmap fetch`.
#[derive(Debug, Args)]
pub struct FetchArgs {
    #[command(flatten)]
    pub viewport: ViewportArgs,

    /// Store endpoint, overriding [stores] endpoint from the config file
    #[arg(long)]
    pub endpoint: Option<String>,
}

/// Run `shopmap fetch`.
pub fn run(ctx: &CommandContext, args: FetchArgs) -> Result<(), CliError> {
    let viewport = args.viewport.to_viewport()?;

    let mut source_config = ctx.config.store_source_config();
    if let Some(endpoint) = args.endpoint {
        source_config.endpoint = endpoint;
    }
    if !source_config.is_configured() {
        return Err(CliError::Fetch(FetchError::NotConfigured));
    }

    let client = AsyncReqwestClient::with_timeout(source_config.timeout)?;
    let source = HttpStoreSource::new(client, source_config);
    let sink = Arc::new(MemoryRenderSink::new());
    let mut fetcher = ViewportFetcher::new(source, Arc::clone(&sink))
        .with_config(ctx.config.fetch_config())
        .with_cache(TileCache::new(ctx.config.tile_cache_config()));

    let runtime = ctx.runtime()?;
    let outcome = runtime.block_on(fetcher.on_viewport_changed(&viewport));

    match outcome {
        FetchOutcome::Fetched { range, items } => {
            info!(range = %range, items = items.len(), "Fetch complete");
            let layer = sink.layer(STORE_LAYER).unwrap_or_default();
            println!("{}", to_json(&layer)?);
            Ok(())
        }
        FetchOutcome::BelowMinZoom => {
            eprintln!(
                "Zoom {} is below the fetch floor ({}); nothing fetched.",
                viewport.zoom,
                fetcher.config().min_fetch_zoom
            );
            println!("{}", to_json(&FeatureCollection::default())?);
            Ok(())
        }
        FetchOutcome::CacheHit(range) => {
            // Unreachable with a fresh cache
            eprintln!("All tiles of {} already served.", range);
            Ok(())
        }
        FetchOutcome::Failed { error, .. } => Err(CliError::Fetch(error)),
        FetchOutcome::Rejected(e) => Err(CliError::Coord(e)),
    }
}
