//! shopmap CLI - Command-line interface
//!
//! This binary exposes the shopmap library: tile math, one-shot store
//! fetches, OSRM routes and replays of recorded camera sessions.

mod commands;
mod error;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use commands::config::ConfigCommands;
use commands::fetch::FetchArgs;
use commands::replay::ReplayArgs;
use commands::route::RouteArgs;
use commands::tile::{RangeArgs, TileArgs};
use error::CliError;

#[derive(Parser)]
#[command(name = "shopmap")]
#[command(version = shopmap::VERSION)]
#[command(about = "Viewport-driven store fetching for map screens", long_about = None)]
struct Cli {
    /// Config file to use instead of ~/.shopmap/config.ini
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log at debug level (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the tile containing a point and its bounds
    Tile(TileArgs),

    /// Show the padded tile range covering a viewport
    Range(RangeArgs),

    /// Evaluate one viewport against the store endpoint and print GeoJSON
    Fetch(FetchArgs),

    /// Fetch a route from the OSRM server and print GeoJSON
    Route(RouteArgs),

    /// Feed recorded camera-idle events through a debounced session
    Replay(ReplayArgs),

    /// Manage the configuration file
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Tile(args) => commands::tile::run_tile(args),
        Commands::Range(args) => commands::tile::run_range(args),
        Commands::Fetch(args) => {
            let context = commands::common::CommandContext::new(cli.config, cli.verbose);
            context.and_then(|ctx| commands::fetch::run(&ctx, args))
        }
        Commands::Route(args) => {
            let context = commands::common::CommandContext::new(cli.config, cli.verbose);
            context.and_then(|ctx| commands::route::run(&ctx, args))
        }
        Commands::Replay(args) => {
            let context = commands::common::CommandContext::new(cli.config, cli.verbose);
            context.and_then(|ctx| commands::replay::run(&ctx, args))
        }
        Commands::Config { command } => commands::config::run(command, cli.config),
    };

    if let Err(e) = result {
        e.exit();
    }
}
