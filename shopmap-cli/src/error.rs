//! CLI error handling with user-friendly messages.
//!
//! Centralizes error handling for the CLI, providing consistent formatting
//! and appropriate exit codes.

use std::fmt;
use std::process;

use shopmap::config::ConfigFileError;
use shopmap::coord::CoordError;
use shopmap::http::HttpError;
use shopmap::route::RouteError;
use shopmap::stores::FetchError;

/// CLI-specific errors with user-friendly messages.
#[derive(Debug)]
pub enum CliError {
    /// Failed to initialize logging
    LoggingInit(String),
    /// Config file could not be read or written
    ConfigFile(ConfigFileError),
    /// Command-line arguments that clap cannot check on its own
    InvalidArgument(String),
    /// Bad coordinates or zoom
    Coord(CoordError),
    /// HTTP client could not be created
    Http(HttpError),
    /// Store fetch failed
    Fetch(FetchError),
    /// Route lookup failed
    Route(RouteError),
    /// Failed to serialize output
    Output(String),
    /// Replay file problem
    Replay { line: usize, message: String },
    /// Failed to read an input file
    FileRead { path: String, error: std::io::Error },
    /// Failed to start the async runtime
    Runtime(std::io::Error),
}

impl CliError {
    /// Exit the process with an appropriate error message and code.
    pub fn exit(&self) -> ! {
        eprintln!("Error: {}", self);

        // Print additional help for specific errors
        match self {
            CliError::Fetch(FetchError::NotConfigured) => {
                eprintln!();
                eprintln!("Set the store endpoint in the config file:");
                eprintln!("  [stores]");
                eprintln!("  endpoint = https://your-backend/stores/tile");
                eprintln!("Run 'shopmap config path' to find the file.");
            }
            CliError::Route(RouteError::Http(HttpError::Request(_))) => {
                eprintln!();
                eprintln!("Is the OSRM server running? Set [route] osrm_url in the config file.");
            }
            _ => {}
        }

        process::exit(1)
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::LoggingInit(msg) => write!(f, "Failed to initialize logging: {}", msg),
            CliError::ConfigFile(e) => write!(f, "{}", e),
            CliError::InvalidArgument(msg) => write!(f, "Invalid arguments: {}", msg),
            CliError::Coord(e) => write!(f, "Invalid location: {}", e),
            CliError::Http(e) => write!(f, "{}", e),
            CliError::Fetch(e) => write!(f, "Failed to fetch stores: {}", e),
            CliError::Route(e) => write!(f, "Failed to fetch route: {}", e),
            CliError::Output(msg) => write!(f, "Failed to write output: {}", msg),
            CliError::Replay { line, message } => {
                write!(f, "Replay file line {}: {}", line, message)
            }
            CliError::FileRead { path, error } => {
                write!(f, "Failed to read file '{}': {}", path, error)
            }
            CliError::Runtime(e) => write!(f, "Failed to start async runtime: {}", e),
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CliError::ConfigFile(e) => Some(e),
            CliError::Coord(e) => Some(e),
            CliError::Http(e) => Some(e),
            CliError::Fetch(e) => Some(e),
            CliError::Route(e) => Some(e),
            CliError::FileRead { error, .. } => Some(error),
            CliError::Runtime(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ConfigFileError> for CliError {
    fn from(e: ConfigFileError) -> Self {
        CliError::ConfigFile(e)
    }
}

impl From<CoordError> for CliError {
    fn from(e: CoordError) -> Self {
        CliError::Coord(e)
    }
}

impl From<HttpError> for CliError {
    fn from(e: HttpError) -> Self {
        CliError::Http(e)
    }
}

impl From<RouteError> for CliError {
    fn from(e: RouteError) -> Self {
        CliError::Route(e)
    }
}
