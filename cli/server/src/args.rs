//! CLI argument definitions for evflow.

use clap::Parser;
pub use ev_cli_common::LogLevel;
use std::path::PathBuf;

/// Event transformation server.
///
/// Accepts events over HTTP, applies the configured envelope and
/// payload operation pipelines, and either replies with the transformed
/// event or forwards it to a downstream destination.
///
/// ## Examples
///
/// Reply mode with a transformation file:
///   evflow --config transformations.json
///
/// Forward mode:
///   evflow --config transformations.json --destination http://sink:8080/
#[derive(Parser, Debug)]
#[command(name = "evflow")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Address to listen on
    #[arg(short = 'L', long, env = "EVFLOW_LISTEN", default_value = "0.0.0.0:8080")]
    pub listen: String,

    /// Path to a JSON transformation configuration file.
    ///
    /// When omitted the server runs with empty pipelines and passes
    /// events through unchanged.
    #[arg(short = 'c', long, env = "EVFLOW_CONFIG")]
    pub config: Option<PathBuf>,

    /// Destination URL for forward mode; reply mode when unset
    #[arg(short = 'd', long, env = "EVFLOW_SINK")]
    pub destination: Option<String>,

    /// Timeout for forwarding requests in seconds
    #[arg(long, default_value = "30", value_parser = clap::value_parser!(u64).range(1..))]
    pub forward_timeout: u64,

    /// Log level
    #[arg(short = 'l', long, value_enum, default_value = "info")]
    pub log_level: LogLevel,
}
