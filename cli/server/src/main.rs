//! evflow CLI
//!
//! Event transformation server: receives events over HTTP, applies the
//! configured envelope and payload pipelines, and replies with or
//! forwards the result.

use clap::Parser;

mod args;
mod run;

use args::Cli;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Cli::parse();

    // Initialize logging (to stderr, so stdout is clean for output)
    ev_cli_common::init_logging(args.log_level)?;

    run::execute(args).await
}
