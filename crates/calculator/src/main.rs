use crate::prelude::*;
use clap::Parser;

mod calc;
mod error;
mod history;
mod mcp;
mod prelude;
mod recorder;
mod server;
mod service;
mod store;

#[derive(Debug, clap::Parser)]
#[command(
    author,
    version,
    about,
    long_about = "Evaluate arithmetic and scientific calculations and keep a two-day history"
)]
pub struct App {
    #[command(subcommand)]
    pub command: SubCommands,

    #[clap(flatten)]
    global: Global,
}

#[derive(Debug, Clone, clap::Args)]
pub struct Global {
    /// SQLite database holding the calculation history (`:memory:` for a throwaway one)
    #[clap(
        long,
        env = "CALCULATOR_DB",
        global = true,
        default_value = "data/calculations.db"
    )]
    database: String,

    /// Whether to display additional information.
    #[clap(long, env = "CALCULATOR_VERBOSE", global = true, default_value = "false")]
    verbose: bool,
}

#[derive(Debug, clap::Parser)]
pub enum SubCommands {
    /// Evaluate an arithmetic expression
    Eval(crate::calc::EvalOptions),

    /// Apply a scientific function (sin, cos, tan, log, ln, sqrt, pow, exp)
    Sci(crate::calc::SciOptions),

    /// Show calculations from the last two days
    History(crate::history::HistoryOptions),

    /// Delete calculations older than two days
    Cleanup,

    /// Serve the HTTP API
    Serve(crate::server::ServeOptions),

    /// Model Context Protocol server
    MCP(crate::mcp::App),
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();
    color_eyre::install()?;

    let app = App::parse();

    let (service, worker) = crate::service::start(&app.global);

    let result = match app.command {
        SubCommands::Eval(options) => crate::calc::run_eval(options, &service, &app.global),
        SubCommands::Sci(options) => crate::calc::run_sci(options, &service, &app.global),
        SubCommands::History(options) => {
            crate::history::run(options, &service, &app.global).await
        }
        SubCommands::Cleanup => crate::history::run_cleanup(&service, &app.global).await,
        SubCommands::Serve(options) => {
            crate::server::run(options, service.clone(), &app.global).await
        }
        SubCommands::MCP(sub_app) => crate::mcp::run(sub_app, service.clone(), &app.global).await,
    };

    // Flush queued history writes before exiting, even when the command failed.
    worker.shutdown().await;

    result.map_err(|err: color_eyre::eyre::Report| eyre!(err))
}
