//! epi-cli - Command line tool for exploring epidemic forecast dashboard data.

use clap::Parser;

#[derive(Parser)]
#[command(
    name = "epi-cli",
    version,
    about = "Epidemic forecast dashboard data toolkit"
)]
struct Cli {
    #[command(flatten)]
    source: epi_cmd::SourceArgs,

    #[command(subcommand)]
    command: epi_cmd::Command,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    log::debug!("Running {:?}", cli.command);
    epi_cmd::run(cli.source, cli.command).await
}
