//! RWH CLI - Command line tool for rainwater-harvesting planning over
//! decadal rainfall series.

use clap::Parser;

#[derive(Parser)]
#[command(
    name = "rwh-cli",
    version,
    about = "Rainwater harvesting balance and capacity toolkit"
)]
struct Cli {
    #[command(subcommand)]
    command: rwh_cmd::Command,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    rwh_cmd::run(cli.command)
}
