mod cli;

use anyhow::Result;
use clap::Parser;
use cli::Args;

fn main() -> Result<()> {
    let _guard = ws_logging::init_subscriber(&ws_logging::LogSettings::from_env());
    let args = Args::parse();
    cli::execute(args)
}
