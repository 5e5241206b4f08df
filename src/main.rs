use clap::Parser;

mod cli;
mod commands;

use cli::{Cli, Command};

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    match cli.command {
        Command::Analyze(args) => commands::analyze(&args),
        Command::Calibrate(args) => commands::calibrate(&args),
        Command::Config { preset } => commands::print_config(preset),
    }
}
