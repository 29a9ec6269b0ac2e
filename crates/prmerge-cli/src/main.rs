//! prmerge CLI - squash-merge labelled pull requests into the current checkout.

use clap::Parser;

mod commands;
mod output;

use commands::{Cli, Commands};

fn main() {
    let cli = Cli::parse();
    output::set_quiet(cli.quiet_requested());

    let result = match cli.command {
        Commands::Github(args) => commands::github::run(&cli.shared, args),
        Commands::Azure(args) => commands::azure::run(&cli.shared, args),
    };

    if let Err(e) = result {
        output::trace(&e);
        std::process::exit(-1);
    }
}
