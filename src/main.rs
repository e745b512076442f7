#![forbid(unsafe_code)]

//! fswalk CLI entry point.

use clap::Parser;

mod cli_app;

fn main() {
    let args = cli_app::Cli::parse();
    if let Err(e) = cli_app::run(&args) {
        cli_app::report_error(&args, &e);
        std::process::exit(e.exit_code());
    }
}
