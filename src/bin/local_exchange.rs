use std::process::ExitCode;

use blocking_exchange::exchange::config::CommandLineArgs;
use blocking_exchange::exchange::controller::local_controller;
use clap::Parser;

fn main() -> ExitCode {
    let args = CommandLineArgs::parse();
    match local_controller::run_local(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{e}");
            ExitCode::FAILURE
        }
    }
}
