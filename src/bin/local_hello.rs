use std::process::ExitCode;

use blocking_exchange::exchange::config::{CommandLineArgs, Config};
use blocking_exchange::exchange::controller::local_controller;
use clap::Parser;

fn main() -> ExitCode {
    let args = CommandLineArgs::parse();
    let result = Config::from_args(&args)
        .and_then(|config| local_controller::run_hello(config.partitioning().num_parts));
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{e}");
            ExitCode::FAILURE
        }
    }
}
