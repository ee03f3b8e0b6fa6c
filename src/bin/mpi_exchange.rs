use std::process::ExitCode;

use blocking_exchange::exchange::config::CommandLineArgs;
use blocking_exchange::exchange::controller::mpi_controller;
use clap::Parser;

fn main() -> ExitCode {
    let args = CommandLineArgs::parse();
    match mpi_controller::run_mpi(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{e}");
            ExitCode::FAILURE
        }
    }
}
