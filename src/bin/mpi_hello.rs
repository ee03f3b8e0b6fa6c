use std::process::ExitCode;

use blocking_exchange::exchange::controller::mpi_controller;

fn main() -> ExitCode {
    match mpi_controller::run_hello() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{e}");
            ExitCode::FAILURE
        }
    }
}
