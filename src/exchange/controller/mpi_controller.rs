use mpi::topology::Communicator;
use tracing::info;

use crate::exchange::communication::mpi_communicator::MpiExchangeCommunicator;
use crate::exchange::communication::ExchangeCommunicator;
use crate::exchange::config::{CommandLineArgs, Config};
use crate::exchange::controller::{execute_partition, finish, greeting};
use crate::exchange::error::{ExchangeError, Result};
use crate::exchange::logging;

fn initialize() -> Result<mpi::environment::Universe> {
    mpi::initialize().ok_or_else(|| {
        ExchangeError::Transport("MPI was already initialized in this process".to_string())
    })
}

/// Entry point of the `mpi_exchange` binary. The universe finalizes mpi when it is dropped at the
/// end of this function, on the early exit for a wrong group size as on any other path.
pub fn run_mpi(args: &CommandLineArgs) -> Result<()> {
    let universe = initialize()?;
    let world = universe.world();
    let rank = world.rank() as u32;

    let mut args = args.clone();
    // override the num part argument, with the number of processes mpi has started.
    args.num_parts = Some(world.size() as u32);
    let config = Config::from_args(&args)?;

    let _guards = logging::init_logging(&config, rank)?;

    let comm = MpiExchangeCommunicator::new(world);
    info!(
        "Starting MPI exchange on process #{rank} of {}. Library version: {}",
        comm.size(),
        mpi::environment::library_version().unwrap_or_default()
    );

    let result = execute_partition(&comm, &config);
    if let Some(line) = finish(rank, result)? {
        println!("{line}");
    }

    info!("Process #{rank} finishing.");
    Ok(())
}

/// Entry point of the `mpi_hello` binary.
pub fn run_hello() -> Result<()> {
    let universe = initialize()?;
    let world = universe.world();
    println!("{}", greeting(world.rank() as u32, world.size() as u32));
    Ok(())
}
