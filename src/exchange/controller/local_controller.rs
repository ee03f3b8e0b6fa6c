use std::thread;
use std::thread::JoinHandle;

use nohash_hasher::IntMap;
use tracing::info;

use crate::exchange::communication::local_communicator::ChannelCommunicator;
use crate::exchange::communication::ExchangeCommunicator;
use crate::exchange::config::{CommandLineArgs, Config};
use crate::exchange::controller::{execute_partition, finish, greeting, try_join};
use crate::exchange::error::{ExchangeError, Result};
use crate::exchange::logging;
use crate::exchange::protocol::ExchangeReport;

/// Entry point of the `local_exchange` binary. Every rank runs on its own thread.
pub fn run_local(args: &CommandLineArgs) -> Result<()> {
    let config = Config::from_args(args)?;
    let _guard = logging::init_std_out_logging_thread_local();

    info!(
        "Starting multithreaded exchange with {} participants.",
        config.partitioning().num_parts
    );

    let mut results = try_join(run_channel(config)?);
    let mut ranks: Vec<u32> = results.keys().copied().collect();
    ranks.sort_unstable();

    for rank in ranks {
        if let Some(result) = results.remove(&rank) {
            if let Some(line) = finish(rank, result)? {
                println!("{line}");
            }
        }
    }
    Ok(())
}

/// Spawns one thread per rank, each owning the communicator of its rank. The communicators are
/// dropped, i.e. the group shut down, when the threads end, whatever way they end.
pub fn run_channel(config: Config) -> Result<IntMap<u32, JoinHandle<Result<ExchangeReport>>>> {
    let comms = ChannelCommunicator::create_n_2_n(
        config.partitioning().num_parts,
        config.transport().eager_limit_bytes,
    );

    let mut handles = IntMap::default();
    for comm in comms {
        let rank = comm.rank();
        let config = config.clone();
        let handle = thread::Builder::new()
            .name(rank.to_string())
            .spawn(move || {
                let _guards = logging::init_logging(&config, rank)?;
                execute_partition(&comm, &config)
            })?;
        handles.insert(rank, handle);
    }
    Ok(handles)
}

/// Entry point of the `local_hello` binary.
pub fn run_hello(num_parts: u32) -> Result<()> {
    let handles: Vec<_> = ChannelCommunicator::create_n_2_n(num_parts, 0)
        .into_iter()
        .map(|comm| {
            thread::spawn(move || {
                comm.barrier();
                greeting(comm.rank(), comm.size())
            })
        })
        .collect();

    for handle in handles {
        let line = handle
            .join()
            .map_err(|_| ExchangeError::Transport("Hello thread panicked".to_string()))?;
        println!("{line}");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::run_channel;
    use crate::exchange::config::Config;
    use crate::exchange::controller::try_join;
    use crate::exchange::error::ExchangeError;

    #[test]
    fn channel_run_completes() {
        let mut config = Config::default();
        config.modules.exchange.message_size = 4096;

        let results = try_join(run_channel(config).unwrap());
        assert_eq!(2, results.len());
        let initiator = results[&0].as_ref().unwrap();
        assert_eq!(Some(1), initiator.first_received);
        assert_eq!(4096, initiator.received_elements);
    }

    #[test]
    fn single_participant_aborts() {
        let mut config = Config::default();
        config.modules.partitioning.num_parts = 1;

        let results = try_join(run_channel(config).unwrap());
        assert!(matches!(
            results[&0],
            Err(ExchangeError::WrongGroupSize { size: 1 })
        ));
    }
}
