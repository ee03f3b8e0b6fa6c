pub mod local_controller;
#[cfg(feature = "mpi")]
pub mod mpi_controller;

use std::thread::{sleep, JoinHandle};
use std::time::Duration;

use nohash_hasher::IntMap;
use tracing::{info, warn};

use crate::exchange::buffer::Endpoint;
use crate::exchange::communication::ExchangeCommunicator;
use crate::exchange::config::Config;
use crate::exchange::error::{ExchangeError, Result};
use crate::exchange::protocol::{self, ExchangeReport, Role, GROUP_SIZE};

/// Runs the exchange for the rank owning `comm`. The group size is checked before any buffer is
/// allocated, so a group of the wrong size fails with `WrongGroupSize` without any transfer.
pub fn execute_partition<C: ExchangeCommunicator>(
    comm: &C,
    config: &Config,
) -> Result<ExchangeReport> {
    let rank = comm.rank();
    let size = comm.size();

    if let Err(e) = Role::for_rank(rank, size) {
        warn!("Process #{rank} of {size} aborts the exchange: {e}");
        return Err(e);
    }

    let exchange = config.exchange();
    let mut endpoint = Endpoint::new(rank, exchange.message_size, exchange.initiator_fill);

    if rank == 0 {
        info!("Message size is {} bytes", endpoint.send_buffer().byte_size());
    }
    info!("Process #{rank} of {size} has started. Waiting for other process to arrive at initial barrier.");
    comm.barrier();

    let report = protocol::run_exchange(comm, &mut endpoint, exchange)?;
    info!("Process #{rank} finished the exchange.");
    Ok(report)
}

/// Turns the result of one rank into the line the operator sees, if any. A wrong group size is
/// reported by rank 0 only and counts as an orderly exit.
pub fn finish(rank: u32, result: Result<ExchangeReport>) -> Result<Option<String>> {
    match result {
        Ok(report) => Ok(outcome_line(&report)),
        Err(ExchangeError::WrongGroupSize { .. }) => {
            Ok((rank == 0).then(wrong_group_size_message))
        }
        Err(e) => Err(e),
    }
}

pub fn wrong_group_size_message() -> String {
    format!("You have to use exactly {GROUP_SIZE} processes to run this program")
}

/// The initiator reports what it got back. The responder stays quiet.
pub fn outcome_line(report: &ExchangeReport) -> Option<String> {
    match (report.role, report.first_received) {
        (Role::Initiator, Some(value)) => Some(format!("Y now has the value {value}")),
        _ => None,
    }
}

pub fn greeting(rank: u32, size: u32) -> String {
    if rank == 0 {
        format!("Hello world from process {rank} of {size}")
    } else {
        format!("Hello world from process {rank}")
    }
}

/// Joins all rank threads. Threads are polled so that a failing thread in the back of the map is
/// noticed as soon as it finishes.
pub fn try_join<T>(mut handles: IntMap<u32, JoinHandle<Result<T>>>) -> IntMap<u32, Result<T>> {
    let mut results = IntMap::default();
    while !handles.is_empty() {
        sleep(Duration::from_millis(10));
        let finished: Vec<u32> = handles
            .iter()
            .filter(|(_, handle)| handle.is_finished())
            .map(|(rank, _)| *rank)
            .collect();
        for rank in finished {
            if let Some(handle) = handles.remove(&rank) {
                let result = handle.join().unwrap_or_else(|_| {
                    Err(ExchangeError::Transport(format!(
                        "Thread of rank {rank} panicked"
                    )))
                });
                results.insert(rank, result);
            }
        }
    }
    results
}
