use tracing::{info, instrument};

use crate::exchange::buffer::{Element, Endpoint};
use crate::exchange::communication::ExchangeCommunicator;
use crate::exchange::config::{Exchange, ResponderReply, Schedule};
use crate::exchange::error::{ExchangeError, Result};

pub const GROUP_SIZE: u32 = 2;

/// Part an endpoint plays in the exchange. Chosen once from the rank.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    /// Rank 0, sends first.
    Initiator,
    /// Rank 1, replies to the initiator.
    Responder,
}

impl Role {
    /// Fails with `WrongGroupSize` unless the group has exactly two members.
    pub fn for_rank(rank: u32, size: u32) -> Result<Role> {
        if size != GROUP_SIZE {
            return Err(ExchangeError::WrongGroupSize { size });
        }
        match rank {
            0 => Ok(Role::Initiator),
            1 => Ok(Role::Responder),
            _ => Err(ExchangeError::WrongGroupSize { size }),
        }
    }

    pub fn peer(&self) -> u32 {
        match self {
            Role::Initiator => 1,
            Role::Responder => 0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndpointState {
    Idle,
    Sending,
    Receiving,
    Done,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Send,
    Receive,
}

impl Operation {
    fn state(&self) -> EndpointState {
        match self {
            Operation::Send => EndpointState::Sending,
            Operation::Receive => EndpointState::Receiving,
        }
    }
}

/// Program order of the blocking calls for one endpoint.
///
/// With large messages the safe schedule completes because the responder is already waiting in
/// its receive when the initiator's send needs a matching receive, and the responder only sends
/// once the initiator has moved on to its own receive. At least one endpoint has to receive
/// before it sends. The symmetric schedule breaks that rule: both sends wait for a receive the
/// peer never reaches.
pub fn operations(role: Role, schedule: Schedule) -> [Operation; 2] {
    match (schedule, role) {
        (Schedule::Safe, Role::Initiator) => [Operation::Send, Operation::Receive],
        (Schedule::Safe, Role::Responder) => [Operation::Receive, Operation::Send],
        (Schedule::Symmetric, _) => [Operation::Send, Operation::Receive],
    }
}

/// What one endpoint observed during a completed exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExchangeReport {
    pub rank: u32,
    pub role: Role,
    pub message_bytes: usize,
    pub sent_messages: u32,
    pub received_messages: u32,
    pub received_elements: usize,
    pub first_received: Option<Element>,
    pub states: Vec<EndpointState>,
}

/// Runs the exchange for one endpoint. Blocks until both of its operations completed. With
/// `Schedule::Symmetric` and messages above the transport's buffering this never returns.
#[instrument(level = "debug", skip_all, fields(rank = endpoint.rank()))]
pub fn run_exchange<C: ExchangeCommunicator>(
    comm: &C,
    endpoint: &mut Endpoint,
    exchange: &Exchange,
) -> Result<ExchangeReport> {
    let role = Role::for_rank(comm.rank(), comm.size())?;
    let peer = role.peer();
    let rank = endpoint.rank();

    let mut report = ExchangeReport {
        rank,
        role,
        message_bytes: endpoint.send_buffer().byte_size(),
        sent_messages: 0,
        received_messages: 0,
        received_elements: 0,
        first_received: None,
        states: vec![EndpointState::Idle],
    };

    let ops = operations(role, exchange.schedule);
    for (i, op) in ops.iter().enumerate() {
        report.states.push(op.state());
        match op {
            Operation::Send => {
                info!("Process {rank} sending to process {peer}");
                let buffer = match (role, exchange.responder_reply) {
                    (Role::Responder, ResponderReply::Echo) => endpoint.receive_buffer(),
                    _ => endpoint.send_buffer(),
                };
                comm.send(buffer.as_slice(), peer, exchange.tag)?;
                report.sent_messages += 1;
            }
            Operation::Receive => {
                info!("Process {rank} receiving from process {peer}");
                let received = comm.receive_into(
                    endpoint.receive_buffer_mut().as_mut_slice(),
                    peer,
                    exchange.tag,
                )?;
                report.received_messages += 1;
                report.received_elements = received;
                report.first_received = endpoint.receive_buffer().first();
            }
        }
        let next = if i + 1 == ops.len() {
            EndpointState::Done
        } else {
            EndpointState::Idle
        };
        report.states.push(next);
    }

    Ok(report)
}
