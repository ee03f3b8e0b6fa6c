use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::sync::mpsc::{channel, Receiver, Sender};
use std::sync::{Arc, Barrier};

use tracing::{debug, instrument, trace};

use crate::exchange::buffer::{byte_size, Element};
use crate::exchange::communication::{check_capacity, ExchangeCommunicator, Tag};
use crate::exchange::error::{ExchangeError, Result};

/// Largest message in bytes the transport buffers. A send of `limit + 1` bytes or more needs a
/// matching receive before it returns.
pub const DEFAULT_EAGER_LIMIT_BYTES: usize = 64 * 1024;

struct Envelope {
    source: u32,
    tag: Tag,
    payload: Vec<Element>,
    // set for rendezvous sends. The sender waits on the other end until the payload was drained.
    drained: Option<Sender<()>>,
}

impl Envelope {
    fn matches(&self, source: u32, tag: Tag) -> bool {
        self.source == source && self.tag == tag
    }
}

/// In-process transport. Each rank runs on its own thread and owns one of these.
pub struct ChannelCommunicator {
    receiver: Receiver<Envelope>,
    // indexed by destination rank. The own slot is empty, so the mailbox disconnects once all
    // peers are gone.
    senders: Vec<Option<Sender<Envelope>>>,
    // messages which arrived before a receive for their (source, tag) was posted
    unexpected: RefCell<VecDeque<Envelope>>,
    rank: u32,
    barrier: Arc<Barrier>,
    eager_limit_bytes: usize,
    sent_messages: Cell<u64>,
    received_messages: Cell<u64>,
}

impl ChannelCommunicator {
    pub fn create_n_2_n(num_parts: u32, eager_limit_bytes: usize) -> Vec<ChannelCommunicator> {
        let mut senders: Vec<_> = Vec::new();
        let mut comms: Vec<_> = Vec::new();
        let barrier = Arc::new(Barrier::new(num_parts as usize));

        for rank in 0..num_parts {
            let (sender, receiver) = channel();
            let comm = ChannelCommunicator {
                receiver,
                senders: vec![],
                unexpected: RefCell::new(VecDeque::new()),
                rank,
                barrier: barrier.clone(),
                eager_limit_bytes,
                sent_messages: Cell::new(0),
                received_messages: Cell::new(0),
            };
            senders.push(sender);
            comms.push(comm);
        }

        for comm in &mut comms {
            for (destination, sender) in senders.iter().enumerate() {
                let sender = (destination as u32 != comm.rank).then(|| sender.clone());
                comm.senders.push(sender);
            }
        }

        comms
    }

    pub fn eager_limit_bytes(&self) -> usize {
        self.eager_limit_bytes
    }

    pub fn sent_messages(&self) -> u64 {
        self.sent_messages.get()
    }

    pub fn received_messages(&self) -> u64 {
        self.received_messages.get()
    }

    fn is_eager(&self, len: usize) -> bool {
        byte_size(len) <= self.eager_limit_bytes
    }

    /// Blocks until a message from `source` with `tag` is available. Messages for other
    /// (source, tag) pairs are parked in arrival order.
    fn take_matching(&self, source: u32, tag: Tag) -> Result<Envelope> {
        {
            let mut unexpected = self.unexpected.borrow_mut();
            if let Some(pos) = unexpected.iter().position(|e| e.matches(source, tag)) {
                if let Some(envelope) = unexpected.remove(pos) {
                    return Ok(envelope);
                }
            }
        }

        loop {
            let envelope = self.receiver.recv().map_err(|e| {
                ExchangeError::Transport(format!(
                    "All peers of rank {} are gone while it is receiving: {e}",
                    self.rank
                ))
            })?;
            if envelope.matches(source, tag) {
                return Ok(envelope);
            }
            trace!(
                rank = self.rank,
                from = envelope.source,
                tag = envelope.tag,
                "Parking unexpected message"
            );
            self.unexpected.borrow_mut().push_back(envelope);
        }
    }

    /// Puts a message back in front of the parked ones with the same (source, tag), so that
    /// the next matching receive sees it first again.
    fn put_back(&self, envelope: Envelope) {
        let mut unexpected = self.unexpected.borrow_mut();
        let pos = unexpected
            .iter()
            .position(|e| e.matches(envelope.source, envelope.tag))
            .unwrap_or(unexpected.len());
        unexpected.insert(pos, envelope);
    }
}

impl ExchangeCommunicator for ChannelCommunicator {
    #[instrument(level = "trace", skip(self, buffer), fields(rank = self.rank, len = buffer.len()))]
    fn send(&self, buffer: &[Element], destination: u32, tag: Tag) -> Result<()> {
        let sender = self.senders.get(destination as usize).ok_or_else(|| {
            ExchangeError::Transport(format!(
                "Rank {} cannot send to unknown rank {destination}",
                self.rank
            ))
        })?;

        let eager = self.is_eager(buffer.len());
        let (drained, on_drained) = if eager {
            (None, None)
        } else {
            let (tx, rx) = channel();
            (Some(tx), Some(rx))
        };

        let envelope = Envelope {
            source: self.rank,
            tag,
            payload: buffer.to_vec(),
            drained,
        };
        match sender {
            Some(sender) => sender.send(envelope).map_err(|e| {
                ExchangeError::Transport(format!(
                    "Error while sending message to rank {destination} with error {e}"
                ))
            })?,
            // self send. A rendezvous one never returns, as with a standard-mode MPI send.
            None => self.unexpected.borrow_mut().push_back(envelope),
        }

        // rendezvous: hold on to the caller until the destination has copied the message out
        if let Some(on_drained) = on_drained {
            debug!(
                rank = self.rank,
                destination,
                bytes = byte_size(buffer.len()),
                "Message above eager limit. Waiting for matching receive."
            );
            on_drained.recv().map_err(|e| {
                ExchangeError::Transport(format!(
                    "Rank {destination} went away before draining message from rank {}: {e}",
                    self.rank
                ))
            })?;
        }

        self.sent_messages.set(self.sent_messages.get() + 1);
        Ok(())
    }

    #[instrument(level = "trace", skip(self, buffer), fields(rank = self.rank, capacity = buffer.len()))]
    fn receive_into(&self, buffer: &mut [Element], source: u32, tag: Tag) -> Result<usize> {
        let envelope = self.take_matching(source, tag)?;

        let received = envelope.payload.len();
        if let Err(e) = check_capacity(buffer.len(), received) {
            self.put_back(envelope);
            return Err(e);
        }

        buffer[..received].copy_from_slice(&envelope.payload);
        if let Some(drained) = envelope.drained {
            // the sender only hangs up if its thread is gone, which leaves nobody to notify
            let _ = drained.send(());
        }

        self.received_messages.set(self.received_messages.get() + 1);
        Ok(received)
    }

    fn barrier(&self) {
        self.barrier.wait();
    }

    fn rank(&self) -> u32 {
        self.rank
    }

    fn size(&self) -> u32 {
        self.senders.len() as u32
    }
}
