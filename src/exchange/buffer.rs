use std::mem::size_of;

pub type Element = i32;

/// Contiguous, exclusively owned sequence of fixed-width integers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Buffer {
    data: Vec<Element>,
}

impl Buffer {
    pub fn filled(len: usize, value: Element) -> Self {
        Buffer {
            data: vec![value; len],
        }
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn byte_size(&self) -> usize {
        byte_size(self.data.len())
    }

    pub fn first(&self) -> Option<Element> {
        self.data.first().copied()
    }

    pub fn all_equal(&self, value: Element) -> bool {
        self.data.iter().all(|e| *e == value)
    }

    pub fn as_slice(&self) -> &[Element] {
        &self.data
    }

    pub fn as_mut_slice(&mut self) -> &mut [Element] {
        &mut self.data
    }
}

impl From<Vec<Element>> for Buffer {
    fn from(data: Vec<Element>) -> Self {
        Buffer { data }
    }
}

pub fn byte_size(elements: usize) -> usize {
    elements * size_of::<Element>()
}

/// One of the two participants. Both buffers have the same element count.
#[derive(Debug)]
pub struct Endpoint {
    rank: u32,
    send_buffer: Buffer,
    receive_buffer: Buffer,
}

impl Endpoint {
    /// Rank 0 fills its send buffer with `initiator_fill`, every other rank with its own rank.
    /// Receive buffers always start out holding the rank.
    pub fn new(rank: u32, message_size: usize, initiator_fill: Element) -> Self {
        let send_value = if rank == 0 {
            initiator_fill
        } else {
            rank as Element
        };
        Endpoint {
            rank,
            send_buffer: Buffer::filled(message_size, send_value),
            receive_buffer: Buffer::filled(message_size, rank as Element),
        }
    }

    pub fn rank(&self) -> u32 {
        self.rank
    }

    pub fn message_size(&self) -> usize {
        self.send_buffer.len()
    }

    pub fn send_buffer(&self) -> &Buffer {
        &self.send_buffer
    }

    pub fn receive_buffer(&self) -> &Buffer {
        &self.receive_buffer
    }

    pub(crate) fn receive_buffer_mut(&mut self) -> &mut Buffer {
        &mut self.receive_buffer
    }
}
