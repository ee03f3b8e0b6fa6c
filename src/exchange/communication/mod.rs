use crate::exchange::buffer::Element;
use crate::exchange::error::{ExchangeError, Result};

pub mod local_communicator;

#[cfg(feature = "mpi")]
pub mod mpi_communicator;

pub type Tag = i32;

pub const EXCHANGE_TAG: Tag = 42;

/// Point to point transport between the ranks of one process group.
///
/// `send` and `receive_into` are blocking. A send whose message exceeds the transport's internal
/// buffering does not return before the destination has posted a matching receive. Neither call
/// has a timeout.
pub trait ExchangeCommunicator {
    fn send(&self, buffer: &[Element], destination: u32, tag: Tag) -> Result<()>;

    /// Fills `buffer` with the next message from `source` carrying `tag` and returns the number of
    /// elements received. A message longer than `buffer` is left pending and `buffer` is not
    /// written.
    fn receive_into(&self, buffer: &mut [Element], source: u32, tag: Tag) -> Result<usize>;

    fn barrier(&self);

    fn rank(&self) -> u32;

    fn size(&self) -> u32;
}

pub(crate) fn check_capacity(capacity: usize, incoming: usize) -> Result<()> {
    if incoming > capacity {
        Err(ExchangeError::SizeMismatch {
            expected: capacity,
            received: incoming,
        })
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::check_capacity;
    use crate::exchange::error::ExchangeError;

    #[test]
    fn capacity_fits() {
        assert!(check_capacity(4, 4).is_ok());
        assert!(check_capacity(4, 0).is_ok());
    }

    #[test]
    fn capacity_exceeded() {
        let err = check_capacity(4, 5).unwrap_err();
        assert!(matches!(
            err,
            ExchangeError::SizeMismatch {
                expected: 4,
                received: 5
            }
        ));
    }
}
