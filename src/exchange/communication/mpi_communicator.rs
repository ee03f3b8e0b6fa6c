use mpi::collective::CommunicatorCollectives;
use mpi::datatype::Equivalence;
use mpi::point_to_point::{Destination, Source};
use mpi::topology::{Communicator, SimpleCommunicator};
use mpi::Rank;
use tracing::{instrument, trace};

use crate::exchange::buffer::Element;
use crate::exchange::communication::{check_capacity, ExchangeCommunicator, Tag};
use crate::exchange::error::Result;

pub struct MpiExchangeCommunicator {
    pub mpi_communicator: SimpleCommunicator,
}

impl MpiExchangeCommunicator {
    pub(crate) fn new(mpi_communicator: SimpleCommunicator) -> Self {
        MpiExchangeCommunicator { mpi_communicator }
    }
}

impl ExchangeCommunicator for MpiExchangeCommunicator {
    // Standard mode send (MPI_Send). Whether this returns before the peer posts its receive is up
    // to the mpi implementation. Above its eager limit it will wait for the matching MPI_Recv,
    // so two processes which both send first block each other forever.
    #[instrument(level = "trace", skip(self, buffer), fields(rank = self.rank(), len = buffer.len()))]
    fn send(&self, buffer: &[Element], destination: u32, tag: Tag) -> Result<()> {
        self.mpi_communicator
            .process_at_rank(destination as Rank)
            .send_with_tag(buffer, tag);
        Ok(())
    }

    #[instrument(level = "trace", skip(self, buffer), fields(rank = self.rank(), capacity = buffer.len()))]
    fn receive_into(&self, buffer: &mut [Element], source: u32, tag: Tag) -> Result<usize> {
        let process = self.mpi_communicator.process_at_rank(source as Rank);

        // Probe first, so that an oversize message is neither truncated into the buffer nor
        // consumed. Plain probe is fine here, since each rank receives from a single thread.
        let status = process.probe_with_tag(tag);
        let incoming = status.count(Element::equivalent_datatype()) as usize;
        check_capacity(buffer.len(), incoming)?;

        let status = process.receive_into_with_tag(buffer, tag);
        let received = status.count(Element::equivalent_datatype()) as usize;
        trace!(rank = self.rank(), source, received, "Received message");
        Ok(received)
    }

    fn barrier(&self) {
        self.mpi_communicator.barrier();
    }

    fn rank(&self) -> u32 {
        self.mpi_communicator.rank() as u32
    }

    fn size(&self) -> u32 {
        self.mpi_communicator.size() as u32
    }
}
