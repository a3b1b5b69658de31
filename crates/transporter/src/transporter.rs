use crate::chunk_io::{ChunkSink, ChunkSource};
use crate::error::{TransferError, TransferReport};
use crate::receiver::Receiver;
use crate::sender::Sender;

/// Either side of a transfer, sharing one [`pool::ConnectionPool`].
///
/// `spec.md` §9 calls for `Sender`/`Receiver` polymorphism as one enum
/// rather than a trait-object hierarchy, since a session is always
/// exactly one or the other and never needs to be swapped mid-transfer.
pub enum Transporter<Source, Sink> {
    /// This side reads from `Source` and streams content out.
    Sender(Sender<Source>),
    /// This side writes to `Sink` and verifies content as it arrives.
    Receiver(Receiver<Sink>),
}

impl<Source: ChunkSource, Sink: ChunkSink> Transporter<Source, Sink> {
    /// Runs whichever side this transporter holds to completion.
    ///
    /// # Errors
    ///
    /// See [`Sender::run`] and [`Receiver::run`].
    pub fn run(self) -> Result<TransferReport, TransferError> {
        match self {
            Self::Sender(sender) => sender.run(),
            Self::Receiver(receiver) => receiver.run(),
        }
    }
}
