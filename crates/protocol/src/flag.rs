/// One-byte tag identifying the kind of a [`crate::Packet`].
///
/// The set is closed: any byte that doesn't match one of these variants is
/// a protocol error (`spec.md` §3), not a silently-ignored packet.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Flag {
    /// Primary-socket handshake: client wants to pull a remote path.
    Pull = 1,
    /// Primary-socket handshake: client wants to push to a remote path.
    Push = 2,
    /// Server's reply to `Pull`/`Push`, carrying the session id.
    Sid = 3,
    /// Auxiliary-socket handshake: binds a socket to an existing session id.
    Attach = 4,
    /// Total number of regular files in the transfer.
    FileCount = 5,
    /// A directory entry: create it before any file inside it.
    DirInfo = 6,
    /// A file's metadata, sent before its chunks.
    FileInfo = 7,
    /// Receiver is ready to accept chunks for a file id.
    FileReady = 8,
    /// One chunk of file content.
    FileChunk = 9,
    /// Sender signals the transfer is complete.
    Done = 10,
    /// Request to retransmit a previously-sent frame.
    Resend = 11,
}

impl Flag {
    /// All variants, in wire-value order. Used by property tests that need
    /// to enumerate every flag.
    pub const ALL: [Self; 11] = [
        Self::Pull,
        Self::Push,
        Self::Sid,
        Self::Attach,
        Self::FileCount,
        Self::DirInfo,
        Self::FileInfo,
        Self::FileReady,
        Self::FileChunk,
        Self::Done,
        Self::Resend,
    ];

    /// The raw wire byte for this flag.
    #[must_use]
    pub const fn as_u8(self) -> u8 {
        self as u8
    }
}

impl TryFrom<u8> for Flag {
    type Error = u8;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Self::Pull),
            2 => Ok(Self::Push),
            3 => Ok(Self::Sid),
            4 => Ok(Self::Attach),
            5 => Ok(Self::FileCount),
            6 => Ok(Self::DirInfo),
            7 => Ok(Self::FileInfo),
            8 => Ok(Self::FileReady),
            9 => Ok(Self::FileChunk),
            10 => Ok(Self::Done),
            11 => Ok(Self::Resend),
            other => Err(other),
        }
    }
}

impl From<Flag> for u8 {
    fn from(flag: Flag) -> Self {
        flag.as_u8()
    }
}

#[cfg(test)]
mod tests {
    use super::Flag;

    #[test]
    fn every_flag_round_trips_through_u8() {
        for flag in Flag::ALL {
            assert_eq!(Flag::try_from(flag.as_u8()), Ok(flag));
        }
    }

    #[test]
    fn unknown_byte_is_rejected() {
        assert_eq!(Flag::try_from(0), Err(0));
        assert_eq!(Flag::try_from(12), Err(12));
        assert_eq!(Flag::try_from(255), Err(255));
    }
}
