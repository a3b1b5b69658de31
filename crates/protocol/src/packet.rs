use crate::error::ProtocolError;
use crate::flag::Flag;

/// Fixed-width sentinel value carried by a `Flag::Done` body.
pub const EOF: u32 = 0xFFFF_FFFF;

/// Length in bytes of a packed wire head: `flag(1) | chksum(4) | length(2)`.
pub const LEN_HEAD: usize = 7;

/// A framed protocol message: a [`Flag`] plus its opaque body bytes.
///
/// Packets are immutable values (`spec.md` §3). Construct one with the
/// per-flag constructors below, or decode one off the wire with
/// [`Packet::from_parts`]; inspect it with [`Packet::decode`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Packet {
    flag: Flag,
    body: Vec<u8>,
}

/// The decoded, flag-specific contents of a [`Packet`]'s body.
#[derive(Clone, Debug, PartialEq)]
pub enum Body {
    /// `Pull`/`Push` body: the remote path string.
    Path(String),
    /// `Sid`/`Attach` body: the session id.
    SessionId(u16),
    /// `FileCount` body: number of regular files in the transfer.
    FileCount(u16),
    /// `DirInfo` body.
    DirInfo {
        /// Identifier assigned to this directory for the session.
        file_id: u16,
        /// Unix permission bits.
        perm: u16,
        /// Path relative to the transfer root.
        path: String,
    },
    /// `FileInfo` body.
    FileInfo {
        /// Identifier assigned to this file for the session.
        file_id: u16,
        /// Unix permission bits.
        perm: u16,
        /// File size in bytes.
        size: u64,
        /// Modification time as a Unix timestamp.
        mtime: f64,
        /// Whole-file MD5 digest.
        md5: [u8; 16],
        /// Path relative to the transfer root.
        path: String,
    },
    /// `FileReady` body: the file id the receiver is ready to accept.
    FileReady(u16),
    /// `FileChunk` body.
    FileChunk {
        /// File this chunk belongs to.
        file_id: u16,
        /// Zero-based chunk sequence number within the file.
        seq: u32,
        /// Raw chunk bytes.
        chunk: Vec<u8>,
    },
    /// `Done` body (always carries [`EOF`]).
    Done,
    /// `Resend` body identifying a suspect frame.
    Resend {
        /// Flag of the frame being requested again.
        flag: Flag,
        /// CRC32 of the frame being requested again.
        chksum: u32,
        /// Body length of the frame being requested again.
        length: u16,
    },
}

impl Packet {
    /// Builds a packet from an already-validated flag and body, without
    /// re-checking the length bound. Used by the pool once a frame has been
    /// fully reassembled and its CRC has already been checked.
    #[must_use]
    pub fn from_parts(flag: Flag, body: Vec<u8>) -> Self {
        Self { flag, body }
    }

    fn sized(flag: Flag, body: Vec<u8>) -> Result<Self, ProtocolError> {
        if body.len() > u16::MAX as usize {
            return Err(ProtocolError::BodyTooLong(body.len()));
        }
        Ok(Self { flag, body })
    }

    /// `Pull(remote_path)`.
    pub fn pull(path: impl AsRef<str>) -> Result<Self, ProtocolError> {
        Self::sized(Flag::Pull, path.as_ref().as_bytes().to_vec())
    }

    /// `Push(remote_path)`.
    pub fn push(path: impl AsRef<str>) -> Result<Self, ProtocolError> {
        Self::sized(Flag::Push, path.as_ref().as_bytes().to_vec())
    }

    /// `Sid(sid)`.
    #[must_use]
    pub fn sid(sid: u16) -> Self {
        Self {
            flag: Flag::Sid,
            body: sid.to_be_bytes().to_vec(),
        }
    }

    /// `Attach(sid)`.
    #[must_use]
    pub fn attach(sid: u16) -> Self {
        Self {
            flag: Flag::Attach,
            body: sid.to_be_bytes().to_vec(),
        }
    }

    /// `FileCount(n)`.
    #[must_use]
    pub fn file_count(n: u16) -> Self {
        Self {
            flag: Flag::FileCount,
            body: n.to_be_bytes().to_vec(),
        }
    }

    /// `DirInfo(file_id, perm, relative_path)`.
    pub fn dir_info(file_id: u16, perm: u16, path: impl AsRef<str>) -> Result<Self, ProtocolError> {
        let mut body = Vec::with_capacity(4 + path.as_ref().len());
        body.extend_from_slice(&file_id.to_be_bytes());
        body.extend_from_slice(&perm.to_be_bytes());
        body.extend_from_slice(path.as_ref().as_bytes());
        Self::sized(Flag::DirInfo, body)
    }

    /// `FileInfo(file_id, perm, size, mtime, md5, relative_path)`.
    #[allow(clippy::too_many_arguments)]
    pub fn file_info(
        file_id: u16,
        perm: u16,
        size: u64,
        mtime: f64,
        md5: [u8; 16],
        path: impl AsRef<str>,
    ) -> Result<Self, ProtocolError> {
        let mut body = Vec::with_capacity(36 + path.as_ref().len());
        body.extend_from_slice(&file_id.to_be_bytes());
        body.extend_from_slice(&perm.to_be_bytes());
        body.extend_from_slice(&size.to_be_bytes());
        body.extend_from_slice(&mtime.to_be_bytes());
        body.extend_from_slice(&md5);
        body.extend_from_slice(path.as_ref().as_bytes());
        Self::sized(Flag::FileInfo, body)
    }

    /// `FileReady(file_id)`.
    #[must_use]
    pub fn file_ready(file_id: u16) -> Self {
        Self {
            flag: Flag::FileReady,
            body: file_id.to_be_bytes().to_vec(),
        }
    }

    /// `FileChunk(file_id, seq, chunk_bytes)`.
    pub fn file_chunk(file_id: u16, seq: u32, chunk: &[u8]) -> Result<Self, ProtocolError> {
        let mut body = Vec::with_capacity(6 + chunk.len());
        body.extend_from_slice(&file_id.to_be_bytes());
        body.extend_from_slice(&seq.to_be_bytes());
        body.extend_from_slice(chunk);
        Self::sized(Flag::FileChunk, body)
    }

    /// `Done(EOF)`.
    #[must_use]
    pub fn done() -> Self {
        Self {
            flag: Flag::Done,
            body: EOF.to_be_bytes().to_vec(),
        }
    }

    /// `Resend(original_flag, original_chksum, original_length)`.
    #[must_use]
    pub fn resend(flag: Flag, chksum: u32, length: u16) -> Self {
        let mut body = Vec::with_capacity(7);
        body.push(flag.as_u8());
        body.extend_from_slice(&chksum.to_be_bytes());
        body.extend_from_slice(&length.to_be_bytes());
        Self {
            flag: Flag::Resend,
            body,
        }
    }

    /// The flag identifying this packet's kind.
    #[must_use]
    pub const fn flag(&self) -> Flag {
        self.flag
    }

    /// The raw body bytes.
    #[must_use]
    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// `length = |body|`.
    #[must_use]
    pub fn length(&self) -> u16 {
        self.body.len() as u16
    }

    /// `CRC32(body)`.
    #[must_use]
    pub fn chksum(&self) -> u32 {
        crc32fast::hash(&self.body)
    }

    /// `is_valid(chksum) := CRC32(body) == chksum`.
    #[must_use]
    pub fn is_valid(&self, chksum: u32) -> bool {
        self.chksum() == chksum
    }

    /// Serialises this packet to `flag | CRC32(body) | length | body`.
    #[must_use]
    pub fn pack(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(LEN_HEAD + self.body.len());
        out.push(self.flag.as_u8());
        out.extend_from_slice(&self.chksum().to_be_bytes());
        out.extend_from_slice(&self.length().to_be_bytes());
        out.extend_from_slice(&self.body);
        out
    }

    /// Parses a 7-byte wire head into `(flag, chksum, length)`.
    pub fn unpack_head(head: &[u8; LEN_HEAD]) -> Result<(Flag, u32, u16), ProtocolError> {
        let flag = Flag::try_from(head[0]).map_err(ProtocolError::UnknownFlag)?;
        let chksum = u32::from_be_bytes([head[1], head[2], head[3], head[4]]);
        let length = u16::from_be_bytes([head[5], head[6]]);
        Ok((flag, chksum, length))
    }

    /// Decodes this packet's body according to its flag's layout.
    pub fn decode(&self) -> Result<Body, ProtocolError> {
        match self.flag {
            Flag::Pull | Flag::Push => {
                let path = std::str::from_utf8(&self.body)
                    .map_err(|_| ProtocolError::InvalidUtf8 { flag: self.flag })?
                    .to_owned();
                Ok(Body::Path(path))
            }
            Flag::Sid | Flag::Attach => {
                let sid = read_u16(&self.body, 0, self.flag)?;
                Ok(Body::SessionId(sid))
            }
            Flag::FileCount => Ok(Body::FileCount(read_u16(&self.body, 0, self.flag)?)),
            Flag::DirInfo => {
                require_len(&self.body, 4, self.flag)?;
                let file_id = read_u16(&self.body, 0, self.flag)?;
                let perm = read_u16(&self.body, 2, self.flag)?;
                let path = utf8_tail(&self.body, 4, self.flag)?;
                Ok(Body::DirInfo {
                    file_id,
                    perm,
                    path,
                })
            }
            Flag::FileInfo => {
                require_len(&self.body, 36, self.flag)?;
                let file_id = read_u16(&self.body, 0, self.flag)?;
                let perm = read_u16(&self.body, 2, self.flag)?;
                let size = read_u64(&self.body, 4, self.flag)?;
                let mtime = f64::from_be_bytes(self.body[12..20].try_into().unwrap());
                let mut md5 = [0u8; 16];
                md5.copy_from_slice(&self.body[20..36]);
                let path = utf8_tail(&self.body, 36, self.flag)?;
                Ok(Body::FileInfo {
                    file_id,
                    perm,
                    size,
                    mtime,
                    md5,
                    path,
                })
            }
            Flag::FileReady => Ok(Body::FileReady(read_u16(&self.body, 0, self.flag)?)),
            Flag::FileChunk => {
                require_len(&self.body, 6, self.flag)?;
                let file_id = read_u16(&self.body, 0, self.flag)?;
                let seq = read_u32(&self.body, 2, self.flag)?;
                let chunk = self.body[6..].to_vec();
                Ok(Body::FileChunk {
                    file_id,
                    seq,
                    chunk,
                })
            }
            Flag::Done => {
                require_len(&self.body, 4, self.flag)?;
                Ok(Body::Done)
            }
            Flag::Resend => {
                require_len(&self.body, 7, self.flag)?;
                let flag = Flag::try_from(self.body[0]).map_err(ProtocolError::UnknownFlag)?;
                let chksum = read_u32(&self.body, 1, Flag::Resend)?;
                let length = read_u16(&self.body, 5, Flag::Resend)?;
                Ok(Body::Resend {
                    flag,
                    chksum,
                    length,
                })
            }
        }
    }
}

fn require_len(body: &[u8], need: usize, flag: Flag) -> Result<(), ProtocolError> {
    if body.len() < need {
        return Err(ProtocolError::BodyTooShort {
            flag,
            need,
            got: body.len(),
        });
    }
    Ok(())
}

fn read_u16(body: &[u8], at: usize, flag: Flag) -> Result<u16, ProtocolError> {
    require_len(body, at + 2, flag)?;
    Ok(u16::from_be_bytes([body[at], body[at + 1]]))
}

fn read_u32(body: &[u8], at: usize, flag: Flag) -> Result<u32, ProtocolError> {
    require_len(body, at + 4, flag)?;
    Ok(u32::from_be_bytes(body[at..at + 4].try_into().unwrap()))
}

fn read_u64(body: &[u8], at: usize, flag: Flag) -> Result<u64, ProtocolError> {
    require_len(body, at + 8, flag)?;
    Ok(u64::from_be_bytes(body[at..at + 8].try_into().unwrap()))
}

fn utf8_tail(body: &[u8], at: usize, flag: Flag) -> Result<String, ProtocolError> {
    std::str::from_utf8(&body[at..])
        .map(str::to_owned)
        .map_err(|_| ProtocolError::InvalidUtf8 { flag })
}
