use crate::error::ProtocolError;
use crate::flag::Flag;
use crate::packet::{Packet, LEN_HEAD};

/// Reassembles a byte stream from one socket into [`Packet`]s.
///
/// A `Buffer` is fed arbitrarily-sized chunks as they arrive off a socket —
/// never assuming a read lands on a frame boundary — and hands back every
/// frame that becomes complete as a result. It holds exactly one partial
/// frame's worth of state between calls, so memory use is bounded by one
/// frame (`spec.md` §5).
#[derive(Debug)]
pub struct Buffer {
    state: State,
}

#[derive(Debug)]
enum State {
    Head {
        data: Vec<u8>,
    },
    Body {
        flag: Flag,
        chksum: u32,
        remaining: usize,
        data: Vec<u8>,
    },
}

impl Default for Buffer {
    fn default() -> Self {
        Self::new()
    }
}

impl Buffer {
    /// A fresh buffer, ready to accept the start of a new frame.
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: State::Head {
                data: Vec::with_capacity(LEN_HEAD),
            },
        }
    }

    /// Feeds `chunk` into the reassembly state machine, returning every
    /// frame that became complete as a result (zero, one, or many, if
    /// `chunk` happens to span several frames).
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolError::UnknownFlag`] if a head's flag byte is not
    /// recognised, or [`ProtocolError::ChecksumMismatch`] if a reassembled
    /// body's CRC32 doesn't match its head. In both cases the buffer has
    /// already reset itself and is ready to resynchronise on the next call.
    pub fn feed(&mut self, chunk: &[u8]) -> Result<Vec<Packet>, ProtocolError> {
        let mut out = Vec::new();
        let mut cursor = chunk;

        loop {
            match &mut self.state {
                State::Head { data } => {
                    if cursor.is_empty() {
                        break;
                    }
                    let need = LEN_HEAD - data.len();
                    let take = need.min(cursor.len());
                    data.extend_from_slice(&cursor[..take]);
                    cursor = &cursor[take..];

                    if data.len() == LEN_HEAD {
                        let head: [u8; LEN_HEAD] = data.as_slice().try_into().expect("len checked above");
                        let (flag, chksum, length) = Packet::unpack_head(&head)?;
                        self.state = State::Body {
                            flag,
                            chksum,
                            remaining: length as usize,
                            data: Vec::with_capacity(length as usize),
                        };
                        // Loop again: a zero-length body must complete right
                        // away even if `cursor` is now empty.
                    }
                }
                State::Body {
                    flag,
                    chksum,
                    remaining,
                    data,
                } => {
                    if *remaining > 0 && cursor.is_empty() {
                        break;
                    }
                    let take = (*remaining).min(cursor.len());
                    data.extend_from_slice(&cursor[..take]);
                    cursor = &cursor[take..];
                    *remaining -= take;

                    if *remaining == 0 {
                        let flag = *flag;
                        let declared = *chksum;
                        let body = std::mem::take(data);
                        self.reset();

                        let packet = Packet::from_parts(flag, body);
                        if !packet.is_valid(declared) {
                            return Err(ProtocolError::ChecksumMismatch {
                                flag,
                                declared,
                                length: packet.length(),
                                computed: packet.chksum(),
                            });
                        }
                        out.push(packet);
                    }
                }
            }
        }

        Ok(out)
    }

    /// Discards any partial frame and returns to the initial head-reading
    /// state. Used after a checksum mismatch triggers a `Resend`, or when a
    /// socket is being recycled.
    pub fn reset(&mut self) {
        self.state = State::Head {
            data: Vec::with_capacity(LEN_HEAD),
        };
    }
}
