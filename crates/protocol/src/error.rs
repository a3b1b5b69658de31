use thiserror::Error;

/// A problem decoding a wire frame or its body.
///
/// These never indicate a bug in this crate: they're produced whenever the
/// bytes on the wire don't match what the protocol promises, and the caller
/// decides what to do about it (request a `Resend`, drop the connection,
/// abort the session — see `spec.md` §7).
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ProtocolError {
    /// The head's flag byte didn't match any known [`crate::Flag`].
    #[error("unknown flag byte: {0}")]
    UnknownFlag(u8),

    /// A body was too short for its flag's fixed-size prefix.
    #[error("body too short for {flag:?}: need at least {need} bytes, got {got}")]
    BodyTooShort {
        /// The flag whose layout the body failed to satisfy.
        flag: crate::Flag,
        /// Minimum number of bytes the layout requires.
        need: usize,
        /// Number of bytes actually present.
        got: usize,
    },

    /// A path or string field was not valid UTF-8.
    #[error("non-UTF-8 path in {flag:?} body")]
    InvalidUtf8 {
        /// The flag whose body contained the invalid string.
        flag: crate::Flag,
    },

    /// The body length exceeds the 16-bit length field's range.
    #[error("body length {0} exceeds u16::MAX")]
    BodyTooLong(usize),

    /// `Packet::unpack_head` saw a length field that can't be satisfied
    /// by the bytes remaining in the stream.
    #[error("head declared {declared} body bytes but only {available} were available")]
    Truncated {
        /// Length the head promised.
        declared: u16,
        /// Length actually available to the caller.
        available: usize,
    },

    /// A fully reassembled body's CRC32 didn't match the head's declared
    /// checksum (`spec.md` §7: request a `Resend` of this frame).
    #[error("checksum mismatch for {flag:?}: declared {declared:#010x}, computed {computed:#010x}")]
    ChecksumMismatch {
        /// Flag of the frame that failed validation.
        flag: crate::Flag,
        /// Checksum declared in the frame's head.
        declared: u32,
        /// Length declared in the frame's head, needed to key the `Resend`
        /// this error triggers.
        length: u16,
        /// Checksum actually computed over the reassembled body.
        computed: u32,
    },
}
