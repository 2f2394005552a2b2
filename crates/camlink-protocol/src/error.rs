//! Error types for the protocol layer.
//!
//! Everything in this enum is a *per-frame* failure. The capture tool is a
//! trusted peer that occasionally desynchronizes, not an adversary, so a
//! malformed frame is logged and dropped while the connection and any
//! registered event descriptors stay intact. There is no fatal variant.

/// Errors that can occur while decoding or splitting a frame.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProtocolError {
    /// The frame ended before a field did: a fixed-width read ran out of
    /// bytes, or a string had no NUL terminator.
    #[error("frame truncated")]
    FrameTruncated,

    /// An event descriptor referenced a key type this decoder does not
    /// implement. The raw wire value is carried for logging.
    ///
    /// This fires when the *occurrence* is decoded, not when the
    /// descriptor is registered — registration accepts any tag value.
    #[error("unknown event key type {0}")]
    UnknownKeyType(i32),

    /// The `hello` handshake carried the wrong protocol version.
    ///
    /// Deliberately lenient at the connection level: the caller reports
    /// this and keeps the connection open.
    #[error("protocol version mismatch: expected {expected}, got {got}")]
    VersionMismatch { expected: u32, got: u32 },
}
