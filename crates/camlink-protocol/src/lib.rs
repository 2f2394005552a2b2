//! Wire protocol for the Camlink capture bridge.
//!
//! The capture tool streams discrete binary messages over a persistent
//! connection. This crate turns those messages into typed values and
//! encodes the few things we say back:
//!
//! - **Framing** ([`split_frame`], [`encode_exec`], the
//!   [`TRANS_BEGIN`]/[`TRANS_END`] brackets) — tag-plus-payload splitting
//!   and outbound console-command encoding.
//! - **Fixed-layout payloads** ([`decode_hello`], [`CamSample`],
//!   [`decode_level_init`]) — handshake version, camera samples, map names.
//! - **Self-describing game events** ([`EventCatalog`],
//!   [`EventDescriptor`], [`TypeTag`]) — the two-phase descriptor /
//!   occurrence scheme with per-field dynamic typing.
//! - **Errors** ([`ProtocolError`]) — all per-frame, none fatal.
//!
//! # Architecture
//!
//! This layer is pure and synchronous: bytes in, values out. It knows
//! nothing about sockets or observers.
//!
//! ```text
//! Transport (bytes) → Protocol (frames, events) → Dispatch (observers)
//! ```

mod cursor;
mod error;
mod event;
mod frame;
mod types;
mod value;

pub use cursor::Cursor;
pub use error::ProtocolError;
pub use event::{
    EnrichmentMap, EventCatalog, EventDescriptor, EventKey,
    GameEventOccurrence,
};
pub use frame::{
    FrameTag, NUL, TRANS_BEGIN, TRANS_END, encode_exec, split_frame,
};
pub use types::{
    CamSample, PROTOCOL_VERSION, decode_hello, decode_level_init,
};
pub use value::{TypeTag, decode_value};
