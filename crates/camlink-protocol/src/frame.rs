//! Frame splitting and outbound command encoding.
//!
//! Every message on the wire starts with an ASCII command tag terminated
//! by a NUL byte; whatever follows is the tag-specific payload:
//!
//! ```text
//! ┌───────────────┬──────┬─────────────────────────┐
//! │ tag (ASCII)   │ 0x00 │ payload (tag-specific)  │
//! └───────────────┴──────┴─────────────────────────┘
//! ```
//!
//! Inbound frames are split with [`split_frame`]; the only structured
//! outbound traffic is console commands encoded with [`encode_exec`] plus
//! the two transaction-bracket frames [`TRANS_BEGIN`] / [`TRANS_END`].

use std::fmt;

use crate::ProtocolError;

/// The NUL separator used throughout the wire format.
pub const NUL: u8 = 0x00;

/// Opens a batch of configuration commands applied atomically by the peer.
pub const TRANS_BEGIN: &[u8] = b"transBegin\0";

/// Closes a [`TRANS_BEGIN`] batch.
pub const TRANS_END: &[u8] = b"transEnd\0";

/// The command tag at the head of an inbound frame.
///
/// Tags are case-sensitive ASCII. A tag outside the known set is *not* an
/// error — it becomes [`FrameTag::Unknown`] and still reaches the
/// generic-command observers, so newer peer versions degrade gracefully.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FrameTag {
    /// Handshake carrying the peer's protocol version.
    Hello,
    /// The peer stopped streaming camera/event data.
    DataStop,
    /// The peer started streaming camera/event data.
    DataStart,
    /// A level (map) was loaded; payload is the map name.
    LevelInit,
    /// The current level was torn down.
    LevelShutdown,
    /// One camera sample.
    Cam,
    /// A game-event descriptor or occurrence.
    GameEvent,
    /// Any tag this decoder does not recognize.
    Unknown(String),
}

impl FrameTag {
    fn from_tag(tag: &str) -> Self {
        match tag {
            "hello" => Self::Hello,
            "dataStop" => Self::DataStop,
            "dataStart" => Self::DataStart,
            "levelInit" => Self::LevelInit,
            "levelShutdown" => Self::LevelShutdown,
            "cam" => Self::Cam,
            "gameEvent" => Self::GameEvent,
            other => Self::Unknown(other.to_string()),
        }
    }

    /// The tag as it appears on the wire.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Hello => "hello",
            Self::DataStop => "dataStop",
            Self::DataStart => "dataStart",
            Self::LevelInit => "levelInit",
            Self::LevelShutdown => "levelShutdown",
            Self::Cam => "cam",
            Self::GameEvent => "gameEvent",
            Self::Unknown(tag) => tag,
        }
    }
}

impl fmt::Display for FrameTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Splits an inbound message into its command tag and payload.
///
/// Reads bytes through the first NUL as the tag (any NUL bytes are
/// stripped before comparison) and returns the remainder as the payload.
///
/// # Errors
/// Returns [`ProtocolError::FrameTruncated`] if the message contains no
/// NUL terminator at all.
pub fn split_frame(data: &[u8]) -> Result<(FrameTag, &[u8]), ProtocolError> {
    let end = data
        .iter()
        .position(|&b| b == NUL)
        .ok_or(ProtocolError::FrameTruncated)?;
    let tag_bytes: Vec<u8> = data[..=end]
        .iter()
        .copied()
        .filter(|&b| b != NUL)
        .collect();
    let tag = String::from_utf8_lossy(&tag_bytes);
    Ok((FrameTag::from_tag(&tag), &data[end + 1..]))
}

/// Encodes a console command for the peer: `"exec" NUL command NUL`.
pub fn encode_exec(command: &str) -> Vec<u8> {
    let mut frame = Vec::with_capacity(4 + 1 + command.len() + 1);
    frame.extend_from_slice(b"exec");
    frame.push(NUL);
    frame.extend_from_slice(command.as_bytes());
    frame.push(NUL);
    frame
}

// =========================================================================
// Tests
// =========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    // =====================================================================
    // split_frame()
    // =====================================================================

    #[test]
    fn test_split_frame_known_tag_and_payload() {
        let (tag, payload) = split_frame(b"cam\0\x01\x02").unwrap();
        assert_eq!(tag, FrameTag::Cam);
        assert_eq!(payload, &[0x01, 0x02]);
    }

    #[test]
    fn test_split_frame_empty_payload() {
        let (tag, payload) = split_frame(b"dataStart\0").unwrap();
        assert_eq!(tag, FrameTag::DataStart);
        assert!(payload.is_empty());
    }

    #[test]
    fn test_split_frame_recognizes_every_known_tag() {
        for (raw, tag) in [
            ("hello", FrameTag::Hello),
            ("dataStop", FrameTag::DataStop),
            ("dataStart", FrameTag::DataStart),
            ("levelInit", FrameTag::LevelInit),
            ("levelShutdown", FrameTag::LevelShutdown),
            ("cam", FrameTag::Cam),
            ("gameEvent", FrameTag::GameEvent),
        ] {
            let mut frame = raw.as_bytes().to_vec();
            frame.push(0);
            assert_eq!(split_frame(&frame).unwrap().0, tag);
        }
    }

    #[test]
    fn test_split_frame_unrecognized_tag_is_not_an_error() {
        let (tag, _) = split_frame(b"somethingNew\0").unwrap();
        assert_eq!(tag, FrameTag::Unknown("somethingNew".to_string()));
    }

    #[test]
    fn test_split_frame_tag_is_case_sensitive() {
        let (tag, _) = split_frame(b"Hello\0").unwrap();
        assert_eq!(tag, FrameTag::Unknown("Hello".to_string()));
    }

    #[test]
    fn test_split_frame_missing_terminator_returns_truncated() {
        assert_eq!(
            split_frame(b"gameEvent"),
            Err(ProtocolError::FrameTruncated)
        );
    }

    #[test]
    fn test_split_frame_empty_message_returns_truncated() {
        assert_eq!(split_frame(b""), Err(ProtocolError::FrameTruncated));
    }

    // =====================================================================
    // encode_exec() and bracket frames
    // =====================================================================

    #[test]
    fn test_encode_exec_exact_bytes() {
        // "exec" NUL "say hi" NUL, byte for byte.
        assert_eq!(
            encode_exec("say hi"),
            [
                0x65, 0x78, 0x65, 0x63, 0x00, 0x73, 0x61, 0x79, 0x20,
                0x68, 0x69, 0x00
            ]
        );
    }

    #[test]
    fn test_encode_exec_empty_command() {
        assert_eq!(encode_exec(""), b"exec\0\0");
    }

    #[test]
    fn test_bracket_frames_have_no_exec_wrapper() {
        assert_eq!(TRANS_BEGIN, b"transBegin\0");
        assert_eq!(TRANS_END, b"transEnd\0");
    }

    #[test]
    fn test_frame_tag_display_matches_wire_form() {
        assert_eq!(FrameTag::GameEvent.to_string(), "gameEvent");
        assert_eq!(
            FrameTag::Unknown("mystery".to_string()).to_string(),
            "mystery"
        );
    }
}
