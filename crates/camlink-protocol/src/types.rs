//! Fixed-layout frame payloads: handshake, camera samples, level init.
//!
//! Unlike game events these have no variable layout — they decode as a
//! known sequence of fields and nothing else.

use crate::{Cursor, ProtocolError};

/// The protocol version this decoder speaks. The peer announces its own in
/// the `hello` payload and the two must match.
pub const PROTOCOL_VERSION: u32 = 2;

/// Decodes a `hello` payload: one little-endian u32 version.
///
/// # Errors
/// - [`ProtocolError::FrameTruncated`] on a short payload.
/// - [`ProtocolError::VersionMismatch`] if the version is not
///   [`PROTOCOL_VERSION`]. The caller reports this and keeps the
///   connection open — mismatch is lenient by design.
pub fn decode_hello(payload: &[u8]) -> Result<u32, ProtocolError> {
    let version = Cursor::new(payload).read_u32_le()?;
    if version != PROTOCOL_VERSION {
        return Err(ProtocolError::VersionMismatch {
            expected: PROTOCOL_VERSION,
            got: version,
        });
    }
    Ok(version)
}

/// One camera sample: a fixed record of eight little-endian f32 fields.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CamSample {
    /// Peer-side timestamp.
    pub time: f32,
    pub x_pos: f32,
    pub y_pos: f32,
    pub z_pos: f32,
    pub x_rot: f32,
    pub y_rot: f32,
    pub z_rot: f32,
    /// Field of view in degrees.
    pub fov: f32,
}

impl CamSample {
    /// Decodes a `cam` payload. Trailing bytes beyond the eight fields are
    /// ignored.
    pub fn decode(payload: &[u8]) -> Result<Self, ProtocolError> {
        let mut cursor = Cursor::new(payload);
        Ok(Self {
            time: cursor.read_f32_le()?,
            x_pos: cursor.read_f32_le()?,
            y_pos: cursor.read_f32_le()?,
            z_pos: cursor.read_f32_le()?,
            x_rot: cursor.read_f32_le()?,
            y_rot: cursor.read_f32_le()?,
            z_rot: cursor.read_f32_le()?,
            fov: cursor.read_f32_le()?,
        })
    }
}

/// Decodes a `levelInit` payload: one NUL-terminated map name.
pub fn decode_level_init(payload: &[u8]) -> Result<String, ProtocolError> {
    Cursor::new(payload).read_cstr()
}

// =========================================================================
// Tests
// =========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_hello_accepts_current_version() {
        assert_eq!(
            decode_hello(&PROTOCOL_VERSION.to_le_bytes()),
            Ok(PROTOCOL_VERSION)
        );
    }

    #[test]
    fn test_decode_hello_rejects_version_one() {
        assert_eq!(
            decode_hello(&1u32.to_le_bytes()),
            Err(ProtocolError::VersionMismatch {
                expected: 2,
                got: 1
            })
        );
    }

    #[test]
    fn test_decode_hello_short_payload_returns_truncated() {
        assert_eq!(
            decode_hello(&[0x02, 0x00]),
            Err(ProtocolError::FrameTruncated)
        );
    }

    #[test]
    fn test_cam_sample_decodes_fixed_record_in_order() {
        let fields =
            [0.25f32, 1.0, 2.0, 3.0, 90.0, -45.0, 180.0, 60.0];
        let mut payload = Vec::new();
        for f in fields {
            payload.extend_from_slice(&f.to_le_bytes());
        }

        let sample = CamSample::decode(&payload).unwrap();
        assert_eq!(sample.time, 0.25);
        assert_eq!(sample.x_pos, 1.0);
        assert_eq!(sample.y_pos, 2.0);
        assert_eq!(sample.z_pos, 3.0);
        assert_eq!(sample.x_rot, 90.0);
        assert_eq!(sample.y_rot, -45.0);
        assert_eq!(sample.z_rot, 180.0);
        assert_eq!(sample.fov, 60.0);
    }

    #[test]
    fn test_cam_sample_ignores_trailing_bytes() {
        let mut payload = vec![0u8; 32];
        payload.extend_from_slice(&[0xDE, 0xAD]);
        assert_eq!(CamSample::decode(&payload).unwrap(), CamSample::default());
    }

    #[test]
    fn test_cam_sample_short_payload_returns_truncated() {
        let payload = vec![0u8; 31];
        assert_eq!(
            CamSample::decode(&payload),
            Err(ProtocolError::FrameTruncated)
        );
    }

    #[test]
    fn test_decode_level_init_reads_map_name() {
        assert_eq!(
            decode_level_init(b"de_inferno\0").unwrap(),
            "de_inferno"
        );
    }

    #[test]
    fn test_decode_level_init_missing_terminator_returns_truncated() {
        assert_eq!(
            decode_level_init(b"de_inferno"),
            Err(ProtocolError::FrameTruncated)
        );
    }
}
