//! Unified error type for the Camlink bridge.

use camlink_protocol::ProtocolError;
use camlink_transport::{ConnectionId, TransportError};

/// Top-level error that wraps the layer-specific errors.
///
/// The `#[from]` attributes auto-generate `From` impls, so the `?`
/// operator converts lower-layer errors automatically.
#[derive(Debug, thiserror::Error)]
pub enum CamlinkError {
    /// A transport-level error (bind, accept, send, recv).
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A protocol-level error (frame split or decode).
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// A targeted send named a connection that is not live.
    #[error("no such connection: {0}")]
    UnknownConnection(ConnectionId),

    /// Loading an enrichment table from JSON failed.
    #[error("invalid enrichment table: {0}")]
    InvalidEnrichments(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_transport_error() {
        let err = TransportError::ConnectionClosed("gone".into());
        let camlink_err: CamlinkError = err.into();
        assert!(matches!(camlink_err, CamlinkError::Transport(_)));
        assert!(camlink_err.to_string().contains("gone"));
    }

    #[test]
    fn test_from_protocol_error() {
        let err = ProtocolError::FrameTruncated;
        let camlink_err: CamlinkError = err.into();
        assert!(matches!(camlink_err, CamlinkError::Protocol(_)));
    }

    #[test]
    fn test_unknown_connection_names_the_id() {
        let err = CamlinkError::UnknownConnection(ConnectionId::new(9));
        assert_eq!(err.to_string(), "no such connection: conn-9");
    }
}
