//! Per-connection handler: frame routing and connection-scoped decoding.
//!
//! Each accepted connection gets its own Tokio task running this handler.
//! The loop is strictly sequential — the catalog read for occurrence *k*
//! observes every descriptor registered before it on this connection —
//! while everything downstream of a successful decode is fire-and-forget
//! through the dispatcher.
//!
//! Failure policy: every decode error is local to its frame. It is
//! logged, the frame is dropped, and the loop keeps reading. Nothing in
//! here closes the connection except the peer going away.

use std::sync::Arc;

use camlink_protocol::{
    CamSample, EventCatalog, FrameTag, TRANS_BEGIN, TRANS_END,
    decode_hello, decode_level_init, encode_exec, split_frame,
};
use camlink_transport::{Connection, TransportError, WebSocketConnection};

use crate::EnrichmentTable;
use crate::server::ServerState;

/// Handles a single capture-tool connection from accept to close.
pub(crate) async fn handle_connection(
    conn: WebSocketConnection,
    state: Arc<ServerState>,
) {
    let conn_id = conn.id();
    state
        .connections
        .lock()
        .await
        .insert(conn_id, conn.clone());

    // Connection-scoped: descriptors die with the connection and must be
    // renegotiated after a reconnect.
    let mut catalog =
        EventCatalog::with_enrichments(state.enrichments.to_map());

    loop {
        match conn.recv().await {
            Ok(Some(data)) => {
                handle_frame(&conn, &state, &mut catalog, &data).await;
            }
            Ok(None) => {
                tracing::info!(%conn_id, "capture client disconnected");
                break;
            }
            Err(e) => {
                tracing::debug!(%conn_id, error = %e, "recv error");
                break;
            }
        }
    }

    state.connections.lock().await.remove(&conn_id);
}

/// Routes one inbound frame. Never fails — all errors are logged and
/// swallowed here, per the per-frame failure policy.
async fn handle_frame(
    conn: &WebSocketConnection,
    state: &Arc<ServerState>,
    catalog: &mut EventCatalog,
    data: &[u8],
) {
    let conn_id = conn.id();

    let (tag, payload) = match split_frame(data) {
        Ok(split) => split,
        Err(e) => {
            tracing::error!(%conn_id, error = %e, "unframeable message");
            return;
        }
    };

    match tag {
        FrameTag::Hello => match decode_hello(payload) {
            Ok(version) => {
                tracing::info!(%conn_id, version, "capture client handshake");
                if let Err(e) =
                    send_handshake_batch(conn, &state.enrichments).await
                {
                    tracing::error!(
                        %conn_id,
                        error = %e,
                        "failed to send handshake batch"
                    );
                }
                state.dispatcher.dispatch_command(FrameTag::Hello);
            }
            // Lenient on purpose: report the mismatch, skip the reply
            // batch, keep the connection open.
            Err(e) => {
                tracing::error!(%conn_id, error = %e, "handshake rejected");
            }
        },

        FrameTag::Cam => match CamSample::decode(payload) {
            Ok(sample) => state.dispatcher.dispatch_cam(sample),
            Err(e) => {
                tracing::error!(%conn_id, error = %e, "bad cam frame");
            }
        },

        FrameTag::GameEvent => match catalog.decode_frame(payload) {
            Ok(occurrence) => {
                tracing::debug!(
                    %conn_id,
                    event = %occurrence.name,
                    "game event"
                );
                state.dispatcher.dispatch_event(occurrence);
            }
            Err(e) => {
                tracing::error!(%conn_id, error = %e, "bad game event frame");
            }
        },

        FrameTag::LevelInit => match decode_level_init(payload) {
            Ok(map_name) => {
                tracing::info!(%conn_id, map = %map_name, "level init");
                state.dispatcher.dispatch_level_init(&map_name);
            }
            Err(e) => {
                tracing::error!(%conn_id, error = %e, "bad levelInit frame");
            }
        },

        FrameTag::DataStart | FrameTag::DataStop | FrameTag::LevelShutdown => {
            tracing::info!(%conn_id, %tag, "control command");
            state.dispatcher.dispatch_command(tag);
        }

        FrameTag::Unknown(ref name) => {
            tracing::warn!(%conn_id, tag = %name, "unknown command");
            state.dispatcher.dispatch_command(tag.clone());
        }
    }
}

/// Sends the post-handshake configuration batch, bracketed as one
/// transaction: enable client timestamps, request enrichments, enable
/// event streaming with descriptor caching.
async fn send_handshake_batch(
    conn: &WebSocketConnection,
    enrichments: &EnrichmentTable,
) -> Result<(), TransportError> {
    conn.send(TRANS_BEGIN).await?;
    conn.send(&encode_exec("mirv_pgl events enrich clientTime 1"))
        .await?;
    for command in enrichments.handshake_commands() {
        conn.send(&encode_exec(&command)).await?;
    }
    conn.send(&encode_exec("mirv_pgl events enabled 1")).await?;
    conn.send(&encode_exec("mirv_pgl events useCache 1")).await?;
    conn.send(TRANS_END).await?;
    Ok(())
}
