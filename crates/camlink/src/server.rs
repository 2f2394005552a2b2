//! `CamlinkServer` builder, accept loop, and broadcast surface.
//!
//! The server owns the WebSocket listener and a registry of live
//! connections. Each accepted connection gets its own handler task; the
//! registry exists so commands can be pushed to clients from outside the
//! per-connection loops (a REPL, match orchestration, etc.).

use std::collections::HashMap;
use std::sync::Arc;

use camlink_dispatch::Dispatcher;
use camlink_protocol::{
    CamSample, FrameTag, GameEventOccurrence, TRANS_BEGIN, TRANS_END,
    encode_exec,
};
use camlink_transport::{
    Connection, ConnectionId, Transport, WebSocketConnection,
    WebSocketTransport,
};
use tokio::sync::Mutex;

use crate::EnrichmentTable;
use crate::handler::handle_connection;
use crate::CamlinkError;

/// Shared server state, cheaply cloneable across tasks via `Arc`.
pub(crate) struct ServerState {
    pub(crate) dispatcher: Dispatcher,
    pub(crate) enrichments: EnrichmentTable,
    pub(crate) connections:
        Mutex<HashMap<ConnectionId, WebSocketConnection>>,
}

/// Builder for configuring and starting a Camlink server.
///
/// # Example
///
/// ```rust,ignore
/// let server = CamlinkServer::builder()
///     .bind("0.0.0.0:31337")
///     .enrichments(EnrichmentTable::builtin())
///     .build()
///     .await?;
/// server.run().await
/// ```
pub struct CamlinkServerBuilder {
    bind_addr: String,
    enrichments: EnrichmentTable,
}

impl CamlinkServerBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self {
            bind_addr: "127.0.0.1:31337".to_string(),
            enrichments: EnrichmentTable::builtin(),
        }
    }

    /// Sets the address to bind the server to.
    pub fn bind(mut self, addr: &str) -> Self {
        self.bind_addr = addr.to_string();
        self
    }

    /// Replaces the enrichment table (the built-in set by default).
    pub fn enrichments(mut self, table: EnrichmentTable) -> Self {
        self.enrichments = table;
        self
    }

    /// Binds the transport and builds the server.
    pub async fn build(self) -> Result<CamlinkServer, CamlinkError> {
        let transport = WebSocketTransport::bind(&self.bind_addr).await?;

        let state = Arc::new(ServerState {
            dispatcher: Dispatcher::new(),
            enrichments: self.enrichments,
            connections: Mutex::new(HashMap::new()),
        });

        Ok(CamlinkServer { transport, state })
    }
}

impl Default for CamlinkServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A running Camlink server.
///
/// Register observers, grab a [`CamlinkHandle`] for pushing commands,
/// then call [`run()`](Self::run) to start accepting connections.
pub struct CamlinkServer {
    transport: WebSocketTransport,
    state: Arc<ServerState>,
}

impl CamlinkServer {
    /// Creates a new builder.
    pub fn builder() -> CamlinkServerBuilder {
        CamlinkServerBuilder::new()
    }

    /// Returns the local address the server is bound to.
    pub fn local_addr(&self) -> std::io::Result<std::net::SocketAddr> {
        self.transport.local_addr()
    }

    /// Registers an observer for generic commands (control tags and
    /// unknown tags).
    pub fn on_command(
        &self,
        observer: impl Fn(FrameTag) + Send + Sync + 'static,
    ) {
        self.state.dispatcher.on_command(observer);
    }

    /// Registers an observer for camera samples.
    pub fn on_cam(
        &self,
        observer: impl Fn(CamSample) + Send + Sync + 'static,
    ) {
        self.state.dispatcher.on_cam(observer);
    }

    /// Registers an observer for decoded game-event occurrences.
    pub fn on_event(
        &self,
        observer: impl Fn(Arc<GameEventOccurrence>) + Send + Sync + 'static,
    ) {
        self.state.dispatcher.on_event(observer);
    }

    /// Registers an observer for level-init map names.
    pub fn on_level_init(
        &self,
        observer: impl Fn(Arc<str>) + Send + Sync + 'static,
    ) {
        self.state.dispatcher.on_level_init(observer);
    }

    /// Returns a cloneable handle for pushing commands to clients while
    /// the server runs.
    pub fn handle(&self) -> CamlinkHandle {
        CamlinkHandle {
            state: Arc::clone(&self.state),
        }
    }

    /// Runs the server accept loop.
    ///
    /// Accepts incoming connections and spawns a handler task for each.
    /// Runs until the process is terminated.
    pub async fn run(mut self) -> Result<(), CamlinkError> {
        tracing::info!("Camlink server running");

        loop {
            match self.transport.accept().await {
                Ok(conn) => {
                    let state = Arc::clone(&self.state);
                    tokio::spawn(handle_connection(conn, state));
                }
                Err(e) => {
                    tracing::error!(error = %e, "accept failed");
                }
            }
        }
    }
}

/// A cloneable handle to the running server's connection registry.
#[derive(Clone)]
pub struct CamlinkHandle {
    state: Arc<ServerState>,
}

impl CamlinkHandle {
    /// Sends a console command to every connected client.
    ///
    /// Per-connection send failures are logged and skipped; the handler
    /// task notices the dead connection on its next read.
    pub async fn broadcast_exec(&self, command: &str) {
        let frame = encode_exec(command);
        self.broadcast_raw(&frame).await;
    }

    /// Sends a console command to one specific client.
    pub async fn send_exec(
        &self,
        conn_id: ConnectionId,
        command: &str,
    ) -> Result<(), CamlinkError> {
        let conn = self
            .state
            .connections
            .lock()
            .await
            .get(&conn_id)
            .cloned()
            .ok_or(CamlinkError::UnknownConnection(conn_id))?;
        conn.send(&encode_exec(command)).await?;
        Ok(())
    }

    /// Opens a configuration-command transaction on every client.
    pub async fn trans_begin(&self) {
        self.broadcast_raw(TRANS_BEGIN).await;
    }

    /// Closes a configuration-command transaction on every client.
    pub async fn trans_end(&self) {
        self.broadcast_raw(TRANS_END).await;
    }

    /// Number of currently connected clients.
    pub async fn connection_count(&self) -> usize {
        self.state.connections.lock().await.len()
    }

    async fn broadcast_raw(&self, frame: &[u8]) {
        let connections: Vec<WebSocketConnection> = {
            let registry = self.state.connections.lock().await;
            registry.values().cloned().collect()
        };
        for conn in connections {
            if let Err(e) = conn.send(frame).await {
                tracing::warn!(
                    conn_id = %conn.id(),
                    error = %e,
                    "broadcast send failed"
                );
            }
        }
    }
}
