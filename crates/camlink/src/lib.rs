//! # Camlink
//!
//! WebSocket bridge for game-engine camera/event capture tools.
//!
//! A capture tool connects to this server over WebSocket and streams a
//! compact binary protocol: a version handshake, camera samples, level
//! transitions, and self-describing game events. Camlink decodes the
//! stream and fans results out to registered observers; the only
//! structured traffic it sends back is console commands.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use camlink::CamlinkServer;
//!
//! # async fn run() -> Result<(), camlink::CamlinkError> {
//! let server = CamlinkServer::builder()
//!     .bind("127.0.0.1:31337")
//!     .build()
//!     .await?;
//!
//! server.on_event(|event| {
//!     println!("{} @ {}: {:?}", event.name, event.client_time, event.keys);
//! });
//!
//! let handle = server.handle();
//! tokio::spawn(async move {
//!     handle.broadcast_exec("echo hello from camlink").await;
//! });
//!
//! server.run().await
//! # }
//! ```

mod enrich;
mod error;
mod handler;
mod server;

pub use enrich::EnrichmentTable;
pub use error::CamlinkError;
pub use server::{CamlinkHandle, CamlinkServer, CamlinkServerBuilder};

pub use camlink_dispatch::Dispatcher;
pub use camlink_protocol as protocol;
pub use camlink_transport::ConnectionId;
