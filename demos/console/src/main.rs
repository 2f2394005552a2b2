//! Console demo: run the bridge, log everything that arrives, and forward
//! stdin lines to connected clients as console commands.
//!
//! Point the capture tool at it (enclose the URL in double quotes):
//!
//! ```text
//! mirv_pgl url "ws://127.0.0.1:31337/"
//! mirv_pgl start
//! mirv_pgl datastart
//! ```

use camlink::{CamlinkError, CamlinkServer};
use tokio::io::{AsyncBufReadExt, BufReader};

#[tokio::main]
async fn main() -> Result<(), CamlinkError> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let bind = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "127.0.0.1:31337".to_string());

    let server = CamlinkServer::builder().bind(&bind).build().await?;

    server.on_command(|tag| {
        tracing::info!(%tag, "control command");
    });
    server.on_cam(|sample| {
        tracing::debug!(
            time = sample.time,
            x = sample.x_pos,
            y = sample.y_pos,
            z = sample.z_pos,
            fov = sample.fov,
            "cam"
        );
    });
    server.on_event(|event| {
        tracing::info!(
            name = %event.name,
            time = event.client_time,
            keys = ?event.keys,
            "game event"
        );
    });
    server.on_level_init(|map| {
        tracing::info!(%map, "level init");
    });

    // Stdin lines become broadcast console commands.
    let handle = server.handle();
    tokio::spawn(async move {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        while let Ok(Some(line)) = lines.next_line().await {
            let command = line.trim();
            if command.is_empty() {
                continue;
            }
            handle.broadcast_exec(command).await;
        }
    });

    server.run().await
}
