use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tracing::info;

use crate::config::Config;
use crate::handler::Dispatcher;
use crate::http::connection::Connection;

/// Pause after a failed accept; errors like EMFILE persist until some
/// connection closes.
const ACCEPT_BACKOFF: Duration = Duration::from_millis(100);

pub async fn run(cfg: Arc<Config>) -> anyhow::Result<()> {
    let listener = TcpListener::bind(cfg.listen_addr).await?;
    info!("HTTP server listening on {}", cfg.listen_addr);

    serve(listener, cfg).await
}

/// Accepts connections on an already bound listener until the task is
/// cancelled.
pub async fn serve(listener: TcpListener, cfg: Arc<Config>) -> anyhow::Result<()> {
    let dispatcher = Arc::new(Dispatcher::new(cfg)?);
    let mut next_id: u64 = 0;

    loop {
        let (socket, peer) = match listener.accept().await {
            Ok(accepted) => accepted,
            Err(e) => {
                tracing::error!("Accept failed: {}", e);
                tokio::time::sleep(ACCEPT_BACKOFF).await;
                continue;
            }
        };

        let id = next_id;
        next_id += 1;
        info!(conn = id, "Connection started with {}", peer);

        let dispatcher = Arc::clone(&dispatcher);
        tokio::spawn(async move {
            let mut conn = Connection::new(socket, dispatcher, id);
            if let Err(e) = conn.run().await {
                tracing::error!(conn = id, "Connection error from {}: {}", peer, e);
            }
        });
    }
}
