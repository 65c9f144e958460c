//! API server implementation.

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::TcpListener;
use tracing::info;

use playrec_config::ServerConfig;

use crate::http::routes::create_router;
use crate::state::AppState;

/// The HTTP/WebSocket server the capture surfaces talk to.
pub struct ApiServer {
    config: ServerConfig,
    state: Arc<AppState>,
}

impl ApiServer {
    pub fn new(config: ServerConfig, state: Arc<AppState>) -> Self {
        Self { config, state }
    }

    /// Get the server address.
    pub fn addr(&self) -> String {
        self.config.bind_address()
    }

    /// Serve until `shutdown` resolves.
    pub async fn run_until<F>(&self, shutdown: F) -> Result<(), Box<dyn std::error::Error>>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let app = create_router(self.state.clone());

        let addr: SocketAddr = self.addr().parse()?;
        let listener = TcpListener::bind(addr).await?;

        info!("Playrec API listening on {}", addr);
        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown)
            .await?;

        Ok(())
    }

    /// Serve until Ctrl-C.
    pub async fn run(&self) -> Result<(), Box<dyn std::error::Error>> {
        self.run_until(async {
            if tokio::signal::ctrl_c().await.is_ok() {
                info!("Shutdown signal received");
            }
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::test_state;

    #[test]
    fn test_server_addr() {
        let config = ServerConfig {
            host: "0.0.0.0".to_string(),
            port: 3000,
        };
        let server = ApiServer::new(config, test_state().state);
        assert_eq!(server.addr(), "0.0.0.0:3000");
    }

    #[tokio::test]
    async fn test_run_until_returns_on_shutdown() {
        let config = ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
        };
        let server = ApiServer::new(config, test_state().state);
        server.run_until(async {}).await.unwrap();
    }
}
