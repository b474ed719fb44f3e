//! HTTP server for the mock endpoints and the setup/verification API.

use crate::dispatcher::RequestDispatcher;
use crate::http_api::router::route_request;
use crate::registry::ServiceRegistry;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper_util::rt::TokioIo;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{debug, error, info};

/// Completes once `signal` fires. If the signal cannot be listened for, the
/// error is logged and this never completes, so the server keeps running.
pub async fn shutdown_on<F>(signal: F)
where
    F: Future<Output = std::io::Result<()>>,
{
    match signal.await {
        Ok(()) => info!("Received shutdown signal"),
        Err(e) => {
            error!("Failed to listen for shutdown signal: {}", e);
            std::future::pending::<()>().await
        }
    }
}

/// Mock server bound to a listening socket
pub struct MockServer {
    listener: TcpListener,
    dispatcher: RequestDispatcher,
}

impl MockServer {
    /// Bind the listener. Port 0 picks an ephemeral port.
    pub async fn bind(
        addr: SocketAddr,
        registry: Arc<ServiceRegistry>,
    ) -> Result<Self, anyhow::Error> {
        let listener = TcpListener::bind(addr).await?;
        Ok(Self {
            listener,
            dispatcher: RequestDispatcher::new(registry),
        })
    }

    pub fn local_addr(&self) -> Result<SocketAddr, anyhow::Error> {
        Ok(self.listener.local_addr()?)
    }

    /// Serve until `shutdown` completes. Each connection runs on its own task.
    pub async fn serve(self, shutdown: impl Future<Output = ()>) -> Result<(), anyhow::Error> {
        let addr = self.local_addr()?;
        info!(
            "Decoy mock server listening on http://{} ({} services)",
            addr,
            self.dispatcher.registry().len()
        );
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                result = self.listener.accept() => {
                    match result {
                        Ok((stream, peer)) => {
                            let io = TokioIo::new(stream);
                            let dispatcher = self.dispatcher.clone();

                            tokio::spawn(async move {
                                let service = service_fn(move |req| {
                                    let dispatcher = dispatcher.clone();
                                    async move { route_request(req, dispatcher).await }
                                });

                                if let Err(e) = http1::Builder::new().serve_connection(io, service).await {
                                    debug!("Connection error from {}: {}", peer, e);
                                }
                            });
                        }
                        Err(e) => {
                            error!("Accept error on {}: {}", addr, e);
                        }
                    }
                }
                _ = &mut shutdown => {
                    info!("Mock server on {} shutting down", addr);
                    break;
                }
            }
        }
        Ok(())
    }
}
