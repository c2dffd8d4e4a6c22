pub mod wire;

use std::net::SocketAddr;

use anyhow::{Context, Result};
use tracing::{info, warn};

use crate::config::AppConfig;
use crate::interface::grpc::server::GrpcServer;

pub struct StoreServiceApp {
    grpc_server: GrpcServer,
}

impl StoreServiceApp {
    pub async fn new(app_config: &AppConfig) -> Result<Self> {
        let address = app_config
            .server
            .socket_addr()
            .context("invalid store server address")?;

        let context = wire::initialize(app_config).await?;
        let grpc_server = GrpcServer::new(context.handler, context.interceptor, address);

        Ok(Self { grpc_server })
    }

    pub async fn run(&self) -> Result<()> {
        info!(address = %self.grpc_server.address(), "Starting store service");
        self.grpc_server.run_with_shutdown(shutdown_signal()).await?;
        info!("Store service stopped");
        Ok(())
    }

    pub fn address(&self) -> SocketAddr {
        self.grpc_server.address()
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            warn!(error = %err, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};

        match signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(err) => {
                warn!(error = %err, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received, draining in-flight requests");
}
