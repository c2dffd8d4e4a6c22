use std::future::Future;
use std::net::SocketAddr;

use anyhow::{Context, Result};
use tonic::service::interceptor::InterceptedService;
use tonic::transport::Server;
use tonic::transport::server::Router;

use crate::interface::grpc::handler::StoreGrpcHandler;
use crate::interface::interceptor::TenantInterceptor;
use crate::proto::{FILE_DESCRIPTOR_SET, StoreServiceServer};

/// 挂载了租户拦截器的门店服务
pub type TenantScopedStoreService =
    InterceptedService<StoreServiceServer<StoreGrpcHandler>, TenantInterceptor>;

pub struct GrpcServer {
    handler: StoreGrpcHandler,
    interceptor: TenantInterceptor,
    address: SocketAddr,
}

impl GrpcServer {
    pub fn new(handler: StoreGrpcHandler, interceptor: TenantInterceptor, address: SocketAddr) -> Self {
        Self {
            handler,
            interceptor,
            address,
        }
    }

    /// 门店服务的所有方法都经过拦截器，没有未拦截的入口
    pub fn service(&self) -> TenantScopedStoreService {
        StoreServiceServer::with_interceptor(self.handler.clone(), self.interceptor.clone())
    }

    /// 门店服务 + gRPC reflection
    ///
    /// reflection 只暴露接口描述，不经过租户拦截器。
    pub fn router(&self) -> Result<Router> {
        let reflection = tonic_reflection::server::Builder::configure()
            .register_encoded_file_descriptor_set(FILE_DESCRIPTOR_SET)
            .build_v1()
            .context("failed to build reflection service")?;

        Ok(Server::builder()
            .add_service(self.service())
            .add_service(reflection))
    }

    pub async fn run_with_shutdown<F>(&self, signal: F) -> Result<()>
    where
        F: Future<Output = ()> + Send,
    {
        self.router()?
            .serve_with_shutdown(self.address, signal)
            .await?;
        Ok(())
    }

    pub fn address(&self) -> SocketAddr {
        self.address
    }
}
