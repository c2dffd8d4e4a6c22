//! # 租户拦截器
//!
//! 每个入站调用在进入任何处理器之前都会经过这里：从元数据中提取租户ID，
//! 派生本次调用独立的 `Context` 并放入请求扩展。没有公开接口，所有方法都需要租户身份。

use std::sync::Arc;

use tonic::metadata::MetadataMap;
use tonic::service::Interceptor;
use tonic::{Request, Status};
use tracing::warn;
use uuid::Uuid;

use crate::config::DEFAULT_TENANT_HEADER;
use crate::context::Context;

pub const REQUEST_ID_HEADER: &str = "x-request-id";

#[derive(Debug, Clone)]
pub struct TenantInterceptor {
    tenant_header: Arc<str>,
}

impl TenantInterceptor {
    /// `tenant_header` 必须是小写的 ASCII 元数据键
    pub fn new(tenant_header: impl Into<String>) -> Self {
        Self {
            tenant_header: Arc::from(tenant_header.into()),
        }
    }

    pub fn tenant_header(&self) -> &str {
        &self.tenant_header
    }

    /// 从元数据构建本次调用的上下文
    pub fn authenticate(&self, metadata: &MetadataMap) -> Result<Context, Status> {
        if metadata.is_empty() {
            warn!("no metadata in request");
            return Err(Status::unauthenticated("missing authentication context"));
        }

        // 多个值时只取第一个
        let tenant_id = metadata
            .get_all(self.tenant_header.as_ref())
            .iter()
            .next()
            .and_then(|value| value.to_str().ok())
            .map(str::trim)
            .filter(|value| !value.is_empty());

        let Some(tenant_id) = tenant_id else {
            warn!(header = %self.tenant_header, "no tenant id in metadata");
            return Err(Status::unauthenticated("missing tenant context"));
        };

        let request_id = metadata
            .get(REQUEST_ID_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| Uuid::new_v4().to_string());

        Ok(Context::root()
            .with_request_id(request_id)
            .with_tenant_id(tenant_id))
    }
}

impl Default for TenantInterceptor {
    fn default() -> Self {
        Self::new(DEFAULT_TENANT_HEADER)
    }
}

impl Interceptor for TenantInterceptor {
    fn call(&mut self, mut request: Request<()>) -> Result<Request<()>, Status> {
        let ctx = self.authenticate(request.metadata())?;
        request.extensions_mut().insert(ctx);
        Ok(request)
    }
}

/// 从 gRPC 请求中取出拦截器放入的上下文
///
/// 没有经过拦截器的请求得到根上下文，领域层会按未认证处理。
pub fn request_context<T>(request: &Request<T>) -> Context {
    request
        .extensions()
        .get::<Context>()
        .cloned()
        .unwrap_or_default()
}
