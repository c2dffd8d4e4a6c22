//! # 接口层
//!
//! gRPC 拦截器、处理器与服务器

pub mod grpc;
pub mod interceptor;

pub use interceptor::{TenantInterceptor, request_context};
