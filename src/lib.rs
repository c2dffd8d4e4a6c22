//! OmniPOS 门店服务
//!
//! 多租户门店管理 gRPC 服务：拦截器从元数据提取租户身份，
//! 领域服务据此在每次读写时执行租户隔离。

pub mod application;
pub mod config;
pub mod context;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod interface;
pub mod proto;
pub mod service;
pub mod tracing;

pub use config::{AppConfig, LoadedConfig, load_config};
pub use context::{Context, TenantContext};
pub use error::{ErrorKind, RepositoryError, StoreError};
