//! Wire 风格的依赖注入模块
//!
//! 按依赖顺序构建所有组件：仓储 → 领域服务 → 命令/查询处理器 → gRPC 处理器 + 拦截器

use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{info, warn};

use crate::application::handlers::{StoreCommandHandler, StoreQueryHandler};
use crate::config::{AppConfig, TenancyConfig};
use crate::domain::repository::StoreRepository;
use crate::domain::service::StoreDomainService;
use crate::infrastructure::persistence::{InMemoryStoreRepository, PostgresStoreRepository};
use crate::interface::grpc::handler::StoreGrpcHandler;
use crate::interface::interceptor::TenantInterceptor;

/// 应用上下文 - 包含所有已初始化的服务
pub struct ApplicationContext {
    pub handler: StoreGrpcHandler,
    pub interceptor: TenantInterceptor,
    pub repository: Arc<dyn StoreRepository>,
}

/// 构建应用上下文
///
/// 配置了 PostgreSQL 时连接数据库（可选建表），否则退回到进程内仓储。
pub async fn initialize(app_config: &AppConfig) -> Result<ApplicationContext> {
    let repository: Arc<dyn StoreRepository> = match &app_config.postgres {
        Some(postgres) => {
            let repo = PostgresStoreRepository::connect(postgres)
                .await
                .context("Failed to connect to PostgreSQL")?;
            if postgres.init_schema {
                repo.init_schema()
                    .await
                    .context("Failed to initialize stores schema")?;
            }
            info!("Using PostgreSQL store repository");
            Arc::new(repo)
        }
        None => {
            warn!("PostgreSQL not configured, using in-memory store repository (data is not persisted)");
            Arc::new(InMemoryStoreRepository::new())
        }
    };

    Ok(assemble(repository, &app_config.tenancy))
}

/// 在给定仓储之上组装其余组件
pub fn assemble(repository: Arc<dyn StoreRepository>, tenancy: &TenancyConfig) -> ApplicationContext {
    let domain_service = Arc::new(StoreDomainService::new(repository.clone()));
    let command_handler = Arc::new(StoreCommandHandler::new(domain_service.clone()));
    let query_handler = Arc::new(StoreQueryHandler::new(domain_service));

    ApplicationContext {
        handler: StoreGrpcHandler::new(
            command_handler,
            query_handler,
            tenancy.conceal_foreign_stores,
        ),
        interceptor: TenantInterceptor::new(tenancy.header.clone()),
        repository,
    }
}
