use std::sync::Arc;

use tracing::{debug, info};

use crate::application::commands::{CreateStoreCommand, DeleteStoreCommand, UpdateStoreCommand};
use crate::application::queries::{GetStoreQuery, ListStoresQuery};
use crate::context::Context;
use crate::domain::model::{Store, StorePage};
use crate::domain::service::StoreDomainService;
use crate::error::Result;

/// 门店命令处理器
pub struct StoreCommandHandler {
    domain_service: Arc<StoreDomainService>,
}

impl StoreCommandHandler {
    pub fn new(domain_service: Arc<StoreDomainService>) -> Self {
        Self { domain_service }
    }

    /// 处理创建门店命令
    pub async fn handle_create_store(
        &self,
        ctx: &Context,
        command: CreateStoreCommand,
    ) -> Result<Store> {
        debug!(
            request_id = %ctx.request_id(),
            name = %command.name,
            "Handling create store command"
        );

        let store = self
            .domain_service
            .create_store(ctx, command.attributes())
            .await?;

        info!(
            request_id = %ctx.request_id(),
            tenant_id = %store.tenant_id,
            store_id = %store.id,
            "Store created"
        );
        Ok(store)
    }

    /// 处理更新门店命令
    pub async fn handle_update_store(
        &self,
        ctx: &Context,
        command: UpdateStoreCommand,
    ) -> Result<Store> {
        debug!(
            request_id = %ctx.request_id(),
            store_id = %command.store_id,
            "Handling update store command"
        );

        let (store_id, attributes) = command.into_parts();
        let store = self
            .domain_service
            .update_store(ctx, &store_id, attributes)
            .await?;

        info!(request_id = %ctx.request_id(), store_id = %store.id, "Store updated");
        Ok(store)
    }

    /// 处理删除门店命令
    pub async fn handle_delete_store(&self, ctx: &Context, command: DeleteStoreCommand) -> Result<()> {
        debug!(
            request_id = %ctx.request_id(),
            store_id = %command.store_id,
            "Handling delete store command"
        );

        self.domain_service
            .delete_store(ctx, &command.store_id)
            .await?;

        info!(request_id = %ctx.request_id(), store_id = %command.store_id, "Store deleted");
        Ok(())
    }
}

/// 门店查询处理器
pub struct StoreQueryHandler {
    domain_service: Arc<StoreDomainService>,
}

impl StoreQueryHandler {
    pub fn new(domain_service: Arc<StoreDomainService>) -> Self {
        Self { domain_service }
    }

    /// 处理查询门店
    pub async fn handle_get_store(&self, ctx: &Context, query: GetStoreQuery) -> Result<Store> {
        debug!(
            request_id = %ctx.request_id(),
            store_id = %query.store_id,
            "Handling get store query"
        );

        self.domain_service.get_store(ctx, &query.store_id).await
    }

    /// 处理列出门店查询
    pub async fn handle_list_stores(&self, ctx: &Context, query: ListStoresQuery) -> Result<StorePage> {
        debug!(
            request_id = %ctx.request_id(),
            page = query.page,
            page_size = query.page_size,
            "Handling list stores query"
        );

        self.domain_service
            .list_stores(ctx, query.page, query.page_size)
            .await
    }
}
