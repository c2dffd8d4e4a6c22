//! # 门店领域服务
//!
//! 租户隔离在这一层执行：
//! - 写入时从上下文盖上租户ID，请求体中的租户信息一律不可信
//! - 单条读取 / 更新 / 删除先查询再校验归属
//! - 列表查询按上下文租户过滤，并补齐分页默认值
//!
//! 所有操作在访问仓储之前先要求上下文中存在租户。

use std::sync::Arc;

use tracing::{debug, warn};

use crate::context::Context;
use crate::domain::model::{Pagination, Store, StoreAttributes, StoreDraft, StorePage};
use crate::domain::repository::StoreRepository;
use crate::error::{RepositoryError, Result, StoreError};

pub struct StoreDomainService {
    repository: Arc<dyn StoreRepository>,
}

impl StoreDomainService {
    pub fn new(repository: Arc<dyn StoreRepository>) -> Self {
        Self { repository }
    }

    pub async fn create_store(&self, ctx: &Context, attributes: StoreAttributes) -> Result<Store> {
        let tenant_id = ctx.require_tenant_id()?;
        let draft = StoreDraft::new(tenant_id, attributes);

        let store = self.repository.create(&draft).await?;
        debug!(
            request_id = %ctx.request_id(),
            tenant_id = %store.tenant_id,
            store_id = %store.id,
            "store persisted"
        );
        Ok(store)
    }

    pub async fn get_store(&self, ctx: &Context, id: &str) -> Result<Store> {
        let tenant_id = ctx.require_tenant_id()?;
        self.load_owned(ctx, tenant_id, id).await
    }

    pub async fn list_stores(&self, ctx: &Context, page: i32, page_size: i32) -> Result<StorePage> {
        let tenant_id = ctx.require_tenant_id()?;
        let pagination = Pagination::normalize(page, page_size);

        let (stores, total) = self.repository.list(tenant_id, pagination).await?;
        Ok(StorePage {
            stores,
            total,
            pagination,
        })
    }

    /// 先复用读取时的归属校验，再把可变字段合并到当前实体上
    pub async fn update_store(
        &self,
        ctx: &Context,
        id: &str,
        attributes: StoreAttributes,
    ) -> Result<Store> {
        let tenant_id = ctx.require_tenant_id()?;
        let mut current = self.load_owned(ctx, tenant_id, id).await?;
        current.apply(attributes);

        match self.repository.update(&current).await {
            Ok(store) => Ok(store),
            // 读取与更新之间被并发删除
            Err(RepositoryError::NoRows) => Err(StoreError::NotFound(id.to_string())),
            Err(err) => Err(err.into()),
        }
    }

    pub async fn delete_store(&self, ctx: &Context, id: &str) -> Result<()> {
        let tenant_id = ctx.require_tenant_id()?;
        self.load_owned(ctx, tenant_id, id).await?;

        self.repository.delete(id).await?;
        Ok(())
    }

    async fn load_owned(&self, ctx: &Context, tenant_id: &str, id: &str) -> Result<Store> {
        let store = self
            .repository
            .get(id)
            .await?
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;

        if store.tenant_id != tenant_id {
            warn!(
                request_id = %ctx.request_id(),
                tenant_id = %tenant_id,
                store_id = %id,
                "rejected access to store owned by another tenant"
            );
            return Err(StoreError::PermissionDenied(id.to_string()));
        }

        Ok(store)
    }
}
