use async_trait::async_trait;

use crate::domain::model::{Pagination, Store, StoreDraft};
use crate::error::RepositoryResult;

/// 门店仓储接口（需要作为 trait 对象使用，保留 async-trait）
///
/// 只负责数据访问，不做任何租户校验；租户ID只在 `list` 中作为显式过滤条件出现。
/// 每个方法对应一条原子语句，调用方取消时 future 被丢弃即可中止。
#[async_trait]
pub trait StoreRepository: Send + Sync {
    /// 插入门店，返回带有 id 和时间戳的实体；`tenant_id` 为空时拒绝
    async fn create(&self, draft: &StoreDraft) -> RepositoryResult<Store>;

    /// 按主键查询，不存在时返回 `None`
    async fn get(&self, id: &str) -> RepositoryResult<Option<Store>>;

    /// 按租户分页查询，按创建时间倒序；返回 (当前页, 总数)
    async fn list(
        &self,
        tenant_id: &str,
        pagination: Pagination,
    ) -> RepositoryResult<(Vec<Store>, u64)>;

    /// 按 id 全量替换可变字段并刷新 `updated_at`；id 不存在时返回 `NoRows`
    async fn update(&self, store: &Store) -> RepositoryResult<Store>;

    /// 删除门店，id 不存在时不报错
    async fn delete(&self, id: &str) -> RepositoryResult<()>;
}
