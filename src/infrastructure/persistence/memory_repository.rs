//! # 内存门店仓储
//!
//! 与 PostgreSQL 实现遵循相同的契约，用于测试以及未配置数据库时的降级运行。

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::domain::model::{Pagination, Store, StoreDraft};
use crate::domain::repository::StoreRepository;
use crate::error::{RepositoryError, RepositoryResult};

#[derive(Default)]
struct MemoryState {
    rows: HashMap<String, StoredRow>,
    sequence: u64,
}

struct StoredRow {
    store: Store,
    // 创建时间相同时按插入顺序排序
    sequence: u64,
}

#[derive(Default)]
pub struct InMemoryStoreRepository {
    state: RwLock<MemoryState>,
    operations: AtomicUsize,
}

impl InMemoryStoreRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// 仓储被调用的总次数
    pub fn operation_count(&self) -> usize {
        self.operations.load(Ordering::SeqCst)
    }

    pub async fn len(&self) -> usize {
        self.state.read().await.rows.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    fn record_operation(&self) {
        self.operations.fetch_add(1, Ordering::SeqCst);
    }
}

/// 保证更新时间严格递增
fn next_timestamp(previous: DateTime<Utc>) -> DateTime<Utc> {
    let now = Utc::now();
    if now > previous {
        now
    } else {
        previous + Duration::microseconds(1)
    }
}

#[async_trait]
impl StoreRepository for InMemoryStoreRepository {
    async fn create(&self, draft: &StoreDraft) -> RepositoryResult<Store> {
        self.record_operation();
        if draft.tenant_id.trim().is_empty() {
            return Err(RepositoryError::MissingTenant);
        }

        let now = Utc::now();
        let store = Store {
            id: Uuid::new_v4().to_string(),
            tenant_id: draft.tenant_id.clone(),
            name: draft.name.clone(),
            address: draft.address.clone(),
            phone: draft.phone.clone(),
            created_at: now,
            updated_at: now,
        };

        let mut state = self.state.write().await;
        state.sequence += 1;
        let sequence = state.sequence;
        state.rows.insert(
            store.id.clone(),
            StoredRow {
                store: store.clone(),
                sequence,
            },
        );

        Ok(store)
    }

    async fn get(&self, id: &str) -> RepositoryResult<Option<Store>> {
        self.record_operation();
        let state = self.state.read().await;
        Ok(state.rows.get(id).map(|row| row.store.clone()))
    }

    async fn list(
        &self,
        tenant_id: &str,
        pagination: Pagination,
    ) -> RepositoryResult<(Vec<Store>, u64)> {
        self.record_operation();
        let state = self.state.read().await;

        let mut rows: Vec<&StoredRow> = state
            .rows
            .values()
            .filter(|row| row.store.tenant_id == tenant_id)
            .collect();

        let total = rows.len() as u64;
        if total == 0 {
            return Ok((Vec::new(), 0));
        }

        rows.sort_by(|a, b| {
            b.store
                .created_at
                .cmp(&a.store.created_at)
                .then(b.sequence.cmp(&a.sequence))
        });

        let offset = usize::try_from(pagination.offset()).unwrap_or(usize::MAX);
        let limit = usize::try_from(pagination.limit()).unwrap_or(usize::MAX);
        let stores = rows
            .into_iter()
            .skip(offset)
            .take(limit)
            .map(|row| row.store.clone())
            .collect();

        Ok((stores, total))
    }

    async fn update(&self, store: &Store) -> RepositoryResult<Store> {
        self.record_operation();
        let mut state = self.state.write().await;
        let row = state.rows.get_mut(&store.id).ok_or(RepositoryError::NoRows)?;

        row.store.name = store.name.clone();
        row.store.address = store.address.clone();
        row.store.phone = store.phone.clone();
        row.store.updated_at = next_timestamp(row.store.updated_at);

        Ok(row.store.clone())
    }

    async fn delete(&self, id: &str) -> RepositoryResult<()> {
        self.record_operation();
        self.state.write().await.rows.remove(id);
        Ok(())
    }
}
