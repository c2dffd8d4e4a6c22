//! # PostgreSQL Store Repository
//!
//! 门店表的持久化实现。每个操作都是一条原子语句，不使用跨语句事务。

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgPoolOptions;
use sqlx::{FromRow, PgPool};
use tracing::info;

use crate::config::PostgresConfig;
use crate::domain::model::{Pagination, Store, StoreDraft};
use crate::domain::repository::StoreRepository;
use crate::error::{RepositoryError, RepositoryResult};

const DEFAULT_MAX_CONNECTIONS: u32 = 10;
const DEFAULT_ACQUIRE_TIMEOUT_SECS: u64 = 5;

/// 门店查询行结构（用于SQL查询结果映射）
#[derive(Debug, FromRow)]
struct StoreRow {
    id: String,
    tenant_id: String,
    name: String,
    address: String,
    phone: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<StoreRow> for Store {
    fn from(row: StoreRow) -> Self {
        Store {
            id: row.id,
            tenant_id: row.tenant_id,
            name: row.name,
            address: row.address,
            phone: row.phone,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

pub struct PostgresStoreRepository {
    pool: Arc<PgPool>,
}

impl PostgresStoreRepository {
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }

    /// 按配置创建连接池
    pub async fn connect(config: &PostgresConfig) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections.unwrap_or(DEFAULT_MAX_CONNECTIONS))
            .min_connections(config.min_connections.unwrap_or(0))
            .acquire_timeout(Duration::from_secs(
                config
                    .acquire_timeout_secs
                    .unwrap_or(DEFAULT_ACQUIRE_TIMEOUT_SECS),
            ))
            .connect(&config.url)
            .await
            .context("failed to create database connection pool")?;

        Ok(Self::new(Arc::new(pool)))
    }

    /// 初始化数据库表
    pub async fn init_schema(&self) -> Result<()> {
        // sqlx 不支持在一个 prepared statement 中执行多个命令，需要分开执行
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS stores (
                id TEXT PRIMARY KEY DEFAULT gen_random_uuid()::text,
                tenant_id TEXT NOT NULL,
                name TEXT NOT NULL,
                address TEXT,
                phone TEXT,
                created_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT CURRENT_TIMESTAMP,
                updated_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT CURRENT_TIMESTAMP,
                CHECK (tenant_id <> ''),
                CHECK (updated_at >= created_at)
            )
            "#,
        )
        .execute(&*self.pool)
        .await
        .context("failed to create stores table")?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_stores_tenant_created ON stores(tenant_id, created_at DESC)",
        )
        .execute(&*self.pool)
        .await
        .context("failed to create index idx_stores_tenant_created")?;

        info!("stores schema ready");
        Ok(())
    }
}

#[async_trait]
impl StoreRepository for PostgresStoreRepository {
    async fn create(&self, draft: &StoreDraft) -> RepositoryResult<Store> {
        if draft.tenant_id.trim().is_empty() {
            return Err(RepositoryError::MissingTenant);
        }

        let row = sqlx::query_as::<_, StoreRow>(
            r#"
            INSERT INTO stores (tenant_id, name, address, phone, created_at, updated_at)
            VALUES ($1, $2, $3, $4, NOW(), NOW())
            RETURNING id, tenant_id, name,
                      COALESCE(address, '') AS address, COALESCE(phone, '') AS phone,
                      created_at, updated_at
            "#,
        )
        .bind(&draft.tenant_id)
        .bind(&draft.name)
        .bind(&draft.address)
        .bind(&draft.phone)
        .fetch_one(&*self.pool)
        .await
        .context("Failed to create store")?;

        Ok(row.into())
    }

    async fn get(&self, id: &str) -> RepositoryResult<Option<Store>> {
        let row = sqlx::query_as::<_, StoreRow>(
            r#"
            SELECT id, tenant_id, name,
                   COALESCE(address, '') AS address, COALESCE(phone, '') AS phone,
                   created_at, updated_at
            FROM stores
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&*self.pool)
        .await
        .context("Failed to get store")?;

        Ok(row.map(Store::from))
    }

    async fn list(
        &self,
        tenant_id: &str,
        pagination: Pagination,
    ) -> RepositoryResult<(Vec<Store>, u64)> {
        let total = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM stores WHERE tenant_id = $1")
            .bind(tenant_id)
            .fetch_one(&*self.pool)
            .await
            .context("Failed to count stores")?;

        if total <= 0 {
            return Ok((Vec::new(), 0));
        }

        let limit = i64::try_from(pagination.limit()).unwrap_or(i64::MAX);
        let offset = i64::try_from(pagination.offset()).unwrap_or(i64::MAX);

        let rows = sqlx::query_as::<_, StoreRow>(
            r#"
            SELECT id, tenant_id, name,
                   COALESCE(address, '') AS address, COALESCE(phone, '') AS phone,
                   created_at, updated_at
            FROM stores
            WHERE tenant_id = $1
            ORDER BY created_at DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(tenant_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&*self.pool)
        .await
        .context("Failed to list stores")?;

        Ok((rows.into_iter().map(Store::from).collect(), total as u64))
    }

    async fn update(&self, store: &Store) -> RepositoryResult<Store> {
        let row = sqlx::query_as::<_, StoreRow>(
            r#"
            UPDATE stores
            SET name = $1,
                address = $2,
                phone = $3,
                updated_at = GREATEST(NOW(), updated_at + INTERVAL '1 microsecond')
            WHERE id = $4
            RETURNING id, tenant_id, name,
                      COALESCE(address, '') AS address, COALESCE(phone, '') AS phone,
                      created_at, updated_at
            "#,
        )
        .bind(&store.name)
        .bind(&store.address)
        .bind(&store.phone)
        .bind(&store.id)
        .fetch_optional(&*self.pool)
        .await
        .context("Failed to update store")?;

        row.map(Store::from).ok_or(RepositoryError::NoRows)
    }

    async fn delete(&self, id: &str) -> RepositoryResult<()> {
        sqlx::query("DELETE FROM stores WHERE id = $1")
            .bind(id)
            .execute(&*self.pool)
            .await
            .context("Failed to delete store")?;

        Ok(())
    }
}
