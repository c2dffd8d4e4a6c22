//! 统一错误类型
//!
//! - `RepositoryError`：持久化层错误，不包含任何租户规则
//! - `StoreError`：业务层错误，由领域服务构造，接口层再映射为 gRPC Status

use thiserror::Error;

/// 机器可读的错误分类
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Unauthenticated,
    NotFound,
    PermissionDenied,
    Persistence,
    Internal,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Unauthenticated => "unauthenticated",
            ErrorKind::NotFound => "not_found",
            ErrorKind::PermissionDenied => "permission_denied",
            ErrorKind::Persistence => "persistence",
            ErrorKind::Internal => "internal",
        }
    }
}

/// 仓储错误
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// 写入时未设置租户ID
    #[error("tenant id must not be empty")]
    MissingTenant,

    /// 按主键更新时没有匹配行
    #[error("no rows matched")]
    NoRows,

    /// 连接或约束等底层错误
    #[error("storage backend error: {0:#}")]
    Backend(#[from] anyhow::Error),
}

pub type RepositoryResult<T> = std::result::Result<T, RepositoryError>;

/// 门店服务错误
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("unauthenticated: {0}")]
    Unauthenticated(String),

    #[error("store not found: {0}")]
    NotFound(String),

    #[error("store {0} does not belong to tenant")]
    PermissionDenied(String),

    #[error("persistence error: {0}")]
    Persistence(#[from] RepositoryError),

    #[error("internal error: {0}")]
    Internal(String),
}

impl StoreError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            StoreError::Unauthenticated(_) => ErrorKind::Unauthenticated,
            StoreError::NotFound(_) => ErrorKind::NotFound,
            StoreError::PermissionDenied(_) => ErrorKind::PermissionDenied,
            StoreError::Persistence(_) => ErrorKind::Persistence,
            StoreError::Internal(_) => ErrorKind::Internal,
        }
    }
}

pub type Result<T> = std::result::Result<T, StoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repository_errors_classify_as_persistence() {
        let err: StoreError = RepositoryError::Backend(anyhow::anyhow!("connection refused")).into();
        assert_eq!(err.kind(), ErrorKind::Persistence);
        assert!(err.to_string().contains("connection refused"));
    }

    #[test]
    fn kinds_have_stable_names() {
        assert_eq!(ErrorKind::PermissionDenied.as_str(), "permission_denied");
        assert_eq!(
            StoreError::NotFound("s-1".into()).kind().as_str(),
            "not_found"
        );
    }
}
