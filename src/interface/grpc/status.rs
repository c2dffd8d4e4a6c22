//! 业务错误到 gRPC Status 的映射
//!
//! 持久化错误的细节只写日志，不返回给客户端。

use tonic::Status;

use crate::error::StoreError;

const STORE_NOT_FOUND: &str = "store not found";
const STORE_FORBIDDEN: &str = "store does not belong to tenant";
const STORAGE_FAILURE: &str = "storage operation failed";

/// 将 `StoreError` 转换为 gRPC Status
///
/// `conceal_foreign_stores` 为 true 时，访问其他租户的门店与门店不存在返回同样的结果。
pub fn store_error_to_status(err: &StoreError, conceal_foreign_stores: bool) -> Status {
    match err {
        StoreError::Unauthenticated(message) => Status::unauthenticated(message.clone()),
        StoreError::NotFound(_) => Status::not_found(STORE_NOT_FOUND),
        StoreError::PermissionDenied(_) if conceal_foreign_stores => {
            Status::not_found(STORE_NOT_FOUND)
        }
        StoreError::PermissionDenied(_) => Status::permission_denied(STORE_FORBIDDEN),
        StoreError::Persistence(_) => Status::internal(STORAGE_FAILURE),
        StoreError::Internal(message) => Status::internal(message.clone()),
    }
}
