//! 请求上下文
//!
//! 每个入站调用由拦截器派生一个独立的 `Context`，携带认证后的租户身份和请求ID，
//! 并以参数形式显式传递到领域层的每一次调用中。上下文不可变，只能派生子上下文。

use crate::error::StoreError;

/// 租户上下文
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct TenantContext {
    pub tenant_id: String,
}

impl TenantContext {
    pub fn new(tenant_id: impl Into<String>) -> Self {
        Self {
            tenant_id: tenant_id.into(),
        }
    }
}

impl From<&str> for TenantContext {
    fn from(tenant_id: &str) -> Self {
        Self::new(tenant_id)
    }
}

impl From<String> for TenantContext {
    fn from(tenant_id: String) -> Self {
        Self::new(tenant_id)
    }
}

/// 单次调用的上下文
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Context {
    request_id: String,
    tenant: Option<TenantContext>,
}

impl Context {
    /// 没有任何身份信息的根上下文
    pub fn root() -> Self {
        Self::default()
    }

    /// 派生携带租户的子上下文，父上下文保持不变
    pub fn with_tenant(&self, tenant: TenantContext) -> Self {
        Self {
            request_id: self.request_id.clone(),
            tenant: Some(tenant),
        }
    }

    pub fn with_tenant_id(&self, tenant_id: impl Into<String>) -> Self {
        self.with_tenant(TenantContext::new(tenant_id))
    }

    pub fn with_request_id(&self, request_id: impl Into<String>) -> Self {
        Self {
            request_id: request_id.into(),
            tenant: self.tenant.clone(),
        }
    }

    pub fn tenant(&self) -> Option<&TenantContext> {
        self.tenant.as_ref()
    }

    /// 空字符串视为不存在
    pub fn tenant_id(&self) -> Option<&str> {
        self.tenant
            .as_ref()
            .map(|tenant| tenant.tenant_id.as_str())
            .filter(|id| !id.is_empty())
    }

    pub fn request_id(&self) -> &str {
        &self.request_id
    }

    /// 获取租户ID，缺失时返回 Unauthenticated
    pub fn require_tenant_id(&self) -> Result<&str, StoreError> {
        self.tenant_id()
            .ok_or_else(|| StoreError::Unauthenticated("tenant id not found in context".into()))
    }
}
