use chrono::{DateTime, Utc};

pub const DEFAULT_PAGE_SIZE: u32 = 10;

/// 门店实体
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Store {
    pub id: String,
    pub tenant_id: String,
    pub name: String,
    pub address: String,
    pub phone: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Store {
    /// 覆盖可变字段，id / tenant_id / 时间戳保持不变
    pub fn apply(&mut self, attributes: StoreAttributes) {
        self.name = attributes.name;
        self.address = attributes.address;
        self.phone = attributes.phone;
    }
}

/// 客户端可写的字段
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StoreAttributes {
    pub name: String,
    pub address: String,
    pub phone: String,
}

/// 待插入的门店，id 和时间戳由持久化层分配
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreDraft {
    pub tenant_id: String,
    pub name: String,
    pub address: String,
    pub phone: String,
}

impl StoreDraft {
    pub fn new(tenant_id: impl Into<String>, attributes: StoreAttributes) -> Self {
        Self {
            tenant_id: tenant_id.into(),
            name: attributes.name,
            address: attributes.address,
            phone: attributes.phone,
        }
    }
}

/// 分页参数（已规范化，page 从 1 开始）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub page: u32,
    pub page_size: u32,
}

impl Pagination {
    /// page < 1 取 1，page_size < 1 取默认值 10
    pub fn normalize(page: i32, page_size: i32) -> Self {
        let page = u32::try_from(page).ok().filter(|p| *p >= 1).unwrap_or(1);
        let page_size = u32::try_from(page_size)
            .ok()
            .filter(|s| *s >= 1)
            .unwrap_or(DEFAULT_PAGE_SIZE);
        Self { page, page_size }
    }

    pub fn offset(&self) -> u64 {
        u64::from(self.page - 1) * u64::from(self.page_size)
    }

    pub fn limit(&self) -> u64 {
        u64::from(self.page_size)
    }
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            page: 1,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

/// 列表查询结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorePage {
    pub stores: Vec<Store>,
    pub total: u64,
    pub pagination: Pagination,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_applies_defaults() {
        assert_eq!(Pagination::normalize(0, 0), Pagination::default());
        assert_eq!(Pagination::normalize(-3, -1), Pagination::default());
        assert_eq!(
            Pagination::normalize(3, 25),
            Pagination {
                page: 3,
                page_size: 25
            }
        );
    }

    #[test]
    fn offset_is_zero_based() {
        assert_eq!(Pagination::normalize(1, 10).offset(), 0);
        assert_eq!(Pagination::normalize(3, 20).offset(), 40);
        assert_eq!(Pagination::normalize(i32::MAX, i32::MAX).limit(), i32::MAX as u64);
    }

    #[test]
    fn apply_only_touches_mutable_fields() {
        let now = Utc::now();
        let mut store = Store {
            id: "s-1".into(),
            tenant_id: "T1".into(),
            name: "Old".into(),
            address: "".into(),
            phone: "".into(),
            created_at: now,
            updated_at: now,
        };

        store.apply(StoreAttributes {
            name: "New".into(),
            address: "2 Side St".into(),
            phone: "555-0101".into(),
        });

        assert_eq!(store.id, "s-1");
        assert_eq!(store.tenant_id, "T1");
        assert_eq!(store.name, "New");
        assert_eq!(store.address, "2 Side St");
        assert_eq!(store.created_at, now);
    }
}
