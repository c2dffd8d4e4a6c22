/// 查询单个门店
#[derive(Debug, Clone)]
pub struct GetStoreQuery {
    pub store_id: String,
}

/// 分页列出当前租户的门店（原始值，由领域层规范化）
#[derive(Debug, Clone)]
pub struct ListStoresQuery {
    pub page: i32,
    pub page_size: i32,
}
