use crate::domain::model::StoreAttributes;

/// 创建门店命令
///
/// 只包含客户端可写的字段，租户ID由上下文决定
#[derive(Debug, Clone)]
pub struct CreateStoreCommand {
    pub name: String,
    pub address: String,
    pub phone: String,
}

impl CreateStoreCommand {
    pub fn attributes(self) -> StoreAttributes {
        StoreAttributes {
            name: self.name,
            address: self.address,
            phone: self.phone,
        }
    }
}

/// 更新门店命令（全量替换可变字段）
#[derive(Debug, Clone)]
pub struct UpdateStoreCommand {
    pub store_id: String,
    pub name: String,
    pub address: String,
    pub phone: String,
}

impl UpdateStoreCommand {
    pub fn into_parts(self) -> (String, StoreAttributes) {
        (
            self.store_id,
            StoreAttributes {
                name: self.name,
                address: self.address,
                phone: self.phone,
            },
        )
    }
}

/// 删除门店命令
#[derive(Debug, Clone)]
pub struct DeleteStoreCommand {
    pub store_id: String,
}
