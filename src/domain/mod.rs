//! 领域层：门店模型、仓储接口与租户隔离规则

pub mod model;
pub mod repository;
pub mod service;

pub use model::{Pagination, Store, StoreAttributes, StoreDraft, StorePage};
pub use repository::StoreRepository;
pub use service::StoreDomainService;
