//! 由 `proto/store/v1/store.proto` 生成的 gRPC 代码

pub mod store {
    pub mod v1 {
        #![allow(clippy::derive_partial_eq_without_eq)]
        tonic::include_proto!("store.v1");
    }
}

/// 编码后的文件描述符集合，用于 gRPC reflection
pub const FILE_DESCRIPTOR_SET: &[u8] = tonic::include_file_descriptor_set!("store_descriptor");

pub use store::v1::store_service_client::StoreServiceClient;
pub use store::v1::store_service_server::{StoreService, StoreServiceServer};
