use std::sync::Arc;

use chrono::{DateTime, Utc};
use prost_types::Timestamp;
use tonic::{Request, Response, Status};
use tracing::{Level, debug, error};

use crate::application::commands::{CreateStoreCommand, DeleteStoreCommand, UpdateStoreCommand};
use crate::application::handlers::{StoreCommandHandler, StoreQueryHandler};
use crate::application::queries::{GetStoreQuery, ListStoresQuery};
use crate::context::Context;
use crate::domain::model::Store;
use crate::error::StoreError;
use crate::interface::grpc::status::store_error_to_status;
use crate::interface::interceptor::request_context;
use crate::proto::StoreService;
use crate::proto::store::v1::{
    CreateStoreRequest, CreateStoreResponse, DeleteStoreRequest, DeleteStoreResponse,
    GetStoreRequest, GetStoreResponse, ListStoresRequest, ListStoresResponse,
    Store as ProtoStore, UpdateStoreRequest, UpdateStoreResponse,
};

#[derive(Clone)]
pub struct StoreGrpcHandler {
    command_handler: Arc<StoreCommandHandler>,
    query_handler: Arc<StoreQueryHandler>,
    conceal_foreign_stores: bool,
}

impl StoreGrpcHandler {
    pub fn new(
        command_handler: Arc<StoreCommandHandler>,
        query_handler: Arc<StoreQueryHandler>,
        conceal_foreign_stores: bool,
    ) -> Self {
        Self {
            command_handler,
            query_handler,
            conceal_foreign_stores,
        }
    }

    fn reject(&self, ctx: &Context, operation: &'static str, err: StoreError) -> Status {
        if rejection_level(&err) == Level::ERROR {
            error!(
                request_id = %ctx.request_id(),
                operation,
                error = %err,
                "store operation failed"
            );
        } else {
            debug!(
                request_id = %ctx.request_id(),
                operation,
                kind = err.kind().as_str(),
                error = %err,
                "store request rejected"
            );
        }
        store_error_to_status(&err, self.conceal_foreign_stores)
    }
}

/// 越权访问已在领域层记录，业务拒绝只记 debug，服务端故障记 error
fn rejection_level(err: &StoreError) -> Level {
    match err {
        StoreError::Persistence(_) | StoreError::Internal(_) => Level::ERROR,
        StoreError::Unauthenticated(_) | StoreError::NotFound(_) | StoreError::PermissionDenied(_) => {
            Level::DEBUG
        }
    }
}

#[tonic::async_trait]
impl StoreService for StoreGrpcHandler {
    async fn create_store(
        &self,
        request: Request<CreateStoreRequest>,
    ) -> Result<Response<CreateStoreResponse>, Status> {
        let ctx = request_context(&request);
        let req = request.into_inner();

        let store = self
            .command_handler
            .handle_create_store(
                &ctx,
                CreateStoreCommand {
                    name: req.name,
                    address: req.address,
                    phone: req.phone,
                },
            )
            .await
            .map_err(|err| match err {
                StoreError::Persistence(source) => {
                    error!(request_id = %ctx.request_id(), error = %source, "failed to create store");
                    store_error_to_status(
                        &StoreError::Internal("failed to create store".into()),
                        self.conceal_foreign_stores,
                    )
                }
                other => self.reject(&ctx, "create_store", other),
            })?;

        Ok(Response::new(CreateStoreResponse {
            store: Some(proto_store(store)),
        }))
    }

    async fn get_store(
        &self,
        request: Request<GetStoreRequest>,
    ) -> Result<Response<GetStoreResponse>, Status> {
        let ctx = request_context(&request);
        let req = request.into_inner();

        let store = self
            .query_handler
            .handle_get_store(&ctx, GetStoreQuery { store_id: req.id })
            .await
            .map_err(|err| self.reject(&ctx, "get_store", err))?;

        Ok(Response::new(GetStoreResponse {
            store: Some(proto_store(store)),
        }))
    }

    async fn list_stores(
        &self,
        request: Request<ListStoresRequest>,
    ) -> Result<Response<ListStoresResponse>, Status> {
        let ctx = request_context(&request);
        let req = request.into_inner();

        let page = self
            .query_handler
            .handle_list_stores(
                &ctx,
                ListStoresQuery {
                    page: req.page,
                    page_size: req.page_size,
                },
            )
            .await
            .map_err(|err| self.reject(&ctx, "list_stores", err))?;

        Ok(Response::new(ListStoresResponse {
            stores: page.stores.into_iter().map(proto_store).collect(),
            total: i64::try_from(page.total).unwrap_or(i64::MAX),
            page: i32::try_from(page.pagination.page).unwrap_or(i32::MAX),
            page_size: i32::try_from(page.pagination.page_size).unwrap_or(i32::MAX),
        }))
    }

    async fn update_store(
        &self,
        request: Request<UpdateStoreRequest>,
    ) -> Result<Response<UpdateStoreResponse>, Status> {
        let ctx = request_context(&request);
        let req = request.into_inner();

        let store = self
            .command_handler
            .handle_update_store(
                &ctx,
                UpdateStoreCommand {
                    store_id: req.id,
                    name: req.name,
                    address: req.address,
                    phone: req.phone,
                },
            )
            .await
            .map_err(|err| self.reject(&ctx, "update_store", err))?;

        Ok(Response::new(UpdateStoreResponse {
            store: Some(proto_store(store)),
        }))
    }

    async fn delete_store(
        &self,
        request: Request<DeleteStoreRequest>,
    ) -> Result<Response<DeleteStoreResponse>, Status> {
        let ctx = request_context(&request);
        let req = request.into_inner();

        self.command_handler
            .handle_delete_store(&ctx, DeleteStoreCommand { store_id: req.id })
            .await
            .map_err(|err| self.reject(&ctx, "delete_store", err))?;

        Ok(Response::new(DeleteStoreResponse { success: true }))
    }
}

fn proto_timestamp(value: DateTime<Utc>) -> Timestamp {
    Timestamp {
        seconds: value.timestamp(),
        nanos: value.timestamp_subsec_nanos() as i32,
    }
}

fn proto_store(store: Store) -> ProtoStore {
    ProtoStore {
        id: store.id,
        tenant_id: store.tenant_id,
        name: store.name,
        address: store.address,
        phone: store.phone,
        created_at: Some(proto_timestamp(store.created_at)),
        updated_at: Some(proto_timestamp(store.updated_at)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::service::StoreDomainService;
    use crate::infrastructure::persistence::InMemoryStoreRepository;
    use tonic::Code;

    fn handler(conceal_foreign_stores: bool) -> StoreGrpcHandler {
        let repository = Arc::new(InMemoryStoreRepository::new());
        let domain_service = Arc::new(StoreDomainService::new(repository));
        StoreGrpcHandler::new(
            Arc::new(StoreCommandHandler::new(domain_service.clone())),
            Arc::new(StoreQueryHandler::new(domain_service)),
            conceal_foreign_stores,
        )
    }

    fn tenant_request<T>(tenant_id: &str, message: T) -> Request<T> {
        let mut request = Request::new(message);
        request
            .extensions_mut()
            .insert(Context::root().with_request_id("test").with_tenant_id(tenant_id));
        request
    }

    async fn create(handler: &StoreGrpcHandler, tenant_id: &str, name: &str) -> ProtoStore {
        handler
            .create_store(tenant_request(
                tenant_id,
                CreateStoreRequest {
                    name: name.into(),
                    address: "1 Main St".into(),
                    phone: "555-0100".into(),
                },
            ))
            .await
            .unwrap()
            .into_inner()
            .store
            .unwrap()
    }

    #[test]
    fn only_server_faults_are_logged_as_errors() {
        use crate::error::RepositoryError;

        assert_eq!(rejection_level(&StoreError::PermissionDenied("s-1".into())), Level::DEBUG);
        assert_eq!(rejection_level(&StoreError::NotFound("s-1".into())), Level::DEBUG);
        assert_eq!(
            rejection_level(&StoreError::Unauthenticated("missing tenant".into())),
            Level::DEBUG
        );
        assert_eq!(
            rejection_level(&StoreError::Persistence(RepositoryError::NoRows)),
            Level::ERROR
        );
        assert_eq!(rejection_level(&StoreError::Internal("boom".into())), Level::ERROR);
    }

    #[tokio::test]
    async fn create_fills_server_fields() {
        let handler = handler(false);

        let store = create(&handler, "T1", "Downtown").await;
        assert!(!store.id.is_empty());
        assert_eq!(store.tenant_id, "T1");
        assert_eq!(store.created_at, store.updated_at);
        assert!(store.created_at.is_some());
    }

    #[tokio::test]
    async fn foreign_store_is_denied_or_concealed() {
        for (conceal, code) in [(false, Code::PermissionDenied), (true, Code::NotFound)] {
            let handler = handler(conceal);
            let store = create(&handler, "T1", "Downtown").await;

            let status = handler
                .get_store(tenant_request("T2", GetStoreRequest { id: store.id }))
                .await
                .unwrap_err();
            assert_eq!(status.code(), code);
        }
    }

    #[tokio::test]
    async fn list_echoes_normalized_paging() {
        let handler = handler(false);
        create(&handler, "T1", "Downtown").await;

        let response = handler
            .list_stores(tenant_request(
                "T1",
                ListStoresRequest {
                    page: 0,
                    page_size: -5,
                },
            ))
            .await
            .unwrap()
            .into_inner();

        assert_eq!(response.total, 1);
        assert_eq!(response.page, 1);
        assert_eq!(response.page_size, 10);
        assert_eq!(response.stores.len(), 1);
    }

    #[tokio::test]
    async fn delete_then_get_is_not_found() {
        let handler = handler(false);
        let store = create(&handler, "T1", "Downtown").await;

        let response = handler
            .delete_store(tenant_request("T1", DeleteStoreRequest { id: store.id.clone() }))
            .await
            .unwrap()
            .into_inner();
        assert!(response.success);

        let status = handler
            .get_store(tenant_request("T1", GetStoreRequest { id: store.id }))
            .await
            .unwrap_err();
        assert_eq!(status.code(), Code::NotFound);
    }

    #[tokio::test]
    async fn request_without_context_is_unauthenticated() {
        let handler = handler(false);

        let status = handler
            .list_stores(Request::new(ListStoresRequest::default()))
            .await
            .unwrap_err();
        assert_eq!(status.code(), Code::Unauthenticated);
    }
}
