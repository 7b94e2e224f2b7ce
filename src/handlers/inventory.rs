//! gRPC facade for the inventory service.
//!
//! Decodes requests, calls [`InventoryService`] and encodes responses. All
//! error-to-status mapping for the API surface happens here.

use tonic::{Request, Response, Status};
use tracing::{error, info};

use crate::auth::Principal;
use crate::model::Resource;
use crate::proto::inventory_service_server::InventoryService as InventoryServiceTrait;
use crate::proto::{
    CheckAvailabilityRequest, CheckAvailabilityResponse, CreateResourceRequest,
    CreateResourceResponse, DeleteResourceRequest, DeleteResourceResponse, GetResourceRequest,
    GetResourceResponse, ListResourcesRequest, ListResourcesResponse,
    Resource as ProtoResource, UpdateResourceStatusRequest, UpdateResourceStatusResponse,
};
use crate::services::{InventoryError, InventoryService};

const INTERNAL_MESSAGE: &str = "internal server error";

impl From<InventoryError> for Status {
    fn from(err: InventoryError) -> Self {
        match err {
            InventoryError::Validation(_)
            | InventoryError::InvalidStatus(_)
            | InventoryError::InvalidIdentifier(_) => Status::invalid_argument(err.to_string()),
            InventoryError::NotFound(_) => Status::not_found(err.to_string()),
            InventoryError::Internal(source) => {
                error!(error = %source, "Request failed with internal error");
                Status::internal(INTERNAL_MESSAGE)
            }
        }
    }
}

impl From<Resource> for ProtoResource {
    fn from(resource: Resource) -> Self {
        Self {
            resource_id: resource.id.to_string(),
            name: resource.name,
            r#type: resource.resource_type,
            status: resource.status.to_string(),
            description: resource.description.unwrap_or_default(),
            created_at: Some(to_timestamp(resource.created_at)),
            updated_at: Some(to_timestamp(resource.updated_at)),
        }
    }
}

fn to_timestamp(at: chrono::DateTime<chrono::Utc>) -> prost_types::Timestamp {
    prost_types::Timestamp {
        seconds: at.timestamp(),
        nanos: at.timestamp_subsec_nanos() as i32,
    }
}

/// Caller id for logs; `anonymous` on public methods.
fn caller<T>(request: &Request<T>) -> String {
    request
        .extensions()
        .get::<Principal>()
        .map(|p| p.user_id.clone())
        .unwrap_or_else(|| "anonymous".to_string())
}

/// gRPC inventory service.
pub struct InventoryGrpcService {
    service: InventoryService,
}

impl InventoryGrpcService {
    pub fn new(service: InventoryService) -> Self {
        Self { service }
    }
}

#[tonic::async_trait]
impl InventoryServiceTrait for InventoryGrpcService {
    async fn create_resource(
        &self,
        request: Request<CreateResourceRequest>,
    ) -> Result<Response<CreateResourceResponse>, Status> {
        let user_id = caller(&request);
        let req = request.into_inner();
        info!(user_id = %user_id, name = %req.name, "CreateResource");

        let resource = self
            .service
            .create_resource(&req.name, &req.r#type, &req.description)
            .await?;

        Ok(Response::new(CreateResourceResponse {
            resource: Some(resource.into()),
        }))
    }

    async fn list_resources(
        &self,
        _request: Request<ListResourcesRequest>,
    ) -> Result<Response<ListResourcesResponse>, Status> {
        let resources = self.service.list_resources().await?;

        Ok(Response::new(ListResourcesResponse {
            resources: resources.into_iter().map(ProtoResource::from).collect(),
        }))
    }

    async fn get_resource(
        &self,
        request: Request<GetResourceRequest>,
    ) -> Result<Response<GetResourceResponse>, Status> {
        let req = request.into_inner();
        let resource = self.service.get_resource(&req.resource_id).await?;

        Ok(Response::new(GetResourceResponse {
            resource: Some(resource.into()),
        }))
    }

    async fn check_availability(
        &self,
        request: Request<CheckAvailabilityRequest>,
    ) -> Result<Response<CheckAvailabilityResponse>, Status> {
        let req = request.into_inner();
        let is_available = self.service.check_availability(&req.resource_id).await?;

        Ok(Response::new(CheckAvailabilityResponse { is_available }))
    }

    async fn update_resource_status(
        &self,
        request: Request<UpdateResourceStatusRequest>,
    ) -> Result<Response<UpdateResourceStatusResponse>, Status> {
        let user_id = caller(&request);
        let req = request.into_inner();
        info!(
            user_id = %user_id,
            resource_id = %req.resource_id,
            new_status = %req.new_status,
            "UpdateResourceStatus"
        );

        let resource = self
            .service
            .update_resource_status(&req.resource_id, &req.new_status)
            .await?;

        Ok(Response::new(UpdateResourceStatusResponse {
            resource_id: resource.id.to_string(),
            status: resource.status.to_string(),
        }))
    }

    async fn delete_resource(
        &self,
        request: Request<DeleteResourceRequest>,
    ) -> Result<Response<DeleteResourceResponse>, Status> {
        let user_id = caller(&request);
        let req = request.into_inner();
        info!(user_id = %user_id, resource_id = %req.resource_id, "DeleteResource");

        let id = self.service.delete_resource(&req.resource_id).await?;

        Ok(Response::new(DeleteResourceResponse {
            resource_id: id.to_string(),
            deleted: true,
        }))
    }
}
