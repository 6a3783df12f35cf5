//! JSON REST handlers for subscribers.

use std::str::FromStr;

use axum::Json;
use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use serde::Deserialize;

use accessline_app::ports::{
    AccessDeviceProbe, EventPublisher, ServiceInstanceLinkRepository, ServiceInstanceRepository,
    ServiceRepository, SubscriberRepository,
};
use accessline_domain::id::{InstanceId, ServiceId};
use accessline_domain::subscriber::{Subscriber, SubscriberStatus};

use super::caller;
use crate::error::ApiError;
use crate::state::AppState;

/// Request body for creating a subscriber.
///
/// Missing tags are allocated by the server.
#[derive(Deserialize)]
pub struct CreateSubscriberRequest {
    pub name: String,
    pub onu_device: String,
    pub owner: String,
    pub c_tag: Option<u16>,
    pub s_tag: Option<u16>,
    pub mac_address: Option<String>,
    pub service_specific_id: Option<String>,
    pub status: Option<SubscriberStatus>,
}

/// Request body for updating a subscriber. Absent fields are left unchanged.
#[derive(Deserialize)]
pub struct UpdateSubscriberRequest {
    pub name: Option<String>,
    pub onu_device: Option<String>,
    pub c_tag: Option<u16>,
    pub s_tag: Option<u16>,
    pub mac_address: Option<String>,
    pub service_specific_id: Option<String>,
    pub status: Option<SubscriberStatus>,
}

impl UpdateSubscriberRequest {
    fn apply(self, subscriber: &mut Subscriber) {
        if let Some(name) = self.name {
            subscriber.name = name;
        }
        if let Some(onu_device) = self.onu_device {
            subscriber.onu_device = onu_device;
        }
        if self.c_tag.is_some() {
            subscriber.c_tag = self.c_tag;
        }
        if self.s_tag.is_some() {
            subscriber.s_tag = self.s_tag;
        }
        if self.mac_address.is_some() {
            subscriber.mac_address = self.mac_address;
        }
        if self.service_specific_id.is_some() {
            subscriber.service_specific_id = self.service_specific_id;
        }
        if let Some(status) = self.status {
            subscriber.status = status;
        }
    }
}

/// Possible responses from the list endpoint.
pub enum ListResponse {
    Ok(Json<Vec<Subscriber>>),
}

impl IntoResponse for ListResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Ok(json) => json.into_response(),
        }
    }
}

/// Possible responses from the get and update endpoints.
pub enum GetResponse {
    Ok(Json<Subscriber>),
}

impl IntoResponse for GetResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Ok(json) => json.into_response(),
        }
    }
}

/// Possible responses from the create endpoint.
pub enum CreateResponse {
    Created(Json<Subscriber>),
}

impl IntoResponse for CreateResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Created(json) => (StatusCode::CREATED, json).into_response(),
        }
    }
}

/// Possible responses from the delete endpoint.
pub enum DeleteResponse {
    NoContent,
}

impl IntoResponse for DeleteResponse {
    fn into_response(self) -> Response {
        match self {
            Self::NoContent => StatusCode::NO_CONTENT.into_response(),
        }
    }
}

fn parse_id(id: &str) -> Result<InstanceId, ApiError> {
    InstanceId::from_str(id).map_err(|_| ApiError::invalid_id(id))
}

/// `GET /api/subscribers`
pub async fn list<SR, SVR, LR, IR, AP, EP>(
    State(state): State<AppState<SR, SVR, LR, IR, AP, EP>>,
) -> Result<ListResponse, ApiError>
where
    SR: SubscriberRepository + Send + Sync + 'static,
    SVR: ServiceRepository + Send + Sync + 'static,
    LR: ServiceInstanceLinkRepository + Send + Sync + 'static,
    IR: ServiceInstanceRepository + Send + Sync + 'static,
    AP: AccessDeviceProbe + Send + Sync + 'static,
    EP: EventPublisher + Send + Sync + 'static,
{
    let subscribers = state.subscriber_service.list_subscribers().await?;
    Ok(ListResponse::Ok(Json(subscribers)))
}

/// `GET /api/subscribers/{id}`
pub async fn get<SR, SVR, LR, IR, AP, EP>(
    State(state): State<AppState<SR, SVR, LR, IR, AP, EP>>,
    Path(id): Path<String>,
) -> Result<GetResponse, ApiError>
where
    SR: SubscriberRepository + Send + Sync + 'static,
    SVR: ServiceRepository + Send + Sync + 'static,
    LR: ServiceInstanceLinkRepository + Send + Sync + 'static,
    IR: ServiceInstanceRepository + Send + Sync + 'static,
    AP: AccessDeviceProbe + Send + Sync + 'static,
    EP: EventPublisher + Send + Sync + 'static,
{
    let subscriber = state.subscriber_service.get_subscriber(parse_id(&id)?).await?;
    Ok(GetResponse::Ok(Json(subscriber)))
}

/// `POST /api/subscribers`
pub async fn create<SR, SVR, LR, IR, AP, EP>(
    State(state): State<AppState<SR, SVR, LR, IR, AP, EP>>,
    headers: HeaderMap,
    Json(req): Json<CreateSubscriberRequest>,
) -> Result<CreateResponse, ApiError>
where
    SR: SubscriberRepository + Send + Sync + 'static,
    SVR: ServiceRepository + Send + Sync + 'static,
    LR: ServiceInstanceLinkRepository + Send + Sync + 'static,
    IR: ServiceInstanceRepository + Send + Sync + 'static,
    AP: AccessDeviceProbe + Send + Sync + 'static,
    EP: EventPublisher + Send + Sync + 'static,
{
    let owner = ServiceId::from_str(&req.owner).map_err(|_| ApiError::invalid_id(&req.owner))?;

    let mut builder = Subscriber::builder()
        .name(req.name)
        .onu_device(req.onu_device)
        .owner(owner);
    if let Some(c_tag) = req.c_tag {
        builder = builder.c_tag(c_tag);
    }
    if let Some(s_tag) = req.s_tag {
        builder = builder.s_tag(s_tag);
    }
    if let Some(mac_address) = req.mac_address {
        builder = builder.mac_address(mac_address);
    }
    if let Some(value) = req.service_specific_id {
        builder = builder.service_specific_id(value);
    }
    if let Some(status) = req.status {
        builder = builder.status(status);
    }
    if let Some(caller) = caller(&headers) {
        builder = builder.caller(caller);
    }

    let subscriber = builder.build()?;
    let created = state.subscriber_service.create_subscriber(subscriber).await?;
    Ok(CreateResponse::Created(Json(created)))
}

/// `PUT /api/subscribers/{id}`
pub async fn update<SR, SVR, LR, IR, AP, EP>(
    State(state): State<AppState<SR, SVR, LR, IR, AP, EP>>,
    Path(id): Path<String>,
    headers: HeaderMap,
    Json(req): Json<UpdateSubscriberRequest>,
) -> Result<GetResponse, ApiError>
where
    SR: SubscriberRepository + Send + Sync + 'static,
    SVR: ServiceRepository + Send + Sync + 'static,
    LR: ServiceInstanceLinkRepository + Send + Sync + 'static,
    IR: ServiceInstanceRepository + Send + Sync + 'static,
    AP: AccessDeviceProbe + Send + Sync + 'static,
    EP: EventPublisher + Send + Sync + 'static,
{
    let mut subscriber = state.subscriber_service.get_subscriber(parse_id(&id)?).await?;
    req.apply(&mut subscriber);
    subscriber.caller = caller(&headers);

    let updated = state.subscriber_service.update_subscriber(subscriber).await?;
    Ok(GetResponse::Ok(Json(updated)))
}

/// `DELETE /api/subscribers/{id}`
pub async fn delete<SR, SVR, LR, IR, AP, EP>(
    State(state): State<AppState<SR, SVR, LR, IR, AP, EP>>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Result<DeleteResponse, ApiError>
where
    SR: SubscriberRepository + Send + Sync + 'static,
    SVR: ServiceRepository + Send + Sync + 'static,
    LR: ServiceInstanceLinkRepository + Send + Sync + 'static,
    IR: ServiceInstanceRepository + Send + Sync + 'static,
    AP: AccessDeviceProbe + Send + Sync + 'static,
    EP: EventPublisher + Send + Sync + 'static,
{
    state
        .subscriber_service
        .delete_subscriber(parse_id(&id)?, caller(&headers))
        .await?;
    Ok(DeleteResponse::NoContent)
}
