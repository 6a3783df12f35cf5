//! JSON REST handlers for the service catalog.

use axum::Json;
use axum::extract::State;
use axum::response::{IntoResponse, Response};

use accessline_app::ports::{
    AccessDeviceProbe, EventPublisher, ServiceInstanceLinkRepository, ServiceInstanceRepository,
    ServiceRepository, SubscriberRepository,
};
use accessline_domain::service::Service;

use crate::error::ApiError;
use crate::state::AppState;

/// Possible responses from the list endpoint.
pub enum ListResponse {
    Ok(Json<Vec<Service>>),
}

impl IntoResponse for ListResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Ok(json) => json.into_response(),
        }
    }
}

/// `GET /api/services`
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
    let services = state.catalog_service.list_services().await?;
    Ok(ListResponse::Ok(Json(services)))
}
