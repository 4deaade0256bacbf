use salvo::async_trait;
use std::sync::Arc;

use crate::error::AppResult;
use divelog_core::error::CoreError;
use divelog_service::services::DiveServices;

pub struct DiveServicesHandler {
    pub services: Arc<DiveServices>,
}

#[async_trait]
impl salvo::Handler for DiveServicesHandler {
    #[tracing::instrument(skip(self, _req, depot, _res, _ctrl))]
    async fn handle(
        &self,
        _req: &mut salvo::Request,
        depot: &mut salvo::Depot,
        _res: &mut salvo::Response,
        _ctrl: &mut salvo::FlowCtrl,
    ) {
        depot.inject(self.services.clone());
    }
}

/// ## Summary
/// Retrieves the dive services from the depot.
///
/// ## Errors
/// Returns an error if the services are not found in the depot.
pub fn get_services_from_depot(depot: &salvo::Depot) -> AppResult<Arc<DiveServices>> {
    depot
        .obtain::<Arc<DiveServices>>()
        .cloned()
        .map_err(|_err| CoreError::InvariantViolation("Dive services not found in depot").into())
}
