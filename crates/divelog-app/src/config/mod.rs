use std::sync::Arc;

pub use divelog_core::config::*;
use divelog_core::error::CoreError;
use salvo::async_trait;

use crate::error::{AppError, AppResult};

/// Shares one loaded `Settings` with every request through the depot.
pub struct ConfigHandler {
    settings: Arc<Settings>,
}

impl ConfigHandler {
    #[must_use]
    pub fn new(settings: Settings) -> Self {
        Self {
            settings: Arc::new(settings),
        }
    }
}

#[async_trait]
impl salvo::Handler for ConfigHandler {
    #[tracing::instrument(skip_all)]
    async fn handle(
        &self,
        _req: &mut salvo::Request,
        depot: &mut salvo::Depot,
        _res: &mut salvo::Response,
        _ctrl: &mut salvo::FlowCtrl,
    ) {
        depot.inject(Arc::clone(&self.settings));
    }
}

/// ## Summary
/// Retrieves the application configuration from the depot.
///
/// ## Errors
/// Returns an error if the configuration is not found in the depot.
pub fn get_config_from_depot(depot: &salvo::Depot) -> AppResult<Arc<Settings>> {
    depot.obtain::<Arc<Settings>>().cloned().map_err(|_err| {
        AppError::CoreError(CoreError::InvariantViolation(
            "Configuration not found in depot",
        ))
    })
}

/// ## Summary
/// Largest request body accepted by the upload endpoints.
///
/// ## Errors
/// Returns an error if the configuration is not found in the depot.
pub fn upload_limit_from_depot(depot: &salvo::Depot) -> AppResult<usize> {
    Ok(get_config_from_depot(depot)?.server.max_upload_bytes)
}
