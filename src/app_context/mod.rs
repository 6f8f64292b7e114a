use std::sync::Arc;

use sea_orm::DatabaseConnection;

use crate::config::RegistryConfig;
use crate::services::query::QueryLimits;
use crate::services::{DataFlowService, ExportService, SystemService};

mod dataflow_operations;
mod report_operations;
mod system_operations;

/// Shared application context exposing the registry services to the HTTP
/// layer and the command line.
#[derive(Clone)]
pub struct AppContext {
    db: DatabaseConnection,
    system_service: Arc<SystemService>,
    dataflow_service: Arc<DataFlowService>,
    export_service: Arc<ExportService>,
    limits: QueryLimits,
}

impl AppContext {
    pub fn new(db: DatabaseConnection) -> Self {
        Self::from_config(db, &RegistryConfig::default())
    }

    pub fn from_config(db: DatabaseConnection, config: &RegistryConfig) -> Self {
        let system_service = Arc::new(SystemService::new(db.clone()));
        let dataflow_service = Arc::new(DataFlowService::new(db.clone()));
        let export_service = Arc::new(ExportService::new(db.clone(), config.export.max_rows));

        Self {
            db,
            system_service,
            dataflow_service,
            export_service,
            limits: config.query_limits(),
        }
    }

    pub fn db(&self) -> &DatabaseConnection {
        &self.db
    }

    pub fn system_service(&self) -> &Arc<SystemService> {
        &self.system_service
    }

    pub fn dataflow_service(&self) -> &Arc<DataFlowService> {
        &self.dataflow_service
    }

    pub fn export_service(&self) -> &Arc<ExportService> {
        &self.export_service
    }

    pub fn query_limits(&self) -> QueryLimits {
        self.limits
    }
}
