use super::AppContext;
use crate::errors::RegistryResult;
use crate::services::diagram::{build_diagram, DataflowDiagram};
use crate::services::query::SystemQuery;
use crate::services::statistics::SystemStatistics;
use crate::services::SpreadsheetExport;

impl AppContext {
    // ----- Read models -----------------------------------------------------
    pub async fn statistics(&self) -> RegistryResult<SystemStatistics> {
        let systems = self.system_service.load_all().await?;
        Ok(SystemStatistics::from_systems(&systems))
    }

    pub async fn dataflow_diagram(&self) -> RegistryResult<DataflowDiagram> {
        let systems = self.system_service.load_all().await?;
        let flows = self.dataflow_service.load_all().await?;
        build_diagram(&systems, &flows)
    }

    /// Spreadsheet of every system matching the list filters; paging
    /// parameters are ignored.
    pub async fn export_systems(&self, query: &SystemQuery) -> RegistryResult<SpreadsheetExport> {
        let filter = query.to_filter()?;
        self.export_service.export_systems(&filter).await
    }
}
