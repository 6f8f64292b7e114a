use uuid::Uuid;

use super::AppContext;
use crate::errors::RegistryResult;
use crate::model::DataFlow;
use crate::services::validation::DataFlowInput;

impl AppContext {
    // ----- Data flow helpers -----------------------------------------------
    pub async fn list_dataflows(&self, system_id: Option<Uuid>) -> RegistryResult<Vec<DataFlow>> {
        self.dataflow_service.list(system_id).await
    }

    pub async fn get_dataflow(&self, id: Uuid) -> RegistryResult<DataFlow> {
        self.dataflow_service.get(id).await
    }

    pub async fn create_dataflow(&self, input: &DataFlowInput) -> RegistryResult<DataFlow> {
        self.dataflow_service.create(input).await
    }

    pub async fn update_dataflow(&self, id: Uuid, input: &DataFlowInput) -> RegistryResult<DataFlow> {
        self.dataflow_service.update(id, input).await
    }

    pub async fn delete_dataflow(&self, id: Uuid) -> RegistryResult<()> {
        self.dataflow_service.delete(id).await
    }
}
