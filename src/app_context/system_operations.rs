use uuid::Uuid;

use super::AppContext;
use crate::errors::RegistryResult;
use crate::model::InformationSystem;
use crate::services::query::{SystemPage, SystemQuery};
use crate::services::validation::SystemInput;
use crate::services::{SystemDetail, SystemHierarchy};

impl AppContext {
    // ----- System helpers --------------------------------------------------
    pub async fn list_systems(&self, query: &SystemQuery) -> RegistryResult<SystemPage> {
        let (filter, page) = query.to_filter_and_page(&self.limits)?;
        self.system_service.list(&filter, page).await
    }

    pub async fn get_system(&self, id: Uuid) -> RegistryResult<SystemDetail> {
        self.system_service.get_detail(id).await
    }

    pub async fn create_system(&self, input: &SystemInput) -> RegistryResult<InformationSystem> {
        self.system_service.create(input).await
    }

    pub async fn update_system(
        &self,
        id: Uuid,
        input: &SystemInput,
    ) -> RegistryResult<InformationSystem> {
        self.system_service.update(id, input).await
    }

    pub async fn delete_system(&self, id: Uuid) -> RegistryResult<()> {
        self.system_service.delete(id).await
    }

    pub async fn activate_system(&self, id: Uuid) -> RegistryResult<InformationSystem> {
        self.system_service.activate(id).await
    }

    pub async fn deprecate_system(&self, id: Uuid) -> RegistryResult<InformationSystem> {
        self.system_service.deprecate(id).await
    }

    pub async fn system_hierarchy(&self, id: Uuid) -> RegistryResult<SystemHierarchy> {
        self.system_service.hierarchy(id).await
    }
}
