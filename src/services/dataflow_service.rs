use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, DatabaseConnection, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, Select, TransactionTrait,
};
use tracing::{info, warn};
use uuid::Uuid;

use super::{store_error, write_error};
use super::validation::{validate_dataflow, DataFlowDraft, DataFlowInput};
use crate::database::entities::{dataflows, systems};
use crate::errors::{FieldErrors, RegistryError, RegistryResult};
use crate::model::DataFlow;

fn ordered(select: Select<dataflows::Entity>) -> Select<dataflows::Entity> {
    select
        .order_by_asc(dataflows::Column::CreatedAt)
        .order_by_asc(dataflows::Column::Id)
}

fn decode_all(models: Vec<dataflows::Model>) -> RegistryResult<Vec<DataFlow>> {
    let mut flows = models
        .into_iter()
        .map(|model| DataFlow::try_from(model).map_err(store_error("decode dataflow")))
        .collect::<RegistryResult<Vec<_>>>()?;
    flows.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
    Ok(flows)
}

async fn system_exists<C: ConnectionTrait>(conn: &C, id: Uuid) -> RegistryResult<bool> {
    let count = systems::Entity::find()
        .filter(systems::Column::Id.eq(id))
        .count(conn)
        .await
        .map_err(store_error("check system exists"))?;
    Ok(count > 0)
}

/// Both endpoints must be stored systems.
async fn check_endpoints<C: ConnectionTrait>(conn: &C, draft: &DataFlowDraft) -> RegistryResult<()> {
    let mut fields = FieldErrors::new();
    for (field, id) in [
        ("source_system_id", draft.source_system_id),
        ("target_system_id", draft.target_system_id),
    ] {
        if !system_exists(conn, id).await? {
            fields.insert(field, format!("System '{}' does not exist", id));
        }
    }

    if fields.is_empty() {
        Ok(())
    } else {
        warn!("Rejected dataflow: {}", fields);
        Err(RegistryError::integrity_fields(
            "Data flow references unknown systems",
            fields,
        ))
    }
}

#[derive(Clone)]
pub struct DataFlowService {
    db: DatabaseConnection,
}

impl DataFlowService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn load_all(&self) -> RegistryResult<Vec<DataFlow>> {
        let models = ordered(dataflows::Entity::find())
            .all(&self.db)
            .await
            .map_err(store_error("list dataflows"))?;
        decode_all(models)
    }

    /// Flows where `system_id` is the source or the target.
    pub async fn flows_touching(&self, system_id: Uuid) -> RegistryResult<Vec<DataFlow>> {
        let models = ordered(dataflows::Entity::find())
            .filter(
                Condition::any()
                    .add(dataflows::Column::SourceSystemId.eq(system_id))
                    .add(dataflows::Column::TargetSystemId.eq(system_id)),
            )
            .all(&self.db)
            .await
            .map_err(store_error("list system dataflows"))?;
        decode_all(models)
    }

    /// All flows, or only those touching `system_id` when it is given.
    pub async fn list(&self, system_id: Option<Uuid>) -> RegistryResult<Vec<DataFlow>> {
        match system_id {
            Some(id) => {
                if !system_exists(&self.db, id).await? {
                    return Err(RegistryError::not_found("System", id));
                }
                self.flows_touching(id).await
            }
            None => self.load_all().await,
        }
    }

    pub async fn get(&self, id: Uuid) -> RegistryResult<DataFlow> {
        let model = dataflows::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(store_error("load dataflow"))?
            .ok_or_else(|| RegistryError::not_found("DataFlow", id))?;
        DataFlow::try_from(model).map_err(store_error("decode dataflow"))
    }

    pub async fn create(&self, input: &DataFlowInput) -> RegistryResult<DataFlow> {
        let draft = validate_dataflow(input).map_err(|err| {
            warn!("Rejected dataflow: {}", err);
            err
        })?;

        let txn = self.db.begin().await.map_err(store_error("begin transaction"))?;
        check_endpoints(&txn, &draft).await?;

        let now = Utc::now();
        let flow = draft.into_dataflow(Uuid::new_v4(), now, now);
        dataflows::ActiveModel::from(&flow)
            .insert(&txn)
            .await
            .map_err(store_error("create dataflow"))?;
        txn.commit().await.map_err(store_error("commit dataflow"))?;

        info!(
            "Created dataflow {} ({} -> {})",
            flow.id, flow.source_system_id, flow.target_system_id
        );
        Ok(flow)
    }

    pub async fn update(&self, id: Uuid, input: &DataFlowInput) -> RegistryResult<DataFlow> {
        let draft = validate_dataflow(input).map_err(|err| {
            warn!("Rejected dataflow: {}", err);
            err
        })?;

        let txn = self.db.begin().await.map_err(store_error("begin transaction"))?;
        let existing = dataflows::Entity::find_by_id(id)
            .one(&txn)
            .await
            .map_err(store_error("load dataflow"))?
            .ok_or_else(|| RegistryError::not_found("DataFlow", id))?;
        check_endpoints(&txn, &draft).await?;

        let flow = draft.into_dataflow(id, existing.created_at, Utc::now());
        dataflows::ActiveModel::from(&flow)
            .update(&txn)
            .await
            .map_err(write_error("update dataflow", "DataFlow", id))?;
        txn.commit().await.map_err(store_error("commit dataflow"))?;

        info!("Updated dataflow {}", flow.id);
        Ok(flow)
    }

    pub async fn delete(&self, id: Uuid) -> RegistryResult<()> {
        let result = dataflows::Entity::delete_by_id(id)
            .exec(&self.db)
            .await
            .map_err(store_error("delete dataflow"))?;
        if result.rows_affected == 0 {
            return Err(RegistryError::not_found("DataFlow", id));
        }

        info!("Deleted dataflow {}", id);
        Ok(())
    }
}
