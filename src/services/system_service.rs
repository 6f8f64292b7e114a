use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, DatabaseConnection, EntityTrait,
    PaginatorTrait, QueryFilter, QuerySelect, Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use uuid::Uuid;

#[cfg(feature = "server")]
use utoipa::ToSchema;

use super::hierarchy::SystemTree;
use super::query::{paginate, sort_for_listing, PageRequest, SystemFilter, SystemPage};
use super::{store_error, write_error};
use super::validation::{validate_system, SystemDraft, SystemInput};
use crate::database::entities::{dataflows, systems};
use crate::errors::{FieldErrors, RegistryError, RegistryResult};
use crate::model::{DataFlow, InformationSystem, SystemStatus};
use crate::services::DataFlowService;

/// A system together with every flow it sends or receives.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[cfg_attr(feature = "server", derive(ToSchema))]
pub struct SystemDetail {
    #[serde(flatten)]
    pub system: InformationSystem,
    pub dataflows: Vec<DataFlow>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "server", derive(ToSchema))]
pub struct SystemRef {
    pub id: Uuid,
    pub name: String,
    pub code: String,
}

impl From<&InformationSystem> for SystemRef {
    fn from(system: &InformationSystem) -> Self {
        Self {
            id: system.id,
            name: system.name.clone(),
            code: system.code.clone(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "server", derive(ToSchema))]
pub struct SystemHierarchy {
    pub system: SystemRef,
    /// Nearest first
    pub ancestors: Vec<SystemRef>,
    pub children: Vec<SystemRef>,
}

const COUNT_BATCH: u64 = 500;

fn decode(model: systems::Model) -> RegistryResult<InformationSystem> {
    InformationSystem::try_from(model).map_err(store_error("decode system"))
}

async fn find_system<C: ConnectionTrait>(conn: &C, id: Uuid) -> RegistryResult<InformationSystem> {
    let model = systems::Entity::find_by_id(id)
        .one(conn)
        .await
        .map_err(store_error("load system"))?
        .ok_or_else(|| RegistryError::not_found("System", id))?;
    decode(model)
}

/// Checks that need stored data: code uniqueness, reference existence and
/// hierarchy cycles. `own_id` is `None` on create.
async fn check_integrity<C: ConnectionTrait>(
    conn: &C,
    own_id: Option<Uuid>,
    draft: &SystemDraft,
) -> RegistryResult<()> {
    let mut fields = FieldErrors::new();

    let mut duplicate = systems::Entity::find().filter(systems::Column::Code.eq(draft.code.as_str()));
    if let Some(id) = own_id {
        duplicate = duplicate.filter(systems::Column::Id.ne(id));
    }
    let duplicates = duplicate
        .count(conn)
        .await
        .map_err(store_error("check system code"))?;
    if duplicates > 0 {
        fields.insert("code", format!("Code '{}' is already in use", draft.code));
    }

    if draft.parent_system_id.is_some() || !draft.dependent_systems.is_empty() {
        let links: Vec<(Uuid, Option<Uuid>)> = systems::Entity::find()
            .select_only()
            .column(systems::Column::Id)
            .column(systems::Column::ParentSystemId)
            .into_tuple()
            .all(conn)
            .await
            .map_err(store_error("load system hierarchy"))?;
        let tree = SystemTree::build(links);

        if let Some(parent) = draft.parent_system_id {
            if own_id == Some(parent) {
                fields.insert("parent_system_id", "A system cannot be its own parent");
            } else if !tree.contains(parent) {
                fields.insert(
                    "parent_system_id",
                    format!("Parent system '{}' does not exist", parent),
                );
            } else if own_id.is_some_and(|id| tree.would_create_cycle(id, parent)) {
                fields.insert(
                    "parent_system_id",
                    "Parent system is a descendant of this system",
                );
            }
        }

        for (i, dependent) in draft.dependent_systems.iter().enumerate() {
            let field = format!("dependent_systems[{}]", i);
            if own_id == Some(*dependent) {
                fields.insert(field, "A system cannot depend on itself");
            } else if !tree.contains(*dependent) {
                fields.insert(field, format!("System '{}' does not exist", dependent));
            }
        }
    }

    if fields.is_empty() {
        Ok(())
    } else {
        warn!("Rejected system '{}': {}", draft.code, fields);
        Err(RegistryError::integrity_fields(
            "System conflicts with stored data",
            fields,
        ))
    }
}

#[derive(Clone)]
pub struct SystemService {
    db: DatabaseConnection,
}

impl SystemService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Every system in listing order.
    pub async fn load_all(&self) -> RegistryResult<Vec<InformationSystem>> {
        self.load_filtered(&SystemFilter::default()).await
    }

    /// Systems matching `filter`, in listing order.
    pub async fn load_filtered(&self, filter: &SystemFilter) -> RegistryResult<Vec<InformationSystem>> {
        debug!("Loading systems with filter {:?}", filter);
        let models = filter
            .apply_to(systems::Entity::find())
            .all(&self.db)
            .await
            .map_err(store_error("list systems"))?;

        let mut systems = models
            .into_iter()
            .map(decode)
            .collect::<RegistryResult<Vec<_>>>()?;
        systems.retain(|system| filter.matches(system));
        sort_for_listing(&mut systems);
        Ok(systems)
    }

    /// Number of systems matching `filter`, counting no further than
    /// `stop_after`. Rows are decoded a batch at a time when the filter
    /// cannot run entirely in the store.
    pub async fn count_matching(&self, filter: &SystemFilter, stop_after: u64) -> RegistryResult<u64> {
        let select = filter.apply_to(systems::Entity::find());
        if filter.is_store_only() {
            let total = select
                .count(&self.db)
                .await
                .map_err(store_error("count systems"))?;
            return Ok(total.min(stop_after));
        }

        let mut matched = 0;
        let mut pages = select.paginate(&self.db, COUNT_BATCH);
        while let Some(models) = pages
            .fetch_and_next()
            .await
            .map_err(store_error("count systems"))?
        {
            for model in models {
                if filter.matches(&decode(model)?) {
                    matched += 1;
                    if matched >= stop_after {
                        return Ok(matched);
                    }
                }
            }
        }
        Ok(matched)
    }

    pub async fn list(&self, filter: &SystemFilter, page: PageRequest) -> RegistryResult<SystemPage> {
        let systems = self.load_filtered(filter).await?;
        Ok(paginate(systems, filter, page))
    }

    pub async fn get(&self, id: Uuid) -> RegistryResult<InformationSystem> {
        find_system(&self.db, id).await
    }

    pub async fn get_detail(&self, id: Uuid) -> RegistryResult<SystemDetail> {
        let system = self.get(id).await?;
        let dataflows = DataFlowService::new(self.db.clone())
            .flows_touching(id)
            .await?;
        Ok(SystemDetail { system, dataflows })
    }

    pub async fn create(&self, input: &SystemInput) -> RegistryResult<InformationSystem> {
        let draft = validate_system(input).map_err(|err| {
            warn!("Rejected system: {}", err);
            err
        })?;

        let txn = self.db.begin().await.map_err(store_error("begin transaction"))?;
        check_integrity(&txn, None, &draft).await?;

        let now = Utc::now();
        let system = draft.into_system(Uuid::new_v4(), now, now);
        systems::ActiveModel::from(&system)
            .insert(&txn)
            .await
            .map_err(store_error("create system"))?;
        txn.commit().await.map_err(store_error("commit system"))?;

        info!("Created system {} ({})", system.code, system.id);
        Ok(system)
    }

    pub async fn update(&self, id: Uuid, input: &SystemInput) -> RegistryResult<InformationSystem> {
        let draft = validate_system(input).map_err(|err| {
            warn!("Rejected system: {}", err);
            err
        })?;

        let txn = self.db.begin().await.map_err(store_error("begin transaction"))?;
        let existing = find_system(&txn, id).await?;
        check_integrity(&txn, Some(id), &draft).await?;

        let system = draft.into_system(id, existing.created_at, Utc::now());
        systems::ActiveModel::from(&system)
            .update(&txn)
            .await
            .map_err(write_error("update system", "System", id))?;
        txn.commit().await.map_err(store_error("commit system"))?;

        info!("Updated system {} ({})", system.code, system.id);
        Ok(system)
    }

    /// Delete a system that nothing references any more. The id is removed
    /// from other systems' dependency lists in the same transaction.
    pub async fn delete(&self, id: Uuid) -> RegistryResult<()> {
        let txn = self.db.begin().await.map_err(store_error("begin transaction"))?;
        let system = find_system(&txn, id).await?;

        let flow_count = dataflows::Entity::find()
            .filter(
                Condition::any()
                    .add(dataflows::Column::SourceSystemId.eq(id))
                    .add(dataflows::Column::TargetSystemId.eq(id)),
            )
            .count(&txn)
            .await
            .map_err(store_error("count system dataflows"))?;
        let child_count = systems::Entity::find()
            .filter(systems::Column::ParentSystemId.eq(id))
            .count(&txn)
            .await
            .map_err(store_error("count child systems"))?;

        let mut fields = FieldErrors::new();
        if flow_count > 0 {
            fields.insert(
                "dataflows",
                format!("System is an endpoint of {} data flow(s); delete them first", flow_count),
            );
        }
        if child_count > 0 {
            fields.insert(
                "children",
                format!("System is the parent of {} system(s); reassign them first", child_count),
            );
        }
        if !fields.is_empty() {
            warn!("Refusing to delete system {}: {}", system.code, fields);
            return Err(RegistryError::integrity_fields(
                format!("System '{}' is still referenced", system.code),
                fields,
            ));
        }

        let needle = id.to_string();
        let dependents = systems::Entity::find()
            .filter(systems::Column::DependentSystems.contains(needle.as_str()))
            .all(&txn)
            .await
            .map_err(store_error("load dependent systems"))?;
        for model in dependents {
            let mut other = decode(model)?;
            other.dependent_systems.retain(|dependent| *dependent != id);
            other.updated_at = Utc::now();
            systems::ActiveModel::from(&other)
                .update(&txn)
                .await
                .map_err(store_error("detach dependent system"))?;
            debug!("Detached {} from dependents of {}", system.code, other.code);
        }

        systems::Entity::delete_by_id(id)
            .exec(&txn)
            .await
            .map_err(store_error("delete system"))?;
        txn.commit().await.map_err(store_error("commit delete"))?;

        info!("Deleted system {} ({})", system.code, id);
        Ok(())
    }

    pub async fn activate(&self, id: Uuid) -> RegistryResult<InformationSystem> {
        self.set_status(id, SystemStatus::Production).await
    }

    pub async fn deprecate(&self, id: Uuid) -> RegistryResult<InformationSystem> {
        self.set_status(id, SystemStatus::Deprecated).await
    }

    /// `updated_at` only moves when the status actually changes.
    async fn set_status(&self, id: Uuid, status: SystemStatus) -> RegistryResult<InformationSystem> {
        let txn = self.db.begin().await.map_err(store_error("begin transaction"))?;
        let mut system = find_system(&txn, id).await?;
        if system.status == status {
            debug!("System {} already {}", system.code, status);
            return Ok(system);
        }

        let previous = system.status;
        system.status = status;
        system.updated_at = Utc::now();

        let model = systems::ActiveModel {
            id: Set(id),
            status: Set(status.as_str().to_string()),
            updated_at: Set(system.updated_at),
            ..Default::default()
        };
        model
            .update(&txn)
            .await
            .map_err(write_error("change system status", "System", id))?;
        txn.commit().await.map_err(store_error("commit system status"))?;

        info!("System {} moved from {} to {}", system.code, previous, status);
        Ok(system)
    }

    pub async fn hierarchy(&self, id: Uuid) -> RegistryResult<SystemHierarchy> {
        let all = self.load_all().await?;
        let system = all
            .iter()
            .find(|system| system.id == id)
            .ok_or_else(|| RegistryError::not_found("System", id))?;

        let tree = SystemTree::build(all.iter().map(|s| (s.id, s.parent_system_id)));
        let lookup = |other: Uuid| all.iter().find(|s| s.id == other).map(SystemRef::from);

        Ok(SystemHierarchy {
            system: SystemRef::from(system),
            ancestors: tree.ancestors(id).into_iter().filter_map(lookup).collect(),
            children: tree.children_of(id).into_iter().filter_map(lookup).collect(),
        })
    }
}
