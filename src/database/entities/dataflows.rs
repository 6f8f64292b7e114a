use sea_orm::entity::prelude::*;
use sea_orm::Set;
use serde::{Deserialize, Serialize};

use crate::model::{DataFlow, Frequency};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "dataflows")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub source_system_id: Uuid,
    pub target_system_id: Uuid,
    #[sea_orm(column_type = "Text")]
    pub data_objects: String, // JSON array stored as string
    pub integration_technology: String,
    pub frequency: String,
    #[sea_orm(column_type = "Text", nullable)]
    pub description: Option<String>,
    pub created_at: ChronoDateTimeUtc,
    pub updated_at: ChronoDateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::systems::Entity",
        from = "Column::SourceSystemId",
        to = "super::systems::Column::Id"
    )]
    SourceSystem,
    #[sea_orm(
        belongs_to = "super::systems::Entity",
        from = "Column::TargetSystemId",
        to = "super::systems::Column::Id"
    )]
    TargetSystem,
}

impl ActiveModelBehavior for ActiveModel {}

impl TryFrom<Model> for DataFlow {
    type Error = DbErr;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        let data_objects: Vec<String> = serde_json::from_str(&model.data_objects)
            .map_err(|e| DbErr::Json(format!("dataflows.data_objects: {}", e)))?;
        let frequency: Frequency = model
            .frequency
            .parse()
            .map_err(|e: String| DbErr::Type(format!("dataflows.frequency: {}", e)))?;

        Ok(DataFlow {
            id: model.id,
            source_system_id: model.source_system_id,
            target_system_id: model.target_system_id,
            data_objects,
            integration_technology: model.integration_technology,
            frequency,
            description: model.description,
            created_at: model.created_at,
            updated_at: model.updated_at,
        })
    }
}

impl From<&DataFlow> for ActiveModel {
    fn from(flow: &DataFlow) -> Self {
        Self {
            id: Set(flow.id),
            source_system_id: Set(flow.source_system_id),
            target_system_id: Set(flow.target_system_id),
            data_objects: Set(
                serde_json::to_string(&flow.data_objects).unwrap_or_else(|_| "[]".to_string())
            ),
            integration_technology: Set(flow.integration_technology.clone()),
            frequency: Set(flow.frequency.as_str().to_string()),
            description: Set(flow.description.clone()),
            created_at: Set(flow.created_at),
            updated_at: Set(flow.updated_at),
        }
    }
}
