use sea_orm::entity::prelude::*;
use sea_orm::Set;
use serde::{Deserialize, Serialize};

use crate::model::{
    BusinessFunction, CriticalityClass, InformationSystem, Owner, SystemStatus, SystemType,
    TechnicalSpec,
};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "information_systems")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub name: String,
    #[sea_orm(unique)]
    pub code: String,
    #[sea_orm(column_type = "Text")]
    pub description: String,
    #[sea_orm(column_type = "Text")]
    pub purpose: String,
    #[sea_orm(column_type = "Text")]
    pub business_value: String,
    pub status: String,
    pub system_type: String,
    pub criticality_class: String,
    pub owner_name: String,
    pub owner_email: String,
    pub owner_department: String,
    pub owner_phone: Option<String>,
    #[sea_orm(column_type = "Text", default_value = "[]")]
    pub technology_stack: String, // JSON array stored as string
    #[sea_orm(column_type = "Text", default_value = "[]")]
    pub programming_languages: String,
    #[sea_orm(column_type = "Text", default_value = "[]")]
    pub databases: String,
    #[sea_orm(column_type = "Text", default_value = "[]")]
    pub frameworks: String,
    pub deployment_model: String,
    pub hosting_provider: Option<String>,
    #[sea_orm(column_type = "Text", default_value = "[]")]
    pub business_functions: String,
    pub cost_center: Option<String>,
    pub version: String,
    pub parent_system_id: Option<Uuid>,
    #[sea_orm(column_type = "Text", default_value = "[]")]
    pub dependent_systems: String,
    pub created_at: ChronoDateTimeUtc,
    pub updated_at: ChronoDateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

fn decode_json<T: serde::de::DeserializeOwned>(column: &str, raw: &str) -> Result<T, DbErr> {
    serde_json::from_str(raw)
        .map_err(|e| DbErr::Json(format!("information_systems.{}: {}", column, e)))
}

fn encode_json<T: Serialize>(value: &T) -> String {
    serde_json::to_string(value).unwrap_or_else(|_| "[]".to_string())
}

fn decode_enum<T: std::str::FromStr<Err = String>>(column: &str, raw: &str) -> Result<T, DbErr> {
    raw.parse::<T>()
        .map_err(|e| DbErr::Type(format!("information_systems.{}: {}", column, e)))
}

impl TryFrom<Model> for InformationSystem {
    type Error = DbErr;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        let status: SystemStatus = decode_enum("status", &model.status)?;
        let system_type: SystemType = decode_enum("system_type", &model.system_type)?;
        let criticality_class: CriticalityClass =
            decode_enum("criticality_class", &model.criticality_class)?;
        let business_functions: Vec<BusinessFunction> =
            decode_json("business_functions", &model.business_functions)?;

        Ok(InformationSystem {
            id: model.id,
            name: model.name,
            code: model.code,
            description: model.description,
            purpose: model.purpose,
            business_value: model.business_value,
            status,
            system_type,
            criticality_class,
            owner: Owner {
                name: model.owner_name,
                email: model.owner_email,
                department: model.owner_department,
                phone: model.owner_phone,
            },
            technical_spec: TechnicalSpec {
                technology_stack: decode_json("technology_stack", &model.technology_stack)?,
                programming_languages: decode_json(
                    "programming_languages",
                    &model.programming_languages,
                )?,
                databases: decode_json("databases", &model.databases)?,
                frameworks: decode_json("frameworks", &model.frameworks)?,
                deployment_model: model.deployment_model,
                hosting_provider: model.hosting_provider,
            },
            business_functions,
            cost_center: model.cost_center,
            version: model.version,
            parent_system_id: model.parent_system_id,
            dependent_systems: decode_json("dependent_systems", &model.dependent_systems)?,
            created_at: model.created_at,
            updated_at: model.updated_at,
        })
    }
}

impl From<&InformationSystem> for ActiveModel {
    fn from(system: &InformationSystem) -> Self {
        Self {
            id: Set(system.id),
            name: Set(system.name.clone()),
            code: Set(system.code.clone()),
            description: Set(system.description.clone()),
            purpose: Set(system.purpose.clone()),
            business_value: Set(system.business_value.clone()),
            status: Set(system.status.as_str().to_string()),
            system_type: Set(system.system_type.as_str().to_string()),
            criticality_class: Set(system.criticality_class.as_str().to_string()),
            owner_name: Set(system.owner.name.clone()),
            owner_email: Set(system.owner.email.clone()),
            owner_department: Set(system.owner.department.clone()),
            owner_phone: Set(system.owner.phone.clone()),
            technology_stack: Set(encode_json(&system.technical_spec.technology_stack)),
            programming_languages: Set(encode_json(&system.technical_spec.programming_languages)),
            databases: Set(encode_json(&system.technical_spec.databases)),
            frameworks: Set(encode_json(&system.technical_spec.frameworks)),
            deployment_model: Set(system.technical_spec.deployment_model.clone()),
            hosting_provider: Set(system.technical_spec.hosting_provider.clone()),
            business_functions: Set(encode_json(&system.business_functions)),
            cost_center: Set(system.cost_center.clone()),
            version: Set(system.version.clone()),
            parent_system_id: Set(system.parent_system_id),
            dependent_systems: Set(encode_json(&system.dependent_systems)),
            created_at: Set(system.created_at),
            updated_at: Set(system.updated_at),
        }
    }
}
