//! Write-path validation for systems and data flows.
//!
//! Request bodies arrive with enumerated values and ids as plain strings so
//! that a bad value becomes a field message instead of a body rejection.
//! Validation is pure: it turns an input into a typed draft or a complete
//! [`FieldErrors`] map. Checks that need stored data (code uniqueness,
//! reference existence, hierarchy cycles) run afterwards in the services.

use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[cfg(feature = "server")]
use utoipa::ToSchema;

use crate::common::text::{non_blank, normalize_list, normalize_set};
use crate::errors::{FieldErrors, RegistryError, RegistryResult};
use crate::model::{
    BusinessFunction, Criticality, CriticalityClass, DataFlow, Frequency, InformationSystem,
    Owner, SystemStatus, SystemType, TechnicalSpec,
};

const MAX_NAME_LEN: usize = 200;
const MAX_CODE_LEN: usize = 50;
const DEFAULT_DEPLOYMENT_MODEL: &str = "On-premise";

static EMAIL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("Invalid regex pattern for email addresses")
});

static CODE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z0-9][A-Za-z0-9._-]*$").expect("Invalid regex pattern for system codes")
});

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "server", derive(ToSchema))]
pub struct OwnerInput {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub department: String,
    pub phone: Option<String>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "server", derive(ToSchema))]
pub struct TechnicalSpecInput {
    #[serde(default)]
    pub technology_stack: Vec<String>,
    #[serde(default)]
    pub programming_languages: Vec<String>,
    #[serde(default)]
    pub databases: Vec<String>,
    #[serde(default)]
    pub frameworks: Vec<String>,
    pub deployment_model: Option<String>,
    pub hosting_provider: Option<String>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "server", derive(ToSchema))]
pub struct BusinessFunctionInput {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// high, medium or low; defaults from the system's criticality class
    pub criticality: Option<String>,
    #[serde(default)]
    pub business_processes: Vec<String>,
}

/// Create/update body for a system.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "server", derive(ToSchema))]
pub struct SystemInput {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub purpose: String,
    #[serde(default)]
    pub business_value: String,
    pub status: Option<String>,
    pub system_type: Option<String>,
    pub criticality_class: Option<String>,
    pub owner: Option<OwnerInput>,
    #[serde(default)]
    pub technical_spec: TechnicalSpecInput,
    #[serde(default)]
    pub business_functions: Vec<BusinessFunctionInput>,
    pub cost_center: Option<String>,
    pub version: Option<String>,
    pub parent_system_id: Option<String>,
    #[serde(default)]
    pub dependent_systems: Vec<String>,
}

/// A system that passed field validation but has no identity yet.
#[derive(Clone, Debug, PartialEq)]
pub struct SystemDraft {
    pub name: String,
    pub code: String,
    pub description: String,
    pub purpose: String,
    pub business_value: String,
    pub status: SystemStatus,
    pub system_type: SystemType,
    pub criticality_class: CriticalityClass,
    pub owner: Owner,
    pub technical_spec: TechnicalSpec,
    pub business_functions: Vec<BusinessFunction>,
    pub cost_center: Option<String>,
    pub version: String,
    pub parent_system_id: Option<Uuid>,
    pub dependent_systems: Vec<Uuid>,
}

impl SystemDraft {
    pub fn into_system(
        self,
        id: Uuid,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> InformationSystem {
        InformationSystem {
            id,
            name: self.name,
            code: self.code,
            description: self.description,
            purpose: self.purpose,
            business_value: self.business_value,
            status: self.status,
            system_type: self.system_type,
            criticality_class: self.criticality_class,
            owner: self.owner,
            technical_spec: self.technical_spec,
            business_functions: self.business_functions,
            cost_center: self.cost_center,
            version: self.version,
            parent_system_id: self.parent_system_id,
            dependent_systems: self.dependent_systems,
            created_at,
            updated_at,
        }
    }
}

/// Create/update body for a data flow.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "server", derive(ToSchema))]
pub struct DataFlowInput {
    pub source_system_id: Option<String>,
    pub target_system_id: Option<String>,
    #[serde(default)]
    pub data_objects: Vec<String>,
    pub integration_technology: Option<String>,
    /// real-time, near-real-time, batch or on-demand; defaults to real-time
    pub frequency: Option<String>,
    pub description: Option<String>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct DataFlowDraft {
    pub source_system_id: Uuid,
    pub target_system_id: Uuid,
    pub data_objects: Vec<String>,
    pub integration_technology: String,
    pub frequency: Frequency,
    pub description: Option<String>,
}

impl DataFlowDraft {
    pub fn into_dataflow(
        self,
        id: Uuid,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> DataFlow {
        DataFlow {
            id,
            source_system_id: self.source_system_id,
            target_system_id: self.target_system_id,
            data_objects: self.data_objects,
            integration_technology: self.integration_technology,
            frequency: self.frequency,
            description: self.description,
            created_at,
            updated_at,
        }
    }
}

pub fn is_valid_email(email: &str) -> bool {
    EMAIL.is_match(email)
}

fn parse_id(raw: &str, field: &str, errors: &mut FieldErrors) -> Option<Uuid> {
    match Uuid::parse_str(raw.trim()) {
        Ok(id) => Some(id),
        Err(_) => {
            errors.insert(field, format!("'{}' is not a valid identifier", raw.trim()));
            None
        }
    }
}

fn parse_enum<T>(raw: Option<&str>, field: &str, default: Option<T>, errors: &mut FieldErrors) -> Option<T>
where
    T: std::str::FromStr<Err = String>,
{
    match non_blank(raw) {
        Some(value) => match value.parse::<T>() {
            Ok(parsed) => Some(parsed),
            Err(message) => {
                errors.insert(field, message);
                None
            }
        },
        None => {
            if default.is_none() {
                errors.insert(field, format!("{} is required", field_label(field)));
            }
            default
        }
    }
}

fn field_label(field: &str) -> String {
    let base = field.rsplit('.').next().unwrap_or(field).replace('_', " ");
    let mut chars = base.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

fn validate_owner(owner: Option<&OwnerInput>, errors: &mut FieldErrors) -> Option<Owner> {
    let Some(owner) = owner else {
        errors.insert("owner", "Owner is required");
        return None;
    };

    let name = owner.name.trim();
    let email = owner.email.trim();
    let department = owner.department.trim();
    let before = errors.len();

    if name.is_empty() {
        errors.insert("owner.name", "Owner name is required");
    }
    if email.is_empty() {
        errors.insert("owner.email", "Owner email is required");
    } else if !is_valid_email(email) {
        errors.insert("owner.email", format!("'{}' is not a valid email address", email));
    }
    if department.is_empty() {
        errors.insert("owner.department", "Owner department is required");
    }

    (errors.len() == before).then(|| Owner {
        name: name.to_string(),
        email: email.to_string(),
        department: department.to_string(),
        phone: non_blank(owner.phone.as_deref()),
    })
}

/// Validate and normalise a system body.
pub fn validate_system(input: &SystemInput) -> RegistryResult<SystemDraft> {
    let mut errors = FieldErrors::new();

    let name = input.name.trim();
    if name.is_empty() {
        errors.insert("name", "Name is required");
    } else if name.chars().count() > MAX_NAME_LEN {
        errors.insert("name", format!("Name must be at most {} characters", MAX_NAME_LEN));
    }

    let code = input.code.trim();
    if code.is_empty() {
        errors.insert("code", "Code is required");
    } else if code.chars().count() > MAX_CODE_LEN {
        errors.insert("code", format!("Code must be at most {} characters", MAX_CODE_LEN));
    } else if !CODE.is_match(code) {
        errors.insert(
            "code",
            "Code may only contain letters, digits, '.', '_' and '-'",
        );
    }

    let status = parse_enum::<SystemStatus>(input.status.as_deref(), "status", None, &mut errors);
    let system_type = parse_enum(
        input.system_type.as_deref(),
        "system_type",
        Some(SystemType::Internal),
        &mut errors,
    );
    let criticality_class = parse_enum(
        input.criticality_class.as_deref(),
        "criticality_class",
        Some(CriticalityClass::default()),
        &mut errors,
    );
    let owner = validate_owner(input.owner.as_ref(), &mut errors);

    let default_function_criticality = match criticality_class {
        Some(class) if class.is_critical() => Criticality::High,
        _ => Criticality::Medium,
    };
    let mut business_functions = Vec::with_capacity(input.business_functions.len());
    for (i, function) in input.business_functions.iter().enumerate() {
        let name = function.name.trim();
        if name.is_empty() {
            errors.insert(
                format!("business_functions[{}].name", i),
                "Business function name is required",
            );
        }
        let criticality = parse_enum(
            function.criticality.as_deref(),
            &format!("business_functions[{}].criticality", i),
            Some(default_function_criticality),
            &mut errors,
        );
        if let (false, Some(criticality)) = (name.is_empty(), criticality) {
            business_functions.push(BusinessFunction {
                name: name.to_string(),
                description: function.description.trim().to_string(),
                criticality,
                business_processes: normalize_list(&function.business_processes),
            });
        }
    }

    let parent_system_id = non_blank(input.parent_system_id.as_deref())
        .and_then(|raw| parse_id(&raw, "parent_system_id", &mut errors));

    let mut dependent_systems = Vec::new();
    for (i, raw) in input.dependent_systems.iter().enumerate() {
        if raw.trim().is_empty() {
            continue;
        }
        if let Some(id) = parse_id(raw, &format!("dependent_systems[{}]", i), &mut errors) {
            if !dependent_systems.contains(&id) {
                dependent_systems.push(id);
            }
        }
    }

    let spec = &input.technical_spec;
    let technical_spec = TechnicalSpec {
        technology_stack: normalize_set(&spec.technology_stack),
        programming_languages: normalize_set(&spec.programming_languages),
        databases: normalize_set(&spec.databases),
        frameworks: normalize_set(&spec.frameworks),
        deployment_model: non_blank(spec.deployment_model.as_deref())
            .unwrap_or_else(|| DEFAULT_DEPLOYMENT_MODEL.to_string()),
        hosting_provider: non_blank(spec.hosting_provider.as_deref()),
    };

    match (status, system_type, criticality_class, owner) {
        (Some(status), Some(system_type), Some(criticality_class), Some(owner))
            if errors.is_empty() =>
        {
            Ok(SystemDraft {
                name: name.to_string(),
                code: code.to_string(),
                description: input.description.trim().to_string(),
                purpose: input.purpose.trim().to_string(),
                business_value: input.business_value.trim().to_string(),
                status,
                system_type,
                criticality_class,
                owner,
                technical_spec,
                business_functions,
                cost_center: non_blank(input.cost_center.as_deref()),
                version: non_blank(input.version.as_deref())
                    .unwrap_or_else(|| InformationSystem::DEFAULT_VERSION.to_string()),
                parent_system_id,
                dependent_systems,
            })
        }
        _ => Err(RegistryError::Validation(errors)),
    }
}

/// Validate and normalise a data flow body. Existence of the endpoints is
/// checked by the caller.
pub fn validate_dataflow(input: &DataFlowInput) -> RegistryResult<DataFlowDraft> {
    let mut errors = FieldErrors::new();

    let source = match non_blank(input.source_system_id.as_deref()) {
        Some(raw) => parse_id(&raw, "source_system_id", &mut errors),
        None => {
            errors.insert("source_system_id", "Source system is required");
            None
        }
    };
    let target = match non_blank(input.target_system_id.as_deref()) {
        Some(raw) => parse_id(&raw, "target_system_id", &mut errors),
        None => {
            errors.insert("target_system_id", "Target system is required");
            None
        }
    };
    if let (Some(source), Some(target)) = (source, target) {
        if source == target {
            errors.insert(
                "target_system_id",
                "Source and target must be different systems",
            );
        }
    }

    let data_objects = normalize_set(&input.data_objects);
    if data_objects.is_empty() {
        errors.insert("data_objects", "At least one data object is required");
    }

    let integration_technology = non_blank(input.integration_technology.as_deref());
    if integration_technology.is_none() {
        errors.insert(
            "integration_technology",
            "Integration technology is required",
        );
    }

    let frequency = parse_enum(
        input.frequency.as_deref(),
        "frequency",
        Some(Frequency::default()),
        &mut errors,
    );

    match (source, target, integration_technology, frequency) {
        (Some(source_system_id), Some(target_system_id), Some(integration_technology), Some(frequency))
            if errors.is_empty() =>
        {
            Ok(DataFlowDraft {
                source_system_id,
                target_system_id,
                data_objects,
                integration_technology,
                frequency,
                description: non_blank(input.description.as_deref()),
            })
        }
        _ => Err(RegistryError::Validation(errors)),
    }
}
