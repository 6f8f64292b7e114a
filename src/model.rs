//! Domain records for the system registry.
//!
//! These are the explicit, validated shapes that flow between the record
//! store, the services and the HTTP layer. Enumerated fields carry their
//! canonical wire spelling through serde so that stored rows, JSON bodies and
//! spreadsheet cells all agree.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::common::text::fold_case;

#[cfg(feature = "server")]
use utoipa::ToSchema;

/// Lifecycle status of an information system.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[cfg_attr(feature = "server", derive(ToSchema))]
#[serde(rename_all = "lowercase")]
pub enum SystemStatus {
    Development,
    Production,
    Deprecated,
}

impl SystemStatus {
    pub const ALL: [SystemStatus; 3] = [
        SystemStatus::Development,
        SystemStatus::Production,
        SystemStatus::Deprecated,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SystemStatus::Development => "development",
            SystemStatus::Production => "production",
            SystemStatus::Deprecated => "deprecated",
        }
    }
}

impl FromStr for SystemStatus {
    type Err = String;

    /// Accepts the canonical spellings plus the legacy `active`, `inactive`
    /// and `planned` values still sent by older forms.
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "development" | "planned" => Ok(SystemStatus::Development),
            "production" | "active" => Ok(SystemStatus::Production),
            "deprecated" | "inactive" => Ok(SystemStatus::Deprecated),
            other => Err(format!(
                "Unknown status '{}'; expected one of development, production, deprecated",
                other
            )),
        }
    }
}

impl fmt::Display for SystemStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where a system runs relative to the organisation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[cfg_attr(feature = "server", derive(ToSchema))]
#[serde(rename_all = "lowercase")]
pub enum SystemType {
    Internal,
    External,
    Cloud,
}

impl SystemType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SystemType::Internal => "internal",
            SystemType::External => "external",
            SystemType::Cloud => "cloud",
        }
    }
}

impl FromStr for SystemType {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "internal" => Ok(SystemType::Internal),
            "external" => Ok(SystemType::External),
            "cloud" => Ok(SystemType::Cloud),
            other => Err(format!(
                "Unknown system type '{}'; expected one of internal, external, cloud",
                other
            )),
        }
    }
}

impl fmt::Display for SystemType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Business-impact tier of a system.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[cfg_attr(feature = "server", derive(ToSchema))]
pub enum CriticalityClass {
    #[serde(rename = "Mission critical")]
    MissionCritical,
    #[serde(rename = "Business critical")]
    BusinessCritical,
    #[serde(rename = "Business operational")]
    BusinessOperational,
    #[serde(rename = "Office productivity")]
    OfficeProductivity,
}

impl CriticalityClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            CriticalityClass::MissionCritical => "Mission critical",
            CriticalityClass::BusinessCritical => "Business critical",
            CriticalityClass::BusinessOperational => "Business operational",
            CriticalityClass::OfficeProductivity => "Office productivity",
        }
    }

    /// Mission and business critical systems count as critical on the dashboard.
    pub fn is_critical(&self) -> bool {
        matches!(
            self,
            CriticalityClass::MissionCritical | CriticalityClass::BusinessCritical
        )
    }
}

impl Default for CriticalityClass {
    fn default() -> Self {
        CriticalityClass::BusinessOperational
    }
}

impl FromStr for CriticalityClass {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "mission critical" => Ok(CriticalityClass::MissionCritical),
            "business critical" => Ok(CriticalityClass::BusinessCritical),
            "business operational" => Ok(CriticalityClass::BusinessOperational),
            "office productivity" => Ok(CriticalityClass::OfficeProductivity),
            _ => Err(format!(
                "Unknown criticality class '{}'; expected one of Mission critical, \
                 Business critical, Business operational, Office productivity",
                value.trim()
            )),
        }
    }
}

impl fmt::Display for CriticalityClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Criticality of a single business function.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "server", derive(ToSchema))]
#[serde(rename_all = "lowercase")]
pub enum Criticality {
    High,
    Medium,
    Low,
}

impl Criticality {
    pub fn as_str(&self) -> &'static str {
        match self {
            Criticality::High => "high",
            Criticality::Medium => "medium",
            Criticality::Low => "low",
        }
    }
}

impl FromStr for Criticality {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "high" => Ok(Criticality::High),
            "medium" => Ok(Criticality::Medium),
            "low" => Ok(Criticality::Low),
            other => Err(format!(
                "Unknown criticality '{}'; expected one of high, medium, low",
                other
            )),
        }
    }
}

/// How often a data flow transfers its objects.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "server", derive(ToSchema))]
#[serde(rename_all = "kebab-case")]
pub enum Frequency {
    RealTime,
    NearRealTime,
    Batch,
    OnDemand,
}

impl Frequency {
    pub fn as_str(&self) -> &'static str {
        match self {
            Frequency::RealTime => "real-time",
            Frequency::NearRealTime => "near-real-time",
            Frequency::Batch => "batch",
            Frequency::OnDemand => "on-demand",
        }
    }
}

impl Default for Frequency {
    fn default() -> Self {
        Frequency::RealTime
    }
}

impl FromStr for Frequency {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().replace(['_', ' '], "-").as_str() {
            "real-time" | "realtime" => Ok(Frequency::RealTime),
            "near-real-time" => Ok(Frequency::NearRealTime),
            "batch" => Ok(Frequency::Batch),
            "on-demand" => Ok(Frequency::OnDemand),
            _ => Err(format!(
                "Unknown frequency '{}'; expected one of real-time, near-real-time, batch, on-demand",
                value.trim()
            )),
        }
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Integration technologies offered by the data flow form. The field itself
/// is an open set; anything non-empty is accepted.
pub const KNOWN_INTEGRATION_TECHNOLOGIES: &[&str] = &[
    "REST API",
    "SOAP",
    "GraphQL",
    "Message Queue",
    "ETL",
    "File Transfer",
    "Database Link",
    "Webhook",
    "Event Stream",
];

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "server", derive(ToSchema))]
pub struct Owner {
    pub name: String,
    pub email: String,
    pub department: String,
    pub phone: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "server", derive(ToSchema))]
pub struct TechnicalSpec {
    pub technology_stack: Vec<String>,
    pub programming_languages: Vec<String>,
    pub databases: Vec<String>,
    pub frameworks: Vec<String>,
    pub deployment_model: String,
    pub hosting_provider: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "server", derive(ToSchema))]
pub struct BusinessFunction {
    pub name: String,
    pub description: String,
    pub criticality: Criticality,
    pub business_processes: Vec<String>,
}

/// A registered information system.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "server", derive(ToSchema))]
pub struct InformationSystem {
    pub id: Uuid,
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
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl InformationSystem {
    pub const DEFAULT_VERSION: &'static str = "1.0.0";

    /// True when any embedded business function is rated high.
    pub fn has_high_criticality_function(&self) -> bool {
        self.business_functions
            .iter()
            .any(|function| function.criticality == Criticality::High)
    }

    /// Case-insensitive substring match over name, code and description.
    pub fn matches_text(&self, needle_lower: &str) -> bool {
        self.name.to_lowercase().contains(needle_lower)
            || self.code.to_lowercase().contains(needle_lower)
            || self.description.to_lowercase().contains(needle_lower)
    }

    pub fn uses_technology(&self, technology: &str) -> bool {
        let wanted = fold_case(technology);
        self.technical_spec
            .technology_stack
            .iter()
            .any(|entry| fold_case(entry) == wanted)
    }

    pub fn in_department(&self, department: &str) -> bool {
        fold_case(&self.owner.department) == fold_case(department)
    }
}

/// A directed data exchange between two systems.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "server", derive(ToSchema))]
pub struct DataFlow {
    pub id: Uuid,
    pub source_system_id: Uuid,
    pub target_system_id: Uuid,
    pub data_objects: Vec<String>,
    pub integration_technology: String,
    pub frequency: Frequency,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl DataFlow {
    pub fn touches(&self, system_id: Uuid) -> bool {
        self.source_system_id == system_id || self.target_system_id == system_id
    }

    /// Short caption used for diagram edges and spreadsheet cells.
    pub fn label(&self) -> String {
        format!(
            "{} via {}",
            self.data_objects.join(", "),
            self.integration_technology
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_accepts_legacy_spellings() {
        assert_eq!("active".parse::<SystemStatus>(), Ok(SystemStatus::Production));
        assert_eq!("Inactive".parse::<SystemStatus>(), Ok(SystemStatus::Deprecated));
        assert_eq!("planned".parse::<SystemStatus>(), Ok(SystemStatus::Development));
        assert!("retired".parse::<SystemStatus>().is_err());
    }

    #[test]
    fn criticality_class_round_trips_wire_name() {
        let json = serde_json::to_string(&CriticalityClass::MissionCritical).unwrap();
        assert_eq!(json, "\"Mission critical\"");
        assert_eq!(
            "business critical".parse::<CriticalityClass>(),
            Ok(CriticalityClass::BusinessCritical)
        );
        assert!(CriticalityClass::BusinessCritical.is_critical());
        assert!(!CriticalityClass::OfficeProductivity.is_critical());
    }

    #[test]
    fn frequency_uses_kebab_case() {
        let json = serde_json::to_string(&Frequency::NearRealTime).unwrap();
        assert_eq!(json, "\"near-real-time\"");
        assert_eq!("on demand".parse::<Frequency>(), Ok(Frequency::OnDemand));
        assert_eq!("real_time".parse::<Frequency>(), Ok(Frequency::RealTime));
    }
}
