use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

#[cfg(feature = "server")]
use utoipa::ToSchema;

use crate::common::text::fold_case;
use crate::model::{InformationSystem, SystemStatus};

/// Counts keyed by folded value, remembering the first spelling.
#[derive(Default)]
struct FoldedCounts {
    buckets: HashMap<String, (String, u64)>,
}

impl FoldedCounts {
    fn add(&mut self, value: &str) {
        let bucket = self
            .buckets
            .entry(fold_case(value))
            .or_insert_with(|| (value.trim().to_string(), 0));
        bucket.1 += 1;
    }

    fn into_counts(self) -> impl Iterator<Item = (String, u64)> {
        self.buckets.into_values()
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "server", derive(ToSchema))]
pub struct TechnologyCount {
    pub technology: String,
    pub count: u64,
}

/// Dashboard aggregates over the full system collection.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "server", derive(ToSchema))]
pub struct SystemStatistics {
    pub total_systems: u64,
    pub development_systems: u64,
    pub production_systems: u64,
    pub deprecated_systems: u64,
    /// Mission critical or business critical
    pub critical_systems: u64,
    pub systems_by_type: BTreeMap<String, u64>,
    pub systems_by_department: BTreeMap<String, u64>,
    /// Every technology in use, most used first, ties by name
    pub top_technologies: Vec<TechnologyCount>,
}

impl SystemStatistics {
    /// Departments and technologies are grouped with the same case folding
    /// the list filters use, under the first spelling seen.
    pub fn from_systems(systems: &[InformationSystem]) -> Self {
        let mut stats = SystemStatistics {
            total_systems: systems.len() as u64,
            ..Default::default()
        };
        let mut departments = FoldedCounts::default();
        let mut technologies = FoldedCounts::default();

        for system in systems {
            match system.status {
                SystemStatus::Development => stats.development_systems += 1,
                SystemStatus::Production => stats.production_systems += 1,
                SystemStatus::Deprecated => stats.deprecated_systems += 1,
            }
            if system.criticality_class.is_critical() {
                stats.critical_systems += 1;
            }
            *stats
                .systems_by_type
                .entry(system.system_type.as_str().to_string())
                .or_insert(0) += 1;
            departments.add(&system.owner.department);
            for technology in &system.technical_spec.technology_stack {
                technologies.add(technology);
            }
        }

        stats.systems_by_department = departments.into_counts().collect();

        let mut ranked: Vec<TechnologyCount> = technologies
            .into_counts()
            .map(|(technology, count)| TechnologyCount { technology, count })
            .collect();
        ranked.sort_by(|a, b| {
            b.count
                .cmp(&a.count)
                .then_with(|| a.technology.cmp(&b.technology))
        });
        stats.top_technologies = ranked;

        stats
    }

    pub fn status_total(&self) -> u64 {
        self.development_systems + self.production_systems + self.deprecated_systems
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{CriticalityClass, Owner, SystemType, TechnicalSpec};
    use chrono::Utc;
    use uuid::Uuid;

    fn system(
        status: SystemStatus,
        system_type: SystemType,
        department: &str,
        class: CriticalityClass,
        technologies: &[&str],
    ) -> InformationSystem {
        let now = Utc::now();
        InformationSystem {
            id: Uuid::new_v4(),
            name: "S".to_string(),
            code: Uuid::new_v4().to_string(),
            description: String::new(),
            purpose: String::new(),
            business_value: String::new(),
            status,
            system_type,
            criticality_class: class,
            owner: Owner {
                name: "Owner".to_string(),
                email: "owner@example.com".to_string(),
                department: department.to_string(),
                phone: None,
            },
            technical_spec: TechnicalSpec {
                technology_stack: technologies.iter().map(|t| t.to_string()).collect(),
                ..Default::default()
            },
            business_functions: vec![],
            cost_center: None,
            version: "1.0.0".to_string(),
            parent_system_id: None,
            dependent_systems: vec![],
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn status_partition_covers_every_system() {
        let systems = vec![
            system(SystemStatus::Production, SystemType::Cloud, "IT", CriticalityClass::MissionCritical, &[]),
            system(SystemStatus::Production, SystemType::Internal, "IT", CriticalityClass::OfficeProductivity, &[]),
            system(SystemStatus::Deprecated, SystemType::Internal, "HR", CriticalityClass::BusinessCritical, &[]),
        ];
        let stats = SystemStatistics::from_systems(&systems);

        assert_eq!(stats.total_systems, 3);
        assert_eq!(stats.status_total(), stats.total_systems);
        assert_eq!(stats.development_systems, 0);
        assert_eq!(stats.production_systems, 2);
        assert_eq!(stats.critical_systems, 2);
        assert_eq!(stats.systems_by_type.get("internal"), Some(&2));
        assert_eq!(stats.systems_by_department.get("HR"), Some(&1));
    }

    #[test]
    fn technologies_ranked_by_count_then_name() {
        let class = CriticalityClass::BusinessOperational;
        let systems = vec![
            system(SystemStatus::Production, SystemType::Internal, "IT", class, &["Rust", "PostgreSQL"]),
            system(SystemStatus::Production, SystemType::Internal, "IT", class, &["Rust", "Kafka"]),
            system(SystemStatus::Development, SystemType::Internal, "IT", class, &["Java"]),
        ];
        let stats = SystemStatistics::from_systems(&systems);
        let names: Vec<_> = stats
            .top_technologies
            .iter()
            .map(|t| (t.technology.as_str(), t.count))
            .collect();
        assert_eq!(
            names,
            vec![("Rust", 2), ("Java", 1), ("Kafka", 1), ("PostgreSQL", 1)]
        );
    }

    #[test]
    fn buckets_fold_case_like_the_filters() {
        let class = CriticalityClass::BusinessOperational;
        let systems = vec![
            system(SystemStatus::Production, SystemType::Internal, "Finance", class, &["Rust"]),
            system(SystemStatus::Production, SystemType::Internal, "finance", class, &["rust"]),
            system(SystemStatus::Production, SystemType::Internal, "Équipe", class, &["Go"]),
            system(SystemStatus::Production, SystemType::Internal, "équipe", class, &[]),
        ];
        let stats = SystemStatistics::from_systems(&systems);

        assert_eq!(stats.systems_by_department.len(), 2);
        assert_eq!(stats.systems_by_department.get("Finance"), Some(&2));
        assert_eq!(stats.systems_by_department.get("Équipe"), Some(&2));
        assert_eq!(
            stats.top_technologies[0],
            TechnologyCount {
                technology: "Rust".to_string(),
                count: 2
            }
        );
    }

    #[test]
    fn empty_collection_has_zero_counts() {
        let stats = SystemStatistics::from_systems(&[]);
        assert_eq!(stats, SystemStatistics::default());
    }
}
