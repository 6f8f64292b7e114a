use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[cfg(feature = "server")]
use utoipa::ToSchema;

use crate::errors::{FieldErrors, RegistryError, RegistryResult};
use crate::model::{
    CriticalityClass, DataFlow, Frequency, InformationSystem, SystemStatus, SystemType,
};

const NODE_TYPE: &str = "system";

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "server", derive(ToSchema))]
pub struct NodeData {
    pub label: String,
    pub code: String,
    pub description: String,
    pub status: SystemStatus,
    pub system_type: SystemType,
    pub criticality_class: CriticalityClass,
    pub owner: String,
    pub department: String,
    /// Endpoint of at least one data flow
    pub connected: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "server", derive(ToSchema))]
pub struct DiagramNode {
    pub id: Uuid,
    #[serde(rename = "type")]
    pub node_type: String,
    pub data: NodeData,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "server", derive(ToSchema))]
pub struct EdgeData {
    pub label: String,
    pub data_objects: Vec<String>,
    pub integration_technology: String,
    pub frequency: Frequency,
    pub description: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "server", derive(ToSchema))]
pub struct DiagramEdge {
    pub id: Uuid,
    pub source: Uuid,
    pub target: Uuid,
    pub data: EdgeData,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "server", derive(ToSchema))]
pub struct DiagramMetadata {
    pub total_systems: u64,
    pub total_dataflows: u64,
    pub connected_systems: u64,
    pub isolated_systems: u64,
}

/// Node/edge rendition of the data flow landscape. Layout is left to the
/// renderer.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "server", derive(ToSchema))]
pub struct DataflowDiagram {
    pub nodes: Vec<DiagramNode>,
    pub edges: Vec<DiagramEdge>,
    pub metadata: DiagramMetadata,
}

/// Build the diagram from the full collections, in the order given.
///
/// Every edge endpoint must be one of `systems`; a dangling flow means the
/// store lost referential integrity and is reported instead of dropped.
pub fn build_diagram(
    systems: &[InformationSystem],
    flows: &[DataFlow],
) -> RegistryResult<DataflowDiagram> {
    let known: HashSet<Uuid> = systems.iter().map(|s| s.id).collect();
    let mut connected: HashSet<Uuid> = HashSet::new();
    let mut dangling = FieldErrors::new();

    let mut edges = Vec::with_capacity(flows.len());
    for flow in flows {
        for (field, endpoint) in [
            ("source_system_id", flow.source_system_id),
            ("target_system_id", flow.target_system_id),
        ] {
            if !known.contains(&endpoint) {
                dangling.insert(
                    format!("dataflows[{}].{}", flow.id, field),
                    format!("System '{}' does not exist", endpoint),
                );
            }
        }
        connected.insert(flow.source_system_id);
        connected.insert(flow.target_system_id);

        edges.push(DiagramEdge {
            id: flow.id,
            source: flow.source_system_id,
            target: flow.target_system_id,
            data: EdgeData {
                label: flow.label(),
                data_objects: flow.data_objects.clone(),
                integration_technology: flow.integration_technology.clone(),
                frequency: flow.frequency,
                description: flow.description.clone(),
            },
        });
    }

    if !dangling.is_empty() {
        return Err(RegistryError::integrity_fields(
            "Data flows reference systems that no longer exist",
            dangling,
        ));
    }

    let nodes: Vec<DiagramNode> = systems
        .iter()
        .map(|system| DiagramNode {
            id: system.id,
            node_type: NODE_TYPE.to_string(),
            data: NodeData {
                label: system.name.clone(),
                code: system.code.clone(),
                description: system.description.clone(),
                status: system.status,
                system_type: system.system_type,
                criticality_class: system.criticality_class,
                owner: system.owner.name.clone(),
                department: system.owner.department.clone(),
                connected: connected.contains(&system.id),
            },
        })
        .collect();

    let connected_systems = nodes.iter().filter(|node| node.data.connected).count() as u64;
    let total_systems = nodes.len() as u64;

    Ok(DataflowDiagram {
        metadata: DiagramMetadata {
            total_systems,
            total_dataflows: edges.len() as u64,
            connected_systems,
            isolated_systems: total_systems - connected_systems,
        },
        nodes,
        edges,
    })
}
