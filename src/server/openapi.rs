use utoipa::OpenApi;

use super::error::ErrorBody;
use super::handlers::{dataflows, diagram, export, health, statistics, systems};
use crate::model::{
    BusinessFunction, Criticality, CriticalityClass, DataFlow, Frequency, InformationSystem,
    Owner, SystemStatus, SystemType, TechnicalSpec,
};
use crate::services::diagram::{
    DataflowDiagram, DiagramEdge, DiagramMetadata, DiagramNode, EdgeData, NodeData,
};
use crate::services::query::{Pagination, SystemPage};
use crate::services::statistics::{SystemStatistics, TechnologyCount};
use crate::services::validation::{
    BusinessFunctionInput, DataFlowInput, OwnerInput, SystemInput, TechnicalSpecInput,
};
use crate::services::{SystemDetail, SystemHierarchy, SystemRef};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Landscape Registry API",
        description = "Information systems, their owners and the data flows between them"
    ),
    paths(
        health::health_check,
        systems::list_systems,
        systems::search_systems,
        systems::get_system,
        systems::create_system,
        systems::update_system,
        systems::delete_system,
        systems::activate_system,
        systems::deprecate_system,
        systems::system_hierarchy,
        dataflows::list_dataflows,
        dataflows::get_dataflow,
        dataflows::create_dataflow,
        dataflows::update_dataflow,
        dataflows::delete_dataflow,
        statistics::get_statistics,
        diagram::get_dataflow_diagram,
        export::export_excel,
    ),
    components(schemas(
        ErrorBody,
        SystemStatus,
        SystemType,
        CriticalityClass,
        Criticality,
        Frequency,
        Owner,
        TechnicalSpec,
        BusinessFunction,
        InformationSystem,
        DataFlow,
        SystemInput,
        OwnerInput,
        TechnicalSpecInput,
        BusinessFunctionInput,
        DataFlowInput,
        SystemPage,
        Pagination,
        SystemDetail,
        SystemRef,
        SystemHierarchy,
        SystemStatistics,
        TechnologyCount,
        DataflowDiagram,
        DiagramNode,
        NodeData,
        DiagramEdge,
        EdgeData,
        DiagramMetadata,
    )),
    tags((name = "landscape", description = "System registry"))
)]
pub struct ApiDoc;
