use std::collections::HashMap;

use chrono::{DateTime, Utc};
use rust_xlsxwriter::{Color, Format, FormatBorder, Workbook};
use sea_orm::DatabaseConnection;
use uuid::Uuid;

use crate::errors::{RegistryError, RegistryResult};
use crate::model::{DataFlow, InformationSystem};
use crate::services::query::SystemFilter;
use crate::services::{DataFlowService, SystemService};

pub const SHEET_NAME: &str = "Information Systems";
pub const XLSX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

const HEADER_FILL: u32 = 0x366092;
const MAX_COLUMN_WIDTH: usize = 50;

pub const HEADERS: [&str; 28] = [
    "ID",
    "Name",
    "Code",
    "Description",
    "Purpose",
    "Status",
    "System Type",
    "Owner Name",
    "Owner Email",
    "Owner Department",
    "Owner Phone",
    "Technology Stack",
    "Programming Languages",
    "Databases",
    "Frameworks",
    "Deployment Model",
    "Hosting Provider",
    "Business Functions",
    "Business Value",
    "Cost Center",
    "Version",
    "Parent System ID",
    "Dependent Systems",
    "Criticality Class",
    "Created At",
    "Updated At",
    "Dataflows Count",
    "Dataflows Details",
];

/// Generated workbook plus the file name to offer it under.
#[derive(Debug, Clone)]
pub struct SpreadsheetExport {
    pub filename: String,
    pub bytes: Vec<u8>,
    pub rows: usize,
}

pub struct ExportService {
    db: DatabaseConnection,
    max_rows: usize,
}

impl ExportService {
    pub fn new(db: DatabaseConnection, max_rows: usize) -> Self {
        Self { db, max_rows }
    }

    /// Export every system matching `filter`, in listing order.
    pub async fn export_systems(&self, filter: &SystemFilter) -> RegistryResult<SpreadsheetExport> {
        let service = SystemService::new(self.db.clone());
        let limit = self.max_rows as u64;

        // Count first, oversized exports are never loaded
        let matching = service.count_matching(filter, limit + 1).await?;
        if matching > limit {
            return Err(self.too_many_rows());
        }

        let systems = service.load_filtered(filter).await?;
        if systems.len() > self.max_rows {
            return Err(self.too_many_rows());
        }

        let flows = DataFlowService::new(self.db.clone()).load_all().await?;
        let bytes = render_workbook(&systems, &flows)?;
        tracing::info!(
            "Exported {} systems to XLSX ({} bytes)",
            systems.len(),
            bytes.len()
        );

        Ok(SpreadsheetExport {
            filename: export_filename(Utc::now()),
            rows: systems.len(),
            bytes,
        })
    }

    fn too_many_rows(&self) -> RegistryError {
        tracing::warn!("Refusing export of more than {} systems", self.max_rows);
        RegistryError::validation(
            "filters",
            format!(
                "Export would contain more than {} systems; narrow the filters",
                self.max_rows
            ),
        )
    }
}

pub fn export_filename(now: DateTime<Utc>) -> String {
    format!(
        "information_systems_export_{}.xlsx",
        now.format("%Y%m%d_%H%M%S")
    )
}

fn join(values: &[String]) -> String {
    values.join(", ")
}

/// One row of cell values, aligned with [`HEADERS`].
fn system_row(
    system: &InformationSystem,
    flows: &[&DataFlow],
    codes: &HashMap<Uuid, &str>,
) -> Vec<String> {
    let spec = &system.technical_spec;
    let functions = system
        .business_functions
        .iter()
        .map(|function| format!("{}: {}", function.name, function.description))
        .collect::<Vec<_>>()
        .join("; ");
    let endpoint = |id: &Uuid| {
        codes
            .get(id)
            .map(|code| code.to_string())
            .unwrap_or_else(|| id.to_string())
    };
    let details = flows
        .iter()
        .map(|flow| {
            format!(
                "{}→{}: {}",
                endpoint(&flow.source_system_id),
                endpoint(&flow.target_system_id),
                flow.label()
            )
        })
        .collect::<Vec<_>>()
        .join("; ");

    vec![
        system.id.to_string(),
        system.name.clone(),
        system.code.clone(),
        system.description.clone(),
        system.purpose.clone(),
        system.status.to_string(),
        system.system_type.to_string(),
        system.owner.name.clone(),
        system.owner.email.clone(),
        system.owner.department.clone(),
        system.owner.phone.clone().unwrap_or_default(),
        join(&spec.technology_stack),
        join(&spec.programming_languages),
        join(&spec.databases),
        join(&spec.frameworks),
        spec.deployment_model.clone(),
        spec.hosting_provider.clone().unwrap_or_default(),
        functions,
        system.business_value.clone(),
        system.cost_center.clone().unwrap_or_default(),
        system.version.clone(),
        system
            .parent_system_id
            .map(|id| id.to_string())
            .unwrap_or_default(),
        system
            .dependent_systems
            .iter()
            .map(Uuid::to_string)
            .collect::<Vec<_>>()
            .join(", "),
        system.criticality_class.to_string(),
        system.created_at.to_rfc3339(),
        system.updated_at.to_rfc3339(),
        flows.len().to_string(),
        details,
    ]
}

/// Encode `systems` as a single-sheet workbook. `flows` may contain flows
/// for systems outside the selection; only those touching a row are listed.
pub fn render_workbook(systems: &[InformationSystem], flows: &[DataFlow]) -> RegistryResult<Vec<u8>> {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet.set_name(SHEET_NAME)?;

    let header_format = Format::new()
        .set_bold()
        .set_font_color(Color::White)
        .set_background_color(Color::RGB(HEADER_FILL))
        .set_border(FormatBorder::Thin);

    let mut widths: Vec<usize> = HEADERS.iter().map(|h| h.chars().count()).collect();
    for (col, header) in HEADERS.iter().enumerate() {
        worksheet.write_string_with_format(0, col as u16, *header, &header_format)?;
    }

    let codes: HashMap<Uuid, &str> = systems.iter().map(|s| (s.id, s.code.as_str())).collect();
    let count_col = HEADERS.len() - 2;

    for (idx, system) in systems.iter().enumerate() {
        let row = (idx + 1) as u32;
        let touching: Vec<&DataFlow> = flows.iter().filter(|f| f.touches(system.id)).collect();
        let cells = system_row(system, &touching, &codes);

        for (col, value) in cells.iter().enumerate() {
            if col == count_col {
                worksheet.write_number(row, col as u16, touching.len() as f64)?;
            } else {
                worksheet.write_string(row, col as u16, value)?;
            }
            widths[col] = widths[col].max(value.chars().count());
        }
    }

    for (col, width) in widths.iter().enumerate() {
        let width = (*width + 2).min(MAX_COLUMN_WIDTH);
        worksheet.set_column_width(col as u16, width as f64)?;
    }
    worksheet.set_freeze_panes(1, 0)?;

    Ok(workbook.save_to_buffer()?)
}
