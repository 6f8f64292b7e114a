//! Filtering, ordering and pagination of the system list.
//!
//! Scalar filters are pushed down to the record store; set membership
//! (technology stack, business-function criticality) and free text are
//! evaluated in memory. The final order is always `(created_at, id)` so
//! paging through a stable collection never repeats or skips a record.

use sea_orm::{ColumnTrait, QueryFilter, QueryOrder, Select};
use serde::{Deserialize, Serialize};

#[cfg(feature = "server")]
use utoipa::{IntoParams, ToSchema};

use crate::common::text::{fold_case, non_blank};
use crate::database::entities::systems;
use crate::errors::{FieldErrors, RegistryError, RegistryResult};
use crate::model::{Criticality, CriticalityClass, InformationSystem, SystemStatus, SystemType};

/// Page size bounds applied to every list request.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct QueryLimits {
    pub default_page_size: u64,
    pub max_page_size: u64,
}

impl Default for QueryLimits {
    fn default() -> Self {
        Self {
            default_page_size: 20,
            max_page_size: 100,
        }
    }
}

/// Raw list/search parameters as they arrive on the query string.
#[derive(Clone, Debug, Default, Deserialize)]
#[cfg_attr(feature = "server", derive(IntoParams))]
#[cfg_attr(feature = "server", into_params(parameter_in = Query))]
pub struct SystemQuery {
    pub page: Option<i64>,
    pub page_size: Option<i64>,
    pub status: Option<String>,
    pub system_type: Option<String>,
    pub department: Option<String>,
    pub technology: Option<String>,
    /// Criticality class, e.g. "Mission critical"
    pub criticality: Option<String>,
    /// Criticality of at least one business function (high, medium, low)
    pub function_criticality: Option<String>,
    /// Free text matched against name, code and description
    pub q: Option<String>,
}

impl SystemQuery {
    /// Parse the filter part only; used by the export which is not paginated.
    pub fn to_filter(&self) -> RegistryResult<SystemFilter> {
        let mut errors = FieldErrors::new();
        let filter = self.parse_filter(&mut errors);
        if errors.is_empty() {
            Ok(filter)
        } else {
            Err(RegistryError::Validation(errors))
        }
    }

    pub fn to_filter_and_page(
        &self,
        limits: &QueryLimits,
    ) -> RegistryResult<(SystemFilter, PageRequest)> {
        let mut errors = FieldErrors::new();
        let filter = self.parse_filter(&mut errors);

        let page = self.page.unwrap_or(1);
        if page < 1 {
            errors.insert("page", "Page must be at least 1");
        }
        let page_size = self.page_size.unwrap_or(limits.default_page_size as i64);
        if page_size < 1 {
            errors.insert("page_size", "Page size must be a positive integer");
        }

        if !errors.is_empty() {
            return Err(RegistryError::Validation(errors));
        }

        let page_size = (page_size as u64).min(limits.max_page_size);
        Ok((
            filter,
            PageRequest {
                page: page as u64,
                page_size,
            },
        ))
    }

    fn parse_filter(&self, errors: &mut FieldErrors) -> SystemFilter {
        let mut filter = SystemFilter::default();

        if let Some(raw) = non_blank(self.status.as_deref()) {
            match raw.parse::<SystemStatus>() {
                Ok(status) => filter.status = Some(status),
                Err(message) => errors.insert("status", message),
            }
        }
        if let Some(raw) = non_blank(self.system_type.as_deref()) {
            match raw.parse::<SystemType>() {
                Ok(system_type) => filter.system_type = Some(system_type),
                Err(message) => errors.insert("system_type", message),
            }
        }
        if let Some(raw) = non_blank(self.criticality.as_deref()) {
            match raw.parse::<CriticalityClass>() {
                Ok(class) => filter.criticality_class = Some(class),
                Err(message) => errors.insert("criticality", message),
            }
        }
        if let Some(raw) = non_blank(self.function_criticality.as_deref()) {
            match raw.parse::<Criticality>() {
                Ok(criticality) => filter.function_criticality = Some(criticality),
                Err(message) => errors.insert("function_criticality", message),
            }
        }
        filter.department = non_blank(self.department.as_deref()).map(|d| fold_case(&d));
        filter.technology = non_blank(self.technology.as_deref()).map(|t| fold_case(&t));
        filter.text = non_blank(self.q.as_deref()).map(|q| fold_case(&q));

        filter
    }
}

/// Parsed filter set; every present criterion must hold (logical AND).
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SystemFilter {
    pub status: Option<SystemStatus>,
    pub system_type: Option<SystemType>,
    pub department: Option<String>,
    pub technology: Option<String>,
    pub criticality_class: Option<CriticalityClass>,
    pub function_criticality: Option<Criticality>,
    /// Search text folded with `fold_case`
    pub text: Option<String>,
}

impl SystemFilter {
    pub fn matches(&self, system: &InformationSystem) -> bool {
        if self.status.is_some_and(|status| system.status != status) {
            return false;
        }
        if self
            .system_type
            .is_some_and(|system_type| system.system_type != system_type)
        {
            return false;
        }
        if self
            .criticality_class
            .is_some_and(|class| system.criticality_class != class)
        {
            return false;
        }
        if let Some(department) = &self.department {
            if !system.in_department(department) {
                return false;
            }
        }
        if let Some(technology) = &self.technology {
            if !system.uses_technology(technology) {
                return false;
            }
        }
        if let Some(criticality) = self.function_criticality {
            if !system
                .business_functions
                .iter()
                .any(|function| function.criticality == criticality)
            {
                return false;
            }
        }
        if let Some(text) = &self.text {
            if !system.matches_text(text) {
                return false;
            }
        }
        true
    }

    /// True when `apply_to` alone selects exactly the matching rows.
    pub fn is_store_only(&self) -> bool {
        self.department.is_none()
            && self.technology.is_none()
            && self.function_criticality.is_none()
            && self.text.is_none()
    }

    /// Push the exact-match criteria down to the record store.
    pub fn apply_to(&self, select: Select<systems::Entity>) -> Select<systems::Entity> {
        let mut select = select;
        if let Some(status) = self.status {
            select = select.filter(systems::Column::Status.eq(status.as_str()));
        }
        if let Some(system_type) = self.system_type {
            select = select.filter(systems::Column::SystemType.eq(system_type.as_str()));
        }
        if let Some(class) = self.criticality_class {
            select = select.filter(systems::Column::CriticalityClass.eq(class.as_str()));
        }
        select
            .order_by_asc(systems::Column::CreatedAt)
            .order_by_asc(systems::Column::Id)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u64,
    pub page_size: u64,
}

impl PageRequest {
    pub fn offset(&self) -> u64 {
        (self.page - 1).saturating_mul(self.page_size)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "server", derive(ToSchema))]
pub struct Pagination {
    pub page: u64,
    pub page_size: u64,
    pub total_pages: u64,
    pub total_count: u64,
}

impl Pagination {
    pub fn new(request: PageRequest, total_count: u64) -> Self {
        Self {
            page: request.page,
            page_size: request.page_size,
            total_pages: total_pages(total_count, request.page_size),
            total_count,
        }
    }
}

/// One page of systems plus the pagination envelope.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[cfg_attr(feature = "server", derive(ToSchema))]
pub struct SystemPage {
    pub systems: Vec<InformationSystem>,
    pub pagination: Pagination,
}

pub fn total_pages(total_count: u64, page_size: u64) -> u64 {
    if page_size == 0 {
        return 0;
    }
    total_count.div_ceil(page_size)
}

/// Stable listing order: oldest first, ties broken by id.
pub fn sort_for_listing(systems: &mut [InformationSystem]) {
    systems.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
}

/// Filter, order and cut one page out of `systems`.
pub fn paginate(
    systems: Vec<InformationSystem>,
    filter: &SystemFilter,
    request: PageRequest,
) -> SystemPage {
    let mut matching: Vec<InformationSystem> =
        systems.into_iter().filter(|s| filter.matches(s)).collect();
    sort_for_listing(&mut matching);

    let total_count = matching.len() as u64;
    let start = request.offset().min(total_count) as usize;
    let systems: Vec<InformationSystem> = matching
        .into_iter()
        .skip(start)
        .take(request.page_size as usize)
        .collect();

    SystemPage {
        systems,
        pagination: Pagination::new(request, total_count),
    }
}
