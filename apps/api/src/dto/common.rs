use dynaform_application::{ListQuery, Page};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Health response payload.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/health-response.ts"
)]
pub struct HealthResponse {
    pub status: &'static str,
    pub ready: bool,
    pub postgres: HealthDependencyStatus,
}

/// One runtime dependency health status.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/health-dependency-status.ts"
)]
pub struct HealthDependencyStatus {
    pub status: &'static str,
    pub detail: Option<String>,
}

/// Paginated list envelope.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/page-response.ts"
)]
pub struct PageResponse<T: TS> {
    /// Rows matching the filter before pagination.
    #[ts(type = "number")]
    pub count: u64,
    pub results: Vec<T>,
}

impl<T: TS> PageResponse<T> {
    /// Converts an application page into the transport envelope.
    pub fn from_page<S>(page: Page<S>, convert: impl FnMut(S) -> T) -> Self {
        let page = page.map(convert);
        Self {
            count: page.count,
            results: page.items,
        }
    }
}

/// Query string for unfiltered listing.
#[derive(Debug, Default, Deserialize)]
pub struct PageParams {
    pub limit: Option<usize>,
    pub offset: Option<usize>,
}

impl PageParams {
    pub fn list_query(&self) -> ListQuery {
        ListQuery::new(self.limit, self.offset)
    }
}

/// Query string for form listing.
#[derive(Debug, Default, Deserialize)]
pub struct FormListParams {
    pub limit: Option<usize>,
    pub offset: Option<usize>,
    pub search: Option<String>,
    pub is_active: Option<bool>,
}

impl FormListParams {
    pub fn list_query(&self) -> ListQuery {
        ListQuery::new(self.limit, self.offset)
    }
}

/// Query string for field listing.
#[derive(Debug, Default, Deserialize)]
pub struct FieldListParams {
    pub limit: Option<usize>,
    pub offset: Option<usize>,
    pub form_id: Option<i64>,
}

impl FieldListParams {
    pub fn list_query(&self) -> ListQuery {
        ListQuery::new(self.limit, self.offset)
    }
}

/// Query string for submission listing.
#[derive(Debug, Default, Deserialize)]
pub struct SubmissionListParams {
    pub limit: Option<usize>,
    pub offset: Option<usize>,
    pub form_id: Option<i64>,
}

impl SubmissionListParams {
    pub fn list_query(&self) -> ListQuery {
        ListQuery::new(self.limit, self.offset)
    }
}
