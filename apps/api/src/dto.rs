mod common;
mod field_types;
mod fields;
mod forms;
mod submissions;

pub use common::{
    FieldListParams, FormListParams, HealthDependencyStatus, HealthResponse, PageParams,
    PageResponse, SubmissionListParams,
};
pub use field_types::{CreateFieldTypeRequest, FieldTypeResponse, UpdateFieldTypeRequest};
pub use fields::{CreateFieldRequest, FieldResponse, UpdateFieldRequest};
pub use forms::{CreateFormRequest, FormResponse, UpdateFormRequest};
pub use submissions::{CreateSubmissionRequest, SubmissionResponse};
