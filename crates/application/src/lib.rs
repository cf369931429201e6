//! Application services and ports.

#![forbid(unsafe_code)]

mod access_ports;
mod access_service;
mod endpoint_policy;
mod field_service;
mod field_type_service;
mod form_service;
mod identity_service;
mod schema_ports;
mod submission_service;

#[cfg(test)]
mod test_support;

pub use access_ports::{ApiTokenRepository, AuthorizationRepository};
pub use access_service::AccessService;
pub use endpoint_policy::{ActionPolicy, EndpointPolicies};
pub use field_service::{CreateFieldInput, FieldService, UpdateFieldInput};
pub use field_type_service::{CreateFieldTypeInput, FieldTypeService, UpdateFieldTypeInput};
pub use form_service::{CreateFormInput, FormService, UpdateFormInput};
pub use identity_service::{IdentityService, MIN_API_TOKEN_LENGTH, hash_token};
pub use schema_ports::{
    DEFAULT_PAGE_SIZE, FIELD_TYPE_UNAVAILABLE_MESSAGE, FORM_UNAVAILABLE_MESSAGE, FieldDetail,
    FieldListFilter, FormListFilter, ListQuery, MAX_PAGE_SIZE, Page, SchemaRepository,
    SubmissionListFilter,
};
pub use submission_service::{CreateSubmissionInput, SubmissionService};
