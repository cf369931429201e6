use dynaform_domain::Submission;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use ts_rs::TS;

/// Incoming payload for a form submission.
#[derive(Debug, Default, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/create-submission-request.ts"
)]
pub struct CreateSubmissionRequest {
    pub form: Option<i64>,
    #[ts(type = "Record<string, unknown> | null")]
    pub submitted_data: Option<Value>,
}

/// API representation of a stored submission.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/submission-response.ts"
)]
pub struct SubmissionResponse {
    pub id: i64,
    pub form: i64,
    pub form_name: String,
    #[ts(type = "Record<string, unknown>")]
    pub submitted_data: Map<String, Value>,
    pub submitted_at: String,
}

impl From<Submission> for SubmissionResponse {
    fn from(value: Submission) -> Self {
        Self {
            id: value.id().as_i64(),
            form: value.form_id().as_i64(),
            form_name: value.form_name().as_str().to_owned(),
            submitted_data: value.submitted_data().clone(),
            submitted_at: value.submitted_at().to_rfc3339(),
        }
    }
}
