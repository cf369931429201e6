use chrono::{DateTime, Utc};
use dynaform_core::{AppError, AppResult, NonEmptyString};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::{FormId, SubmissionId};

/// Submission payload accepted by the validator and ready to be stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionDraft {
    form_id: FormId,
    form_name: NonEmptyString,
    submitted_data: Map<String, Value>,
}

impl SubmissionDraft {
    pub(crate) fn new(
        form_id: FormId,
        form_name: NonEmptyString,
        submitted_data: Map<String, Value>,
    ) -> Self {
        Self {
            form_id,
            form_name,
            submitted_data,
        }
    }

    /// Returns the form the payload was validated against.
    #[must_use]
    pub fn form_id(&self) -> FormId {
        self.form_id
    }

    /// Returns the form name at validation time.
    #[must_use]
    pub fn form_name(&self) -> &NonEmptyString {
        &self.form_name
    }

    /// Returns the validated payload.
    #[must_use]
    pub fn submitted_data(&self) -> &Map<String, Value> {
        &self.submitted_data
    }
}

/// Immutable stored submission.
///
/// Keeps the form id and name it was submitted against even after the form
/// is deleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Submission {
    id: SubmissionId,
    form_id: FormId,
    form_name: NonEmptyString,
    submitted_data: Map<String, Value>,
    submitted_at: DateTime<Utc>,
}

impl Submission {
    /// Attaches store-assigned identity and timestamp to a validated draft.
    #[must_use]
    pub fn from_draft(id: SubmissionId, draft: SubmissionDraft, submitted_at: DateTime<Utc>) -> Self {
        Self {
            id,
            form_id: draft.form_id,
            form_name: draft.form_name,
            submitted_data: draft.submitted_data,
            submitted_at,
        }
    }

    /// Rebuilds a stored submission, requiring an object payload.
    pub fn new(
        id: SubmissionId,
        form_id: FormId,
        form_name: impl Into<String>,
        submitted_data: Value,
        submitted_at: DateTime<Utc>,
    ) -> AppResult<Self> {
        let Value::Object(submitted_data) = submitted_data else {
            return Err(AppError::Validation(
                "submission data must be a JSON object".to_owned(),
            ));
        };

        Ok(Self {
            id,
            form_id,
            form_name: NonEmptyString::new(form_name)?,
            submitted_data,
            submitted_at,
        })
    }

    /// Returns the identifier.
    #[must_use]
    pub fn id(&self) -> SubmissionId {
        self.id
    }

    /// Returns the referenced form.
    #[must_use]
    pub fn form_id(&self) -> FormId {
        self.form_id
    }

    /// Returns the form name captured at submission time.
    #[must_use]
    pub fn form_name(&self) -> &NonEmptyString {
        &self.form_name
    }

    /// Returns the frozen payload.
    #[must_use]
    pub fn submitted_data(&self) -> &Map<String, Value> {
        &self.submitted_data
    }

    /// Returns the submission timestamp.
    #[must_use]
    pub fn submitted_at(&self) -> DateTime<Utc> {
        self.submitted_at
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use serde_json::json;

    use super::Submission;
    use crate::{FormId, SubmissionId};

    #[test]
    fn stored_submission_requires_object_payload() {
        let result = Submission::new(
            SubmissionId::new(1),
            FormId::new(1),
            "Contact",
            json!(["a"]),
            Utc::now(),
        );
        assert!(result.is_err());
    }
}
