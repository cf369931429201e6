use dynaform_core::FieldErrors;
use serde_json::Value;

use crate::{FormSchema, SubmissionDraft};

/// Message reported for a required field missing from the payload.
pub const REQUIRED_MESSAGE: &str = "This field is required.";

/// Key used when the payload itself has the wrong shape.
pub const SUBMITTED_DATA_KEY: &str = "submitted_data";

impl FormSchema {
    /// Checks a submission payload against the form's fields.
    ///
    /// Every field is visited in declaration order and all problems are
    /// collected. Keys that do not name a field are kept as submitted.
    pub fn validate_submission(&self, payload: Value) -> Result<SubmissionDraft, FieldErrors> {
        let object = match payload {
            Value::Object(object) => object,
            other => {
                return Err(FieldErrors::single(
                    SUBMITTED_DATA_KEY,
                    format!(
                        "Expected a dictionary of items but got type \"{}\".",
                        json_type_name(&other)
                    ),
                ));
            }
        };

        let mut errors = FieldErrors::new();
        for field in self.fields() {
            let field_name = field.name().as_str();
            match object.get(field_name) {
                None if field.is_required() => errors.push(field_name, REQUIRED_MESSAGE),
                None => {}
                Some(value) => {
                    if let Some(message) = field.value_error(value) {
                        errors.push(field_name, message);
                    }
                }
            }
        }

        if !errors.is_empty() {
            return Err(errors);
        }

        Ok(SubmissionDraft::new(
            self.form().id(),
            self.form().name().clone(),
            object,
        ))
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "str",
        Value::Array(_) => "list",
        Value::Object(_) => "dict",
    }
}
