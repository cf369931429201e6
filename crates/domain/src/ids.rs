use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

macro_rules! record_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(i64);

        impl $name {
            /// Wraps a store-assigned identifier.
            #[must_use]
            pub fn new(value: i64) -> Self {
                Self(value)
            }

            /// Returns the raw identifier value.
            #[must_use]
            pub fn as_i64(&self) -> i64 {
                self.0
            }
        }

        impl Display for $name {
            fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
                write!(formatter, "{}", self.0)
            }
        }
    };
}

record_id!(
    /// Identifier of a form.
    FormId
);
record_id!(
    /// Identifier of a field inside a form.
    FieldId
);
record_id!(
    /// Identifier of a field type record.
    FieldTypeId
);
record_id!(
    /// Identifier of a stored submission.
    SubmissionId
);
