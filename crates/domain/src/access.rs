use std::fmt::{Display, Formatter};
use std::str::FromStr;

use dynaform_core::AppError;
use serde::{Deserialize, Serialize};

/// API surface a request arrives on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Surface {
    /// Full-control surface restricted to admin callers.
    Admin,
    /// Restricted surface used by people filling out forms.
    Public,
}

impl Surface {
    /// Returns all surfaces.
    #[must_use]
    pub fn all() -> &'static [Self] {
        &[Self::Admin, Self::Public]
    }

    /// Returns a stable configuration value.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Public => "public",
        }
    }
}

/// Record kinds exposed over the API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Resource {
    /// Form records.
    Form,
    /// Field records.
    Field,
    /// Field type records.
    FieldType,
    /// Submission records.
    Submission,
}

impl Resource {
    /// Returns all resources.
    #[must_use]
    pub fn all() -> &'static [Self] {
        &[Self::Form, Self::Field, Self::FieldType, Self::Submission]
    }

    /// Returns a stable configuration value.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Form => "form",
            Self::Field => "field",
            Self::FieldType => "field_type",
            Self::Submission => "submission",
        }
    }
}

/// CRUD operation requested on a resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CrudAction {
    /// Paginated collection read.
    List,
    /// Single record read.
    Retrieve,
    /// Record creation.
    Create,
    /// Partial record update.
    Update,
    /// Record deletion.
    Delete,
}

impl CrudAction {
    /// Returns all actions.
    #[must_use]
    pub fn all() -> &'static [Self] {
        &[
            Self::List,
            Self::Retrieve,
            Self::Create,
            Self::Update,
            Self::Delete,
        ]
    }

    /// Returns a stable configuration value.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::List => "list",
            Self::Retrieve => "retrieve",
            Self::Create => "create",
            Self::Update => "update",
            Self::Delete => "delete",
        }
    }
}

impl Display for CrudAction {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// Grants that can be required on top of the surface gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Permission {
    /// Allows managing forms.
    FormsManage,
    /// Allows managing fields.
    FieldsManage,
    /// Allows managing field types.
    FieldTypesManage,
    /// Allows reading submissions.
    SubmissionsRead,
    /// Allows submitting forms.
    SubmissionsCreate,
}

impl Permission {
    /// Returns a stable storage value for this permission.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::FormsManage => "forms.manage",
            Self::FieldsManage => "fields.manage",
            Self::FieldTypesManage => "field_types.manage",
            Self::SubmissionsRead => "submissions.read",
            Self::SubmissionsCreate => "submissions.create",
        }
    }

    /// Returns all known permissions.
    #[must_use]
    pub fn all() -> &'static [Self] {
        const ALL: &[Permission] = &[
            Permission::FormsManage,
            Permission::FieldsManage,
            Permission::FieldTypesManage,
            Permission::SubmissionsRead,
            Permission::SubmissionsCreate,
        ];

        ALL
    }
}

impl FromStr for Permission {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "forms.manage" => Ok(Self::FormsManage),
            "fields.manage" => Ok(Self::FieldsManage),
            "field_types.manage" => Ok(Self::FieldTypesManage),
            "submissions.read" => Ok(Self::SubmissionsRead),
            "submissions.create" => Ok(Self::SubmissionsCreate),
            _ => Err(AppError::Validation(format!(
                "unknown permission value '{value}'"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::Permission;

    #[test]
    fn permission_roundtrip_storage_value() {
        for permission in Permission::all() {
            let restored = Permission::from_str(permission.as_str());
            assert!(restored.is_ok());
            assert_eq!(restored.unwrap_or(Permission::FormsManage), *permission);
        }
    }

    #[test]
    fn unknown_permission_is_rejected() {
        assert!(Permission::from_str("forms.delete_everything").is_err());
    }
}
