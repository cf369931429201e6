use serde::{Deserialize, Serialize};

/// Subject used for callers that presented no credentials.
pub const ANONYMOUS_SUBJECT: &str = "anonymous";

/// Caller identity resolved for a single request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserIdentity {
    subject: String,
    display_name: String,
    is_admin: bool,
    is_authenticated: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    credential_error: Option<String>,
}

impl UserIdentity {
    /// Creates an authenticated identity.
    #[must_use]
    pub fn new(subject: impl Into<String>, display_name: impl Into<String>, is_admin: bool) -> Self {
        Self {
            subject: subject.into(),
            display_name: display_name.into(),
            is_admin,
            is_authenticated: true,
            credential_error: None,
        }
    }

    /// Creates the identity used for requests without credentials.
    #[must_use]
    pub fn anonymous() -> Self {
        Self {
            subject: ANONYMOUS_SUBJECT.to_owned(),
            display_name: "Anonymous".to_owned(),
            is_admin: false,
            is_authenticated: false,
            credential_error: None,
        }
    }

    /// Creates the identity for a request whose credentials could not be
    /// verified. It carries no privileges; the rejection is raised once the
    /// endpoint is known to be enabled.
    #[must_use]
    pub fn rejected(reason: impl Into<String>) -> Self {
        Self {
            credential_error: Some(reason.into()),
            ..Self::anonymous()
        }
    }

    /// Returns the stable subject identifier.
    #[must_use]
    pub fn subject(&self) -> &str {
        self.subject.as_str()
    }

    /// Returns the display name for the caller.
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.display_name.as_str()
    }

    /// Returns whether the caller holds the admin flag.
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.is_admin
    }

    /// Returns whether the caller presented valid credentials.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.is_authenticated
    }

    /// Returns why presented credentials were rejected, if they were.
    #[must_use]
    pub fn credential_error(&self) -> Option<&str> {
        self.credential_error.as_deref()
    }
}
