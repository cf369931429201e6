use std::collections::BTreeMap;

use dynaform_core::{AppError, AppResult};
use dynaform_domain::{CrudAction, Permission, Resource, Surface};

/// Configuration of one (surface, resource, action) endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActionPolicy {
    /// Whether the endpoint accepts requests at all.
    pub enabled: bool,
    /// Permission required on top of the surface gate.
    pub extra_permission: Option<Permission>,
}

impl ActionPolicy {
    const ENABLED: Self = Self {
        enabled: true,
        extra_permission: None,
    };
}

type PolicyKey = (Surface, Resource, CrudAction);

/// Per-endpoint enablement and permission table, built once at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndpointPolicies {
    policies: BTreeMap<PolicyKey, ActionPolicy>,
}

impl EndpointPolicies {
    /// Returns whether the endpoint exists at all.
    ///
    /// Submissions are append-only: update and delete are unsupported on
    /// both surfaces.
    #[must_use]
    pub fn is_supported(surface: Surface, resource: Resource, action: CrudAction) -> bool {
        match (surface, resource) {
            (Surface::Admin, Resource::Submission) => {
                matches!(action, CrudAction::List | CrudAction::Retrieve)
            }
            (Surface::Admin, _) => true,
            (Surface::Public, Resource::Submission) => action == CrudAction::Create,
            (Surface::Public, _) => matches!(action, CrudAction::List | CrudAction::Retrieve),
        }
    }

    /// Returns the table with every supported endpoint enabled.
    #[must_use]
    pub fn defaults() -> Self {
        let mut policies = BTreeMap::new();
        for surface in Surface::all() {
            for resource in Resource::all() {
                for action in CrudAction::all() {
                    if Self::is_supported(*surface, *resource, *action) {
                        policies.insert((*surface, *resource, *action), ActionPolicy::ENABLED);
                    }
                }
            }
        }

        Self { policies }
    }

    /// Returns the policy of a supported endpoint.
    #[must_use]
    pub fn policy(
        &self,
        surface: Surface,
        resource: Resource,
        action: CrudAction,
    ) -> Option<ActionPolicy> {
        self.policies.get(&(surface, resource, action)).copied()
    }

    /// Enables or disables an endpoint.
    pub fn set_enabled(
        &mut self,
        surface: Surface,
        resource: Resource,
        action: CrudAction,
        enabled: bool,
    ) -> AppResult<()> {
        match self.policies.get_mut(&(surface, resource, action)) {
            Some(policy) => {
                policy.enabled = enabled;
                Ok(())
            }
            None if !enabled => Ok(()),
            None => Err(unsupported(surface, resource, action)),
        }
    }

    /// Sets or clears the extra permission of an endpoint.
    pub fn set_extra_permission(
        &mut self,
        surface: Surface,
        resource: Resource,
        action: CrudAction,
        extra_permission: Option<Permission>,
    ) -> AppResult<()> {
        let policy = self
            .policies
            .get_mut(&(surface, resource, action))
            .ok_or_else(|| unsupported(surface, resource, action))?;
        policy.extra_permission = extra_permission;
        Ok(())
    }

    /// Builder form of [`Self::set_enabled`].
    pub fn with_enabled(
        mut self,
        surface: Surface,
        resource: Resource,
        action: CrudAction,
        enabled: bool,
    ) -> AppResult<Self> {
        self.set_enabled(surface, resource, action, enabled)?;
        Ok(self)
    }

    /// Builder form of [`Self::set_extra_permission`].
    pub fn with_extra_permission(
        mut self,
        surface: Surface,
        resource: Resource,
        action: CrudAction,
        permission: Permission,
    ) -> AppResult<Self> {
        self.set_extra_permission(surface, resource, action, Some(permission))?;
        Ok(self)
    }
}

impl Default for EndpointPolicies {
    fn default() -> Self {
        Self::defaults()
    }
}

fn unsupported(surface: Surface, resource: Resource, action: CrudAction) -> AppError {
    AppError::Validation(format!(
        "{} {} is not supported on the {} surface",
        resource.as_str(),
        action.as_str(),
        surface.as_str()
    ))
}

#[cfg(test)]
mod tests {
    use dynaform_domain::{CrudAction, Permission, Resource, Surface};

    use super::EndpointPolicies;

    #[test]
    fn defaults_enable_every_supported_endpoint() {
        let policies = EndpointPolicies::defaults();

        for action in CrudAction::all() {
            let policy = policies.policy(Surface::Admin, Resource::Field, *action);
            assert!(policy.is_some_and(|policy| policy.enabled));
        }

        assert!(policies
            .policy(Surface::Public, Resource::Submission, CrudAction::Create)
            .is_some());
        assert!(policies
            .policy(Surface::Public, Resource::Form, CrudAction::Create)
            .is_none());
    }

    #[test]
    fn submissions_cannot_be_made_mutable() {
        let mut policies = EndpointPolicies::defaults();

        for action in [CrudAction::Update, CrudAction::Delete] {
            assert!(policies
                .set_enabled(Surface::Admin, Resource::Submission, action, true)
                .is_err());
            assert!(policies
                .set_enabled(Surface::Admin, Resource::Submission, action, false)
                .is_ok());
            assert!(policies
                .policy(Surface::Admin, Resource::Submission, action)
                .is_none());
        }
    }

    #[test]
    fn extra_permission_is_recorded() {
        let policies = EndpointPolicies::defaults()
            .with_extra_permission(
                Surface::Admin,
                Resource::Submission,
                CrudAction::List,
                Permission::SubmissionsRead,
            )
            .unwrap_or_else(|_| unreachable!());

        assert_eq!(
            policies
                .policy(Surface::Admin, Resource::Submission, CrudAction::List)
                .and_then(|policy| policy.extra_permission),
            Some(Permission::SubmissionsRead)
        );
        assert!(EndpointPolicies::defaults()
            .with_extra_permission(
                Surface::Public,
                Resource::Field,
                CrudAction::Delete,
                Permission::FieldsManage,
            )
            .is_err());
    }
}
