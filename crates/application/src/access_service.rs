use std::sync::Arc;

use dynaform_core::{AppError, AppResult, UserIdentity};
use dynaform_domain::{CrudAction, Permission, Resource, Surface};

use crate::access_ports::AuthorizationRepository;
use crate::endpoint_policy::EndpointPolicies;

/// Application service enforcing endpoint enablement, the admin gate and
/// per-endpoint permission grants.
#[derive(Clone)]
pub struct AccessService {
    policies: Arc<EndpointPolicies>,
    repository: Arc<dyn AuthorizationRepository>,
}

impl AccessService {
    /// Creates a new access service.
    #[must_use]
    pub fn new(
        policies: Arc<EndpointPolicies>,
        repository: Arc<dyn AuthorizationRepository>,
    ) -> Self {
        Self {
            policies,
            repository,
        }
    }

    /// Ensures the actor may perform the action on the surface.
    ///
    /// Checks run in a fixed order: a disabled or unsupported endpoint fails
    /// with `MethodNotAllowed` before any identity check, then rejected
    /// credentials fail with `Unauthorized` on either surface, then the admin
    /// surface rejects anonymous and non-admin callers, then the endpoint's
    /// extra permission is looked up. Admin callers are not exempt from it.
    pub async fn require_action(
        &self,
        actor: &UserIdentity,
        surface: Surface,
        resource: Resource,
        action: CrudAction,
    ) -> AppResult<()> {
        let policy = self
            .policies
            .policy(surface, resource, action)
            .filter(|policy| policy.enabled)
            .ok_or_else(|| {
                AppError::MethodNotAllowed(format!(
                    "method '{action}' is disabled for {} on the {} surface",
                    resource.as_str(),
                    surface.as_str()
                ))
            })?;

        if let Some(reason) = actor.credential_error() {
            return Err(AppError::Unauthorized(reason.to_owned()));
        }

        if surface == Surface::Admin {
            if !actor.is_authenticated() {
                return Err(AppError::Unauthorized(
                    "authentication credentials were not provided".to_owned(),
                ));
            }

            if !actor.is_admin() {
                return Err(AppError::Forbidden(format!(
                    "subject '{}' is not an administrator",
                    actor.subject()
                )));
            }
        }

        if let Some(permission) = policy.extra_permission {
            self.require_permission(actor, permission).await?;
        }

        Ok(())
    }

    /// Ensures the actor holds a permission grant.
    pub async fn require_permission(
        &self,
        actor: &UserIdentity,
        permission: Permission,
    ) -> AppResult<()> {
        if !actor.is_authenticated() {
            return Err(AppError::Forbidden(format!(
                "permission '{}' requires an authenticated caller",
                permission.as_str()
            )));
        }

        let permissions = self
            .repository
            .list_permissions_for_subject(actor.subject())
            .await?;

        if permissions.iter().any(|value| value == &permission) {
            return Ok(());
        }

        Err(AppError::Forbidden(format!(
            "subject '{}' is missing permission '{}'",
            actor.subject(),
            permission.as_str()
        )))
    }
}

#[cfg(test)]
mod tests;
