use std::collections::HashMap;
use std::sync::Arc;

use dynaform_core::{AppError, UserIdentity};
use dynaform_domain::{CrudAction, Permission, Resource, Surface};

use crate::endpoint_policy::EndpointPolicies;
use crate::test_support::{FakeAuthorizationRepository, admin, member};

use super::AccessService;

fn service(policies: EndpointPolicies, grants: HashMap<String, Vec<Permission>>) -> AccessService {
    AccessService::new(
        Arc::new(policies),
        Arc::new(FakeAuthorizationRepository { grants }),
    )
}

#[tokio::test]
async fn admin_surface_rejects_anonymous_then_non_admin_callers() {
    let service = service(EndpointPolicies::defaults(), HashMap::new());

    let anonymous = service
        .require_action(
            &UserIdentity::anonymous(),
            Surface::Admin,
            Resource::Form,
            CrudAction::List,
        )
        .await;
    assert!(matches!(anonymous, Err(AppError::Unauthorized(_))));

    let non_admin = service
        .require_action(&member(), Surface::Admin, Resource::Form, CrudAction::List)
        .await;
    assert!(matches!(non_admin, Err(AppError::Forbidden(_))));

    let allowed = service
        .require_action(&admin(), Surface::Admin, Resource::Form, CrudAction::List)
        .await;
    assert!(allowed.is_ok());
}

#[tokio::test]
async fn disabled_endpoint_fails_before_identity_checks() {
    let policies = EndpointPolicies::defaults()
        .with_enabled(Surface::Admin, Resource::Field, CrudAction::Delete, false)
        .unwrap_or_else(|_| unreachable!());
    let service = service(policies, HashMap::new());

    let result = service
        .require_action(
            &UserIdentity::anonymous(),
            Surface::Admin,
            Resource::Field,
            CrudAction::Delete,
        )
        .await;
    assert!(matches!(result, Err(AppError::MethodNotAllowed(_))));
}

#[tokio::test]
async fn rejected_credentials_fail_only_on_enabled_endpoints() {
    let policies = EndpointPolicies::defaults()
        .with_enabled(Surface::Admin, Resource::Field, CrudAction::List, false)
        .unwrap_or_else(|_| unreachable!());
    let service = service(policies, HashMap::new());
    let rejected = UserIdentity::rejected("invalid API token");

    let disabled = service
        .require_action(&rejected, Surface::Admin, Resource::Field, CrudAction::List)
        .await;
    assert!(matches!(disabled, Err(AppError::MethodNotAllowed(_))));

    let public = service
        .require_action(&rejected, Surface::Public, Resource::Form, CrudAction::List)
        .await;
    assert!(matches!(public, Err(AppError::Unauthorized(_))));
}

#[tokio::test]
async fn unsupported_endpoint_is_method_not_allowed() {
    let service = service(EndpointPolicies::defaults(), HashMap::new());

    let result = service
        .require_action(
            &admin(),
            Surface::Admin,
            Resource::Submission,
            CrudAction::Delete,
        )
        .await;
    assert!(matches!(result, Err(AppError::MethodNotAllowed(_))));

    let result = service
        .require_action(
            &UserIdentity::anonymous(),
            Surface::Public,
            Resource::Form,
            CrudAction::Create,
        )
        .await;
    assert!(matches!(result, Err(AppError::MethodNotAllowed(_))));
}

#[tokio::test]
async fn public_surface_allows_anonymous_callers() {
    let service = service(EndpointPolicies::defaults(), HashMap::new());

    let result = service
        .require_action(
            &UserIdentity::anonymous(),
            Surface::Public,
            Resource::Submission,
            CrudAction::Create,
        )
        .await;
    assert!(result.is_ok());
}

#[tokio::test]
async fn extra_permission_applies_to_admins_too() {
    let policies = EndpointPolicies::defaults()
        .with_extra_permission(
            Surface::Admin,
            Resource::Submission,
            CrudAction::List,
            Permission::SubmissionsRead,
        )
        .unwrap_or_else(|_| unreachable!());
    let denied = service(policies.clone(), HashMap::new());

    let result = denied
        .require_action(
            &admin(),
            Surface::Admin,
            Resource::Submission,
            CrudAction::List,
        )
        .await;
    assert!(matches!(result, Err(AppError::Forbidden(_))));

    let granted = service(
        policies,
        HashMap::from([("alice".to_owned(), vec![Permission::SubmissionsRead])]),
    );
    let result = granted
        .require_action(
            &admin(),
            Surface::Admin,
            Resource::Submission,
            CrudAction::List,
        )
        .await;
    assert!(result.is_ok());
}

#[tokio::test]
async fn public_extra_permission_rejects_anonymous_callers() {
    let policies = EndpointPolicies::defaults()
        .with_extra_permission(
            Surface::Public,
            Resource::Submission,
            CrudAction::Create,
            Permission::SubmissionsCreate,
        )
        .unwrap_or_else(|_| unreachable!());
    let service = service(
        policies,
        HashMap::from([("bob".to_owned(), vec![Permission::SubmissionsCreate])]),
    );

    let anonymous = service
        .require_action(
            &UserIdentity::anonymous(),
            Surface::Public,
            Resource::Submission,
            CrudAction::Create,
        )
        .await;
    assert!(matches!(anonymous, Err(AppError::Forbidden(_))));

    let granted = service
        .require_action(
            &member(),
            Surface::Public,
            Resource::Submission,
            CrudAction::Create,
        )
        .await;
    assert!(granted.is_ok());
}
