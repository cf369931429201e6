use std::env;
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;

use dynaform_application::{EndpointPolicies, MIN_API_TOKEN_LENGTH};
use dynaform_core::{AppError, AppResult};
use dynaform_domain::{CrudAction, Permission, Resource, Surface};
use tracing_subscriber::EnvFilter;

/// Prefix of the per-endpoint policy overrides.
const POLICY_ENV_PREFIX: &str = "DYNAFORM";

/// Runtime configuration read once at startup.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub migrate_only: bool,
    pub database_url: String,
    pub database_max_connections: u32,
    pub frontend_url: String,
    pub api_host: String,
    pub api_port: u16,
    pub bootstrap_admin_token: Option<String>,
    pub endpoint_policies: EndpointPolicies,
}

impl ApiConfig {
    pub fn load() -> AppResult<Self> {
        let migrate_only = env::args().nth(1).as_deref() == Some("migrate");

        let database_url = required_env("DATABASE_URL")?;
        let database_max_connections = env::var("DATABASE_MAX_CONNECTIONS")
            .ok()
            .map(|value| {
                value.parse::<u32>().map_err(|error| {
                    AppError::Validation(format!("invalid DATABASE_MAX_CONNECTIONS: {error}"))
                })
            })
            .transpose()?
            .unwrap_or(10);
        let frontend_url =
            env::var("FRONTEND_URL").unwrap_or_else(|_| "http://localhost:3000".to_owned());

        let api_host = env::var("API_HOST").unwrap_or_else(|_| "127.0.0.1".to_owned());
        let api_port = env::var("API_PORT")
            .ok()
            .and_then(|value| value.parse::<u16>().ok())
            .unwrap_or(3001);

        let bootstrap_admin_token = env::var("BOOTSTRAP_ADMIN_TOKEN")
            .ok()
            .map(|value| value.trim().to_owned())
            .filter(|value| !value.is_empty());
        if let Some(token) = &bootstrap_admin_token
            && token.chars().count() < MIN_API_TOKEN_LENGTH
        {
            return Err(AppError::Validation(format!(
                "BOOTSTRAP_ADMIN_TOKEN must be at least {MIN_API_TOKEN_LENGTH} characters"
            )));
        }

        let endpoint_policies = endpoint_policies_from(|name| env::var(name).ok())?;

        Ok(Self {
            migrate_only,
            database_url,
            database_max_connections,
            frontend_url,
            api_host,
            api_port,
            bootstrap_admin_token,
            endpoint_policies,
        })
    }

    pub fn socket_address(&self) -> AppResult<SocketAddr> {
        let host = IpAddr::from_str(&self.api_host).map_err(|error| {
            AppError::Internal(format!("invalid API_HOST '{}': {error}", self.api_host))
        })?;
        Ok(SocketAddr::from((host, self.api_port)))
    }
}

/// Builds the endpoint policy table from `DYNAFORM_<SURFACE>_<RESOURCE>_<ACTION>_ENABLED`
/// and `..._PERMISSION` variables. Unset variables keep the defaults.
pub fn endpoint_policies_from(
    lookup: impl Fn(&str) -> Option<String>,
) -> AppResult<EndpointPolicies> {
    let mut policies = EndpointPolicies::defaults();

    for surface in Surface::all() {
        for resource in Resource::all() {
            for action in CrudAction::all() {
                let prefix = policy_env_prefix(*surface, *resource, *action);

                let enabled_name = format!("{prefix}_ENABLED");
                if let Some(value) = lookup(&enabled_name) {
                    let enabled = parse_flag(&enabled_name, &value)?;
                    policies.set_enabled(*surface, *resource, *action, enabled)?;
                }

                let permission_name = format!("{prefix}_PERMISSION");
                if let Some(value) = lookup(&permission_name) {
                    let value = value.trim();
                    let permission = if value.is_empty() {
                        None
                    } else {
                        Some(Permission::from_str(value).map_err(|error| {
                            AppError::Validation(format!("invalid {permission_name}: {error}"))
                        })?)
                    };
                    policies.set_extra_permission(*surface, *resource, *action, permission)?;
                }
            }
        }
    }

    Ok(policies)
}

fn policy_env_prefix(surface: Surface, resource: Resource, action: CrudAction) -> String {
    format!(
        "{POLICY_ENV_PREFIX}_{}_{}_{}",
        surface.as_str(),
        resource.as_str(),
        action.as_str()
    )
    .to_ascii_uppercase()
}

fn parse_flag(name: &str, value: &str) -> AppResult<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" => Ok(false),
        other => Err(AppError::Validation(format!(
            "{name} must be true or false, got '{other}'"
        ))),
    }
}

pub fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .compact()
        .init();
}

fn required_env(name: &str) -> AppResult<String> {
    let value =
        env::var(name).map_err(|_| AppError::Validation(format!("{name} is required")))?;
    if value.trim().is_empty() {
        return Err(AppError::Validation(format!("{name} must not be empty")));
    }

    Ok(value)
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use dynaform_application::ActionPolicy;
    use dynaform_core::AppError;
    use dynaform_domain::{CrudAction, Permission, Resource, Surface};

    use super::endpoint_policies_from;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let values: HashMap<String, String> = pairs
            .iter()
            .map(|(name, value)| ((*name).to_owned(), (*value).to_owned()))
            .collect();
        move |name| values.get(name).cloned()
    }

    #[test]
    fn no_overrides_keeps_every_supported_action_enabled() {
        let policies = endpoint_policies_from(lookup_from(&[])).unwrap_or_else(|_| unreachable!());

        assert_eq!(
            policies.policy(Surface::Public, Resource::Submission, CrudAction::Create),
            Some(ActionPolicy {
                enabled: true,
                extra_permission: None,
            })
        );
        assert_eq!(
            policies.policy(Surface::Public, Resource::Form, CrudAction::Create),
            None
        );
    }

    #[test]
    fn overrides_disable_actions_and_attach_permissions() {
        let policies = endpoint_policies_from(lookup_from(&[
            ("DYNAFORM_ADMIN_FIELD_LIST_ENABLED", "false"),
            (
                "DYNAFORM_ADMIN_SUBMISSION_LIST_PERMISSION",
                "submissions.read",
            ),
        ]))
        .unwrap_or_else(|_| unreachable!());

        assert_eq!(
            policies
                .policy(Surface::Admin, Resource::Field, CrudAction::List)
                .map(|policy| policy.enabled),
            Some(false)
        );
        assert_eq!(
            policies
                .policy(Surface::Admin, Resource::Submission, CrudAction::List)
                .and_then(|policy| policy.extra_permission),
            Some(Permission::SubmissionsRead)
        );
    }

    #[test]
    fn enabling_submission_delete_is_rejected() {
        let result = endpoint_policies_from(lookup_from(&[(
            "DYNAFORM_ADMIN_SUBMISSION_DELETE_ENABLED",
            "true",
        )]));

        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[test]
    fn malformed_values_are_rejected() {
        let flag = endpoint_policies_from(lookup_from(&[(
            "DYNAFORM_PUBLIC_FORM_LIST_ENABLED",
            "maybe",
        )]));
        assert!(matches!(flag, Err(AppError::Validation(_))));

        let permission = endpoint_policies_from(lookup_from(&[(
            "DYNAFORM_PUBLIC_FORM_LIST_PERMISSION",
            "forms.everything",
        )]));
        assert!(matches!(permission, Err(AppError::Validation(_))));
    }
}
