use crate::record_ref::DEFAULT_BASE_URL;
use std::env;
use std::env::VarError;
use std::fmt::{Display, Formatter};
use std::time::Duration;
use url::Url;

const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Get the base URL of the LivingApps REST API from the environment variable, falling back to the
/// public LivingApps instance.
pub fn get_api_base_url_from_env() -> Result<Url, SetupError> {
    let value = optional_env_var("LIVING_APPS_URL")?;
    let value = value.as_deref().unwrap_or(DEFAULT_BASE_URL);
    let url = Url::parse(value).map_err(|_| SetupError::EnvVariableInvalid {
        variable_name: "LIVING_APPS_URL",
        problem: "Not a valid URL",
    })?;
    if url.cannot_be_a_base() || !matches!(url.scheme(), "http" | "https") {
        return Err(SetupError::EnvVariableInvalid {
            variable_name: "LIVING_APPS_URL",
            problem: "Not an http(s) base URL",
        });
    }
    Ok(url)
}

/// Get the timeout for a single HTTP request to the record storage (in seconds) from the
/// environment variable
pub fn get_request_timeout_from_env() -> Result<Duration, SetupError> {
    match optional_env_var("LIVING_APPS_TIMEOUT")? {
        None => Ok(DEFAULT_REQUEST_TIMEOUT),
        Some(v) => v
            .parse::<u64>()
            .ok()
            .filter(|seconds| *seconds > 0)
            .map(Duration::from_secs)
            .ok_or(SetupError::EnvVariableInvalid {
                variable_name: "LIVING_APPS_TIMEOUT",
                problem: "Not a positive number of seconds",
            }),
    }
}

fn optional_env_var(variable_name: &'static str) -> Result<Option<String>, SetupError> {
    match env::var(variable_name) {
        Ok(v) if v.is_empty() => Ok(None),
        Ok(v) => Ok(Some(v)),
        Err(VarError::NotPresent) => Ok(None),
        Err(e) => Err(SetupError::from_env_error(e, variable_name)),
    }
}

#[derive(Debug)]
pub enum SetupError {
    EnvVariableMissing {
        variable_name: &'static str,
    },
    EnvVariableInvalid {
        variable_name: &'static str,
        problem: &'static str,
    },
}

impl SetupError {
    fn from_env_error(error: VarError, variable_name: &'static str) -> Self {
        match error {
            VarError::NotPresent => Self::EnvVariableMissing { variable_name },
            VarError::NotUnicode(_) => Self::EnvVariableInvalid {
                variable_name,
                problem: "no valid unicode",
            },
        }
    }
}

impl Display for SetupError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            SetupError::EnvVariableMissing { variable_name } => {
                write!(f, "Environment variable {} must be defined", variable_name)
            }
            SetupError::EnvVariableInvalid {
                variable_name,
                problem,
            } => write!(
                f,
                "Value of environment variable {} is invalid: {}",
                variable_name, problem
            ),
        }
    }
}
