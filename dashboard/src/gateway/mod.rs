//! The interface to the remote record storage
//!
//! The primary entry point to this module is the function [get_gateway_from_env], which returns an
//! object implementing the [RecordGateway] trait. It provides a CRUD interface for each of the
//! five entity collections; the collection is selected by the field type
//! ([kursverwaltung_api_types::RecordFields]) of the records, e.g.
//! `gateway.list::<KursFields>()`.
//!
//! The primary implementation ([living_apps::LivingAppsGateway]) talks to the LivingApps REST API
//! via HTTP. There is also a mock implementation for unittests.
//!
//! Gateways never retry failed requests. Errors are handed to the caller, which must keep its
//! previous state intact.

use crate::cli_error::CliError;
use crate::setup;
use kursverwaltung_api_types::{Record, RecordFields};

#[cfg(test)]
pub mod gateway_mock;
pub mod living_apps;

/// Get a [RecordGateway] instance, talking to the LivingApps REST API at the URL given by the
/// "LIVING_APPS_URL" environment variable (or the public default instance).
pub fn get_gateway_from_env() -> Result<living_apps::LivingAppsGateway, CliError> {
    let base_url = setup::get_api_base_url_from_env()?;
    let timeout = setup::get_request_timeout_from_env()?;
    living_apps::LivingAppsGateway::new(base_url, timeout)
        .map_err(|e| CliError::UnexpectedGatewayError(e.to_string()))
}

#[allow(async_fn_in_trait)]
pub trait RecordGateway {
    /// Get the full current snapshot of the collection.
    ///
    /// The order of the records is defined by the backing store and may change between calls.
    async fn list<F: RecordFields>(&self) -> Result<Vec<Record<F>>, GatewayError>;

    /// Get a single record of the collection
    async fn get<F: RecordFields>(&self, record_id: &str) -> Result<Record<F>, GatewayError>;

    /// Create a new record and return it, including its assigned id and timestamps
    async fn create<F: RecordFields>(&self, fields: F) -> Result<Record<F>, GatewayError>;

    /// Merge the given fields into the existing record.
    ///
    /// Only fields which are present (`Some`) in `fields` are changed; all other fields of the
    /// record are left untouched. Returns the updated record.
    async fn update<F: RecordFields>(
        &self,
        record_id: &str,
        fields: F,
    ) -> Result<Record<F>, GatewayError>;

    /// Delete the record.
    ///
    /// References to this record in other records are neither removed nor checked. They become
    /// dangling references.
    async fn delete<F: RecordFields>(&self, record_id: &str) -> Result<(), GatewayError>;
}

#[derive(Debug)]
pub enum GatewayError {
    /// The record storage could not be reached or the request failed in transport. See string
    /// description for details.
    ConnectionError(String),
    /// The record storage answered with an unexpected HTTP status
    UnexpectedStatus { status: u16, url: String },
    /// The requested record does not exist
    NotExisting,
    /// The response of the record storage could not be deserialized. See string description for
    /// details.
    InvalidResponse(String),
}

impl From<reqwest::Error> for GatewayError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_decode() {
            Self::InvalidResponse(error.to_string())
        } else if let Some(status) = error.status() {
            if status == reqwest::StatusCode::NOT_FOUND {
                Self::NotExisting
            } else {
                Self::UnexpectedStatus {
                    status: status.as_u16(),
                    url: error.url().map(|u| u.to_string()).unwrap_or_default(),
                }
            }
        } else {
            Self::ConnectionError(error.to_string())
        }
    }
}

impl From<serde_json::Error> for GatewayError {
    fn from(error: serde_json::Error) -> Self {
        Self::InvalidResponse(error.to_string())
    }
}

impl std::fmt::Display for GatewayError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ConnectionError(e) => write!(f, "Error connecting to record storage: {}", e),
            Self::UnexpectedStatus { status, url } => write!(
                f,
                "Record storage answered with unexpected HTTP status {} for <{}>",
                status, url
            ),
            Self::NotExisting => f.write_str("Record does not exist."),
            Self::InvalidResponse(e) => {
                write!(f, "Response of record storage could not be deserialized: {}", e)
            }
        }
    }
}

impl std::error::Error for GatewayError {}
