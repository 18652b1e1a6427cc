use crate::dashboard::DashboardError;
use crate::gateway::GatewayError;
use crate::setup::SetupError;
use crate::validation::ValidationError;

#[derive(Debug)]
pub enum CliError {
    /// The application setup (environment variables) are not complete or invalid
    SetupError(String),
    /// Could not reach the record storage
    GatewayUnavailable(String),
    /// The record storage answered, but not in the expected way
    UnexpectedGatewayError(String),
    /// Could not complete command because the provided data (e.g. user input) is not valid
    DataError(String),
    /// Failure of a local I/O operation, e.g. setting up the async runtime
    IoError(std::io::Error),
}

impl CliError {
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::SetupError(_) => 1,
            CliError::DataError(_) => 1,
            CliError::IoError(_) => 3,
            CliError::UnexpectedGatewayError(_) => 2,
            CliError::GatewayUnavailable(_) => 4,
        }
    }
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CliError::SetupError(e) => {
                write!(f, "Setup invalid: {}", e)
            }
            CliError::GatewayUnavailable(e) => {
                write!(f, "Could not reach record storage: {}", e)
            }
            CliError::UnexpectedGatewayError(e) => {
                write!(f, "Unexpected error in record storage: {}", e)
            }
            CliError::DataError(e) => {
                write!(f, "Provided data is invalid: {}", e)
            }
            CliError::IoError(e) => write!(f, "I/O error: {}", e),
        }
    }
}

impl From<GatewayError> for CliError {
    fn from(e: GatewayError) -> Self {
        match e {
            GatewayError::ConnectionError(e) => Self::GatewayUnavailable(e),
            GatewayError::NotExisting => Self::DataError("Item not existing".to_string()),
            e @ GatewayError::UnexpectedStatus { .. } => {
                Self::UnexpectedGatewayError(e.to_string())
            }
            GatewayError::InvalidResponse(e) => Self::UnexpectedGatewayError(e),
        }
    }
}

impl From<ValidationError> for CliError {
    fn from(value: ValidationError) -> Self {
        Self::DataError(value.to_string())
    }
}

impl From<DashboardError> for CliError {
    fn from(e: DashboardError) -> Self {
        match e {
            DashboardError::Gateway(e) => e.into(),
            DashboardError::InvalidData(e) => e.into(),
            DashboardError::UnknownRecord => Self::DataError("Item not existing".to_string()),
            e @ (DashboardError::NoOpenDialog | DashboardError::FormKindMismatch { .. }) => {
                Self::DataError(e.to_string())
            }
        }
    }
}

impl From<SetupError> for CliError {
    fn from(value: SetupError) -> Self {
        Self::SetupError(value.to_string())
    }
}

impl From<std::io::Error> for CliError {
    fn from(value: std::io::Error) -> Self {
        Self::IoError(value)
    }
}
