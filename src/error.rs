use thiserror::Error;

/// Input rejected by the fee engine or by the intake checks around it.
///
/// These never carry a partial result: either a breakdown is produced in full
/// or one of these is returned.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Asset value must not be negative (got {0}).")]
    NegativeAssetValue(String),
    #[error("Asset value '{0}' is not a number.")]
    InvalidAssetValue(String),
    #[error("Select at least one service.")]
    EmptySelection,
    #[error("Service count must be at least 1.")]
    ZeroServiceCount,
    #[error("Regulation rate '{name}' must be a non-negative decimal (got {value}).")]
    InvalidRate { name: &'static str, value: String },
    #[error("Invalid client data: {0}")]
    InvalidClient(String),
}

#[derive(Clone)]
pub struct AppError {
    exit_code: u8,
    message: String,
}

impl AppError {
    pub fn new(exit_code: u8, message: impl Into<String>) -> Self {
        Self {
            exit_code,
            message: message.into(),
        }
    }

    /// Persistence failure (exit code 3).
    pub fn store(message: impl Into<String>) -> Self {
        Self::new(3, message)
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<ValidationError> for AppError {
    fn from(err: ValidationError) -> Self {
        AppError::new(2, err.to_string())
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("exit_code", &self.exit_code)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}
