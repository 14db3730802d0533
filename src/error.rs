use serde::Serialize;
use thiserror::Error;
use tracing::error;

use crate::domain::models::payment::Payment;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("Resource not found: {0}")]
    NotFound(String),
    #[error("This account has been blocked. Please contact the administrator.")]
    Blocked,
    #[error("Invalid credentials")]
    InvalidCredentials,
    #[error("Account already exists: {0}")]
    DuplicateAccount(String),
    #[error("Password must be at least 8 characters and include uppercase, lowercase, a number and a special character.")]
    WeakPassword,
    #[error("Role mismatch: {0}")]
    RoleMismatch(String),
    #[error("Payment {} was rejected", .0.id)]
    VerificationRejected(Box<Payment>),
    #[error("Stored value under '{key}' is corrupt: {reason}")]
    StorageCorrupt { key: String, reason: String },
    #[error("Unauthorized")]
    Unauthorized,
    #[error("Forbidden: {0}")]
    Forbidden(String),
    #[error("Invalid input: {0}")]
    Validation(String),
    #[error("Internal error")]
    Internal,
    #[error("Internal error: {0}")]
    InternalWithMsg(String),
}

impl AppError {
    /// Text shown to the end user as-is. Infrastructure failures collapse to a
    /// generic message and are logged instead.
    pub fn user_message(&self) -> String {
        match self {
            AppError::Database(e) => {
                error!("Database error: {:?}", e);
                "Something went wrong. Please try again.".to_string()
            }
            AppError::Serialization(e) => {
                error!("Serialization error: {:?}", e);
                "Something went wrong. Please try again.".to_string()
            }
            AppError::StorageCorrupt { .. } | AppError::Internal => {
                "Something went wrong. Please try again.".to_string()
            }
            AppError::InternalWithMsg(msg) => {
                error!("Internal error: {}", msg);
                "Something went wrong. Please try again.".to_string()
            }
            AppError::NotFound(_) => "No account found with this identifier.".to_string(),
            AppError::InvalidCredentials => "Incorrect password. Please try again.".to_string(),
            AppError::DuplicateAccount(msg) => msg.clone(),
            AppError::RoleMismatch(msg) => msg.clone(),
            AppError::VerificationRejected(payment) => payment
                .rejection_reason
                .clone()
                .unwrap_or_else(|| "Payment verification failed.".to_string()),
            AppError::Unauthorized => "Please log in to continue.".to_string(),
            AppError::Forbidden(msg) => msg.clone(),
            AppError::Validation(msg) => msg.clone(),
            AppError::Blocked | AppError::WeakPassword => self.to_string(),
        }
    }
}

/// `{ success, message }` shape consumed by the presentation layer.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ActionResult {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl<T> From<Result<T, AppError>> for ActionResult {
    fn from(result: Result<T, AppError>) -> Self {
        match result {
            Ok(_) => ActionResult { success: true, message: None },
            Err(e) => ActionResult { success: false, message: Some(e.user_message()) },
        }
    }
}
