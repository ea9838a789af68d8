//! Result and error types for the core library

use std::collections::HashMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Core library error type
///
/// The account variants are the complete failure taxonomy of the account
/// model; callers can match them exhaustively.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid initial balance: {0}")]
    InvalidInitialBalance(String),

    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    #[error("Insufficient funds: cannot withdraw more than {balance}")]
    InsufficientFunds { balance: Decimal, requested: Decimal },

    #[error("Balance overflow: result exceeds the largest representable balance")]
    BalanceOverflow,

    #[error("Transfer failed: {0}")]
    TransferFailed(String),

    #[error("Synchronization failed: {0}")]
    SynchronizationFailed(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create an invalid amount error
    pub fn invalid_amount(msg: impl Into<String>) -> Self {
        Self::InvalidAmount(msg.into())
    }

    /// Create an invalid initial balance error
    pub fn invalid_initial_balance(msg: impl Into<String>) -> Self {
        Self::InvalidInitialBalance(msg.into())
    }

    /// Create a synchronization error
    pub fn sync_failed(msg: impl Into<String>) -> Self {
        Self::SynchronizationFailed(msg.into())
    }

    /// Stable tag for the error kind, used in the event log and JSON output
    pub fn kind(&self) -> &'static str {
        match self {
            Error::InvalidInitialBalance(_) => "invalid_initial_balance",
            Error::InvalidAmount(_) => "invalid_amount",
            Error::InsufficientFunds { .. } => "insufficient_funds",
            Error::BalanceOverflow => "balance_overflow",
            Error::TransferFailed(_) => "transfer_failed",
            Error::SynchronizationFailed(_) => "synchronization_failed",
            Error::Config(_) => "config",
            Error::Io(_) => "io",
            Error::Json(_) => "json",
            Error::Other(_) => "other",
        }
    }

    /// Message without balances, amounts or other user data
    pub fn summary(&self) -> &'static str {
        match self {
            Error::InvalidInitialBalance(_) => "initial balance is not a non-negative number",
            Error::InvalidAmount(_) => "amount is not a positive number",
            Error::InsufficientFunds { .. } => "insufficient funds",
            Error::BalanceOverflow => "balance would overflow",
            Error::TransferFailed(_) => "transfer failed",
            Error::SynchronizationFailed(_) => "synchronization failed",
            Error::Config(_) => "configuration error",
            Error::Io(_) => "io error",
            Error::Json(_) => "json error",
            Error::Other(_) => "unexpected error",
        }
    }

    /// Whether retrying the same call later can succeed
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Error::InsufficientFunds { .. } | Error::SynchronizationFailed(_)
        )
    }
}

/// Core library result type
pub type Result<T> = std::result::Result<T, Error>;

/// Operation result with optional context (for JSON output)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OperationResult<T> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<String>,
    pub context: Option<HashMap<String, serde_json::Value>>,
}

impl<T> OperationResult<T> {
    /// Create a successful result
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            context: None,
        }
    }

    /// Create a failed result
    pub fn fail(error: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error.into()),
            context: None,
        }
    }

    /// Create a failed result with context
    pub fn fail_with_context(
        error: impl Into<String>,
        context: HashMap<String, serde_json::Value>,
    ) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error.into()),
            context: Some(context),
        }
    }
}

impl<T> From<Result<T>> for OperationResult<T> {
    fn from(result: Result<T>) -> Self {
        match result {
            Ok(data) => Self::ok(data),
            Err(e) => {
                let mut context = HashMap::new();
                context.insert(
                    "kind".to_string(),
                    serde_json::Value::String(e.kind().to_string()),
                );
                Self::fail_with_context(e.to_string(), context)
            }
        }
    }
}
