//! Unified error handling system
//!
//! Provides structured error types with context, recovery suggestions, and proper error chaining

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{error, warn};

pub type AdminResult<T> = Result<T, AdminError>;

/// Error context providing additional information for debugging and recovery
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorContext {
    /// Unique error ID for tracking
    pub error_id: String,
    /// Timestamp when error occurred
    pub timestamp: DateTime<Utc>,
    /// Component where error originated
    pub component: String,
    /// Operation being performed when error occurred
    pub operation: Option<String>,
    /// Additional metadata
    pub metadata: std::collections::HashMap<String, String>,
    /// Recovery suggestions
    pub recovery_suggestions: Vec<String>,
}

impl ErrorContext {
    pub fn new(component: &str) -> Self {
        Self {
            error_id: uuid::Uuid::new_v4().to_string(),
            timestamp: Utc::now(),
            component: component.to_string(),
            operation: None,
            metadata: std::collections::HashMap::new(),
            recovery_suggestions: Vec::new(),
        }
    }

    pub fn with_operation(mut self, operation: &str) -> Self {
        self.operation = Some(operation.to_string());
        self
    }

    pub fn with_metadata(mut self, key: &str, value: &str) -> Self {
        self.metadata.insert(key.to_string(), value.to_string());
        self
    }

    pub fn with_suggestion(mut self, suggestion: &str) -> Self {
        self.recovery_suggestions.push(suggestion.to_string());
        self
    }
}

/// Main error type for the Matchdesk client
#[derive(Error, Debug)]
pub enum AdminError {
    #[error("Network error: {message}")]
    Network {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
        context: ErrorContext,
    },

    #[error("HTTP {status} error: {body}")]
    Http {
        status: u16,
        body: String,
        context: ErrorContext,
    },

    #[error("Authentication error: {message}")]
    Authentication {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
        context: ErrorContext,
    },

    #[error("Validation error: {message}")]
    Validation {
        message: String,
        field: Option<String>,
        context: ErrorContext,
    },

    #[error("Configuration error: {message}")]
    Config {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
        context: ErrorContext,
    },

    #[error("Storage error: {message}")]
    Storage {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
        context: ErrorContext,
    },

    #[error("Resource not found: {resource}")]
    NotFound {
        resource: String,
        context: ErrorContext,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Internal error: {message}")]
    Internal {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
        context: ErrorContext,
    },
}

impl AdminError {
    /// Get the error context
    pub fn context(&self) -> Option<&ErrorContext> {
        match self {
            AdminError::Network { context, .. } => Some(context),
            AdminError::Http { context, .. } => Some(context),
            AdminError::Authentication { context, .. } => Some(context),
            AdminError::Validation { context, .. } => Some(context),
            AdminError::Config { context, .. } => Some(context),
            AdminError::Storage { context, .. } => Some(context),
            AdminError::NotFound { context, .. } => Some(context),
            AdminError::Internal { context, .. } => Some(context),
            _ => None,
        }
    }

    /// HTTP status carried by the error, if the server responded at all
    pub fn status(&self) -> Option<u16> {
        match self {
            AdminError::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Whether the error should terminate the current session (401/403 or
    /// an explicit authentication failure)
    pub fn is_auth_error(&self) -> bool {
        match self {
            AdminError::Authentication { .. } => true,
            AdminError::Http { status, .. } => *status == 401 || *status == 403,
            _ => false,
        }
    }

    /// Check if error is recoverable
    pub fn is_recoverable(&self) -> bool {
        match self {
            AdminError::Network { .. } => true,
            AdminError::Http { status, .. } => *status >= 500,
            AdminError::Authentication { .. } => false,
            AdminError::Config { .. } => false,
            AdminError::Validation { .. } => false,
            AdminError::NotFound { .. } => false,
            _ => false,
        }
    }

    /// Log the error with appropriate level
    pub fn log(&self) {
        match self {
            AdminError::Internal { .. } => {
                error!(
                    error_id = ?self.context().map(|c| &c.error_id),
                    error = %self,
                    "Internal error occurred"
                );
            }
            AdminError::Config { .. } | AdminError::Validation { .. } => {
                error!(
                    error_id = ?self.context().map(|c| &c.error_id),
                    error = %self,
                    "Configuration or validation error"
                );
            }
            AdminError::Network { .. } => {
                warn!(
                    error_id = ?self.context().map(|c| &c.error_id),
                    error = %self,
                    "Network error (may be recoverable)"
                );
            }
            AdminError::Authentication { .. } => {
                warn!(
                    error_id = ?self.context().map(|c| &c.error_id),
                    error = %self,
                    "Authentication failure"
                );
            }
            _ => {
                error!(
                    error_id = ?self.context().map(|c| &c.error_id),
                    error = %self,
                    "Error occurred"
                );
            }
        }
    }
}

/// Convenience macros for creating errors with context
#[macro_export]
macro_rules! network_error {
    ($msg:expr, $component:expr) => {
        AdminError::Network {
            message: $msg.to_string(),
            source: None,
            context: ErrorContext::new($component),
        }
    };
    ($msg:expr, $component:expr, $source:expr) => {
        AdminError::Network {
            message: $msg.to_string(),
            source: Some(Box::new($source)),
            context: ErrorContext::new($component),
        }
    };
}

#[macro_export]
macro_rules! config_error {
    ($msg:expr, $component:expr) => {
        AdminError::Config {
            message: $msg.to_string(),
            source: None,
            context: ErrorContext::new($component)
                .with_suggestion("Check your configuration file"),
        }
    };
}

#[macro_export]
macro_rules! validation_error {
    ($msg:expr, $field:expr, $component:expr) => {
        AdminError::Validation {
            message: $msg.to_string(),
            field: Some($field.to_string()),
            context: ErrorContext::new($component)
                .with_suggestion("Check the field value and format"),
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_error_status() {
        let err = AdminError::Http {
            status: 404,
            body: "not found".to_string(),
            context: ErrorContext::new("test"),
        };
        assert_eq!(err.status(), Some(404));
        assert!(!err.is_auth_error());
        assert!(!err.is_recoverable());
    }

    #[test]
    fn test_auth_classification() {
        for status in [401, 403] {
            let err = AdminError::Http {
                status,
                body: String::new(),
                context: ErrorContext::new("test"),
            };
            assert!(err.is_auth_error());
        }

        let err = AdminError::Authentication {
            message: "session expired".to_string(),
            source: None,
            context: ErrorContext::new("test"),
        };
        assert!(err.is_auth_error());
        assert_eq!(err.status(), None);
    }

    #[test]
    fn test_error_context_builder() {
        let context = ErrorContext::new("http_client")
            .with_operation("send")
            .with_metadata("path", "/user/me")
            .with_suggestion("Check network connectivity");

        assert_eq!(context.component, "http_client");
        assert_eq!(context.operation.as_deref(), Some("send"));
        assert_eq!(context.metadata.get("path").map(String::as_str), Some("/user/me"));
        assert_eq!(context.recovery_suggestions.len(), 1);
    }

    #[test]
    fn test_server_errors_recoverable() {
        let err = AdminError::Http {
            status: 503,
            body: "unavailable".to_string(),
            context: ErrorContext::new("test"),
        };
        assert!(err.is_recoverable());
    }
}
