use thiserror::Error;

#[derive(Error, Debug)]
pub enum ClientError {
    /// 後端回傳非 2xx 狀態；訊息取自回應的 `error` 欄位或固定的預設訊息
    #[error("{message}")]
    ServerError {
        status: u16,
        message: String,
        details: Option<String>,
    },

    #[error("API request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Missing configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Invalid value for {field}: '{value}' ({reason})")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Server,
    Network,
    Io,
    Data,
    Configuration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl ClientError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            ClientError::ServerError { .. } => ErrorCategory::Server,
            ClientError::ApiError(_) => ErrorCategory::Network,
            ClientError::IoError(_) => ErrorCategory::Io,
            ClientError::SerializationError(_) => ErrorCategory::Data,
            ClientError::ConfigError { .. }
            | ClientError::MissingConfigError { .. }
            | ClientError::InvalidConfigValueError { .. } => ErrorCategory::Configuration,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            // 4xx 多半是輸入問題，5xx 或連線失敗可以稍後再試
            ClientError::ServerError { status, .. } if *status < 500 => ErrorSeverity::High,
            ClientError::ServerError { .. } => ErrorSeverity::Medium,
            ClientError::ApiError(_) => ErrorSeverity::Medium,
            ClientError::SerializationError(_) => ErrorSeverity::High,
            ClientError::IoError(_) => ErrorSeverity::High,
            ClientError::ConfigError { .. }
            | ClientError::MissingConfigError { .. }
            | ClientError::InvalidConfigValueError { .. } => ErrorSeverity::Critical,
        }
    }

    pub fn recovery_suggestion(&self) -> String {
        match self {
            ClientError::ServerError {
                details: Some(details),
                ..
            } => format!("Check the server log; it reported: {}", details),
            ClientError::ServerError { status, .. } if *status < 500 => {
                "Check the request input (audio file or message) and try again".to_string()
            }
            ClientError::ServerError { .. } => {
                "The server failed while processing the request; try again later".to_string()
            }
            ClientError::ApiError(e) if e.is_connect() => {
                "Make sure the backend is running and --base-url points to it".to_string()
            }
            ClientError::ApiError(_) => "Check the network connection and try again".to_string(),
            ClientError::IoError(_) => {
                "Check that the file exists and the path is readable/writable".to_string()
            }
            ClientError::SerializationError(_) => {
                "The server response was not valid JSON; check the backend version".to_string()
            }
            ClientError::ConfigError { .. } | ClientError::MissingConfigError { .. } => {
                "Review the configuration file and command-line flags".to_string()
            }
            ClientError::InvalidConfigValueError { field, .. } => {
                format!("Fix the value of '{}' and run again", field)
            }
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            ClientError::ServerError {
                status, message, ..
            } => format!("Server error ({}): {}", status, message),
            ClientError::ApiError(_) => "Could not reach the chat backend".to_string(),
            other => other.to_string(),
        }
    }

    /// 伺服器回報的 HTTP 狀態碼（僅限 ServerError）
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::ServerError { status, .. } => Some(*status),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, ClientError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_server_error_display_is_message_only() {
        let err = ClientError::ServerError {
            status: 400,
            message: "No audio file uploaded".to_string(),
            details: None,
        };
        assert_eq!(err.to_string(), "No audio file uploaded");
        assert_eq!(err.status(), Some(400));
        assert_eq!(err.category(), ErrorCategory::Server);
    }

    #[test]
    fn test_severity_by_status() {
        let client_side = ClientError::ServerError {
            status: 400,
            message: "bad".to_string(),
            details: None,
        };
        let server_side = ClientError::ServerError {
            status: 500,
            message: "boom".to_string(),
            details: Some("ffmpeg missing".to_string()),
        };
        assert_eq!(client_side.severity(), ErrorSeverity::High);
        assert_eq!(server_side.severity(), ErrorSeverity::Medium);
        assert!(server_side.recovery_suggestion().contains("ffmpeg missing"));
    }

    #[test]
    fn test_config_errors_are_critical() {
        let err = ClientError::MissingConfigError {
            field: "server.base_url".to_string(),
        };
        assert_eq!(err.severity(), ErrorSeverity::Critical);
        assert_eq!(err.category(), ErrorCategory::Configuration);
    }
}
