use reqwest::StatusCode;
use thiserror::Error;

/// Failure talking to the processing service.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Non-2xx answer. `detail` is the service's own explanation, when it sent one.
    #[error("service responded with {status}")]
    Status {
        status: StatusCode,
        detail: Option<String>,
    },
    #[error(transparent)]
    Transport(#[from] reqwest::Error),
    #[error("invalid service URL: {0}")]
    InvalidUrl(String),
}

impl ServiceError {
    pub fn detail(&self) -> Option<&str> {
        match self {
            ServiceError::Status { detail, .. } => detail.as_deref(),
            _ => None,
        }
    }
}

/// Translate a service failure into the one line shown to the user:
/// the server's detail, else the transport message, else `fallback`.
pub fn user_message(err: &ServiceError, fallback: &str) -> String {
    if let Some(detail) = err.detail().map(str::trim).filter(|d| !d.is_empty()) {
        return detail.to_string();
    }
    let message = err.to_string();
    if message.trim().is_empty() {
        fallback.to_string()
    } else {
        message
    }
}

#[derive(Debug, Error)]
pub enum WorkflowError {
    #[error("unsupported file type '{mime}': choose an image or a PDF")]
    UnsupportedMediaType { mime: String },
    #[error("there is no text or description to export")]
    NoContentAvailable,
    #[error("{message}")]
    UploadFailed {
        message: String,
        detail: Option<String>,
    },
    #[error("{message}")]
    ProcessingFailed {
        message: String,
        detail: Option<String>,
    },
    #[error("{message}")]
    ExportFailed {
        message: String,
        detail: Option<String>,
    },
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl WorkflowError {
    pub fn upload(err: &ServiceError) -> Self {
        WorkflowError::UploadFailed {
            message: user_message(err, "upload failed"),
            detail: err.detail().map(str::to_string),
        }
    }

    pub fn processing(err: &ServiceError) -> Self {
        WorkflowError::ProcessingFailed {
            message: user_message(err, "processing failed"),
            detail: err.detail().map(str::to_string),
        }
    }

    pub fn export(err: &ServiceError) -> Self {
        WorkflowError::ExportFailed {
            message: user_message(err, "export failed"),
            detail: err.detail().map(str::to_string),
        }
    }

    /// Local precondition failures never touch the network or the session.
    pub fn is_local(&self) -> bool {
        matches!(
            self,
            WorkflowError::UnsupportedMediaType { .. } | WorkflowError::NoContentAvailable
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detail_wins_over_status_text() {
        let err = ServiceError::Status {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            detail: Some("OCR engine unavailable".into()),
        };
        assert_eq!(user_message(&err, "processing failed"), "OCR engine unavailable");

        let wrapped = WorkflowError::processing(&err);
        assert_eq!(wrapped.to_string(), "OCR engine unavailable");
        assert!(!wrapped.is_local());
    }

    #[test]
    fn blank_detail_falls_through_to_transport_message() {
        let err = ServiceError::Status {
            status: StatusCode::BAD_REQUEST,
            detail: Some("   ".into()),
        };
        assert_eq!(
            user_message(&err, "upload failed"),
            "service responded with 400 Bad Request"
        );
    }

    #[test]
    fn status_without_detail_reports_the_status() {
        let err = ServiceError::Status {
            status: StatusCode::BAD_GATEWAY,
            detail: None,
        };
        match WorkflowError::upload(&err) {
            WorkflowError::UploadFailed { message, detail } => {
                assert!(message.contains("502"));
                assert!(detail.is_none());
            }
            other => panic!("unexpected {other:?}"),
        }
    }
}
