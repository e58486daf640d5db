use std::collections::VecDeque;
use std::sync::Mutex;

use crate::api::ApiError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Success,
    Warning,
    Error,
}

/// Transient user-facing notification, the out-of-band channel through which
/// failures reach the view
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Success,
            message: message.into(),
        }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Warning,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            message: message.into(),
        }
    }
}

pub trait NoticeSink: Send + Sync {
    fn notify(&self, notice: Notice);
}

/// In-memory notice queue drained by the view
#[derive(Debug, Default)]
pub struct NoticeQueue {
    notices: Mutex<VecDeque<Notice>>,
}

impl NoticeQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn drain(&self) -> Vec<Notice> {
        self.lock().drain(..).collect()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, VecDeque<Notice>> {
        self.notices.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl NoticeSink for NoticeQueue {
    fn notify(&self, notice: Notice) {
        log::debug!("notice {:?}: {}", notice.level, notice.message);
        self.lock().push_back(notice);
    }
}

/// Turn an API failure into a message fit for a toast
pub fn categorize_error(error: &ApiError) -> String {
    match error {
        ApiError::Network(_) => {
            "Network Error: Connection failed. Check your network and try again".to_string()
        }
        ApiError::Unauthorized(_) => {
            "Authorization Error: Session expired. Please sign in again".to_string()
        }
        ApiError::BadRequest(msg) => format!("Validation Error: {}", msg),
        ApiError::NotFound(_) => "Not Found: The item no longer exists".to_string(),
        ApiError::Envelope { message, .. } => format!("Request Failed: {}", message),
        ApiError::Serialization(_) => {
            "Server Error: Unexpected response from the server".to_string()
        }
        ApiError::Api(msg) => {
            let lower = msg.to_lowercase();
            if lower.contains("500") || lower.contains("502") || lower.contains("503") {
                "Server Error: The server is experiencing issues. Please try again later"
                    .to_string()
            } else {
                format!("Error: {}", msg)
            }
        }
    }
}
