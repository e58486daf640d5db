use serde::{Deserialize, Serialize};

use crate::models::{Author, ViewerId};

/// The authenticated user performing interactions
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Viewer {
    pub handle: ViewerId,
    pub username: String,
    #[serde(default)]
    pub avatar: String,
}

impl Viewer {
    pub fn new(handle: impl Into<String>, username: impl Into<String>) -> Self {
        Self {
            handle: handle.into(),
            username: username.into(),
            avatar: String::new(),
        }
    }

    pub fn with_avatar(mut self, avatar: impl Into<String>) -> Self {
        self.avatar = avatar.into();
        self
    }

    /// A viewer with an empty handle cannot perform mutating operations
    pub fn is_signed_in(&self) -> bool {
        !self.handle.trim().is_empty()
    }

    /// Author record used when synthesizing local content for this viewer
    pub fn as_author(&self) -> Author {
        Author {
            username: self.username.clone(),
            handle: self.handle.clone(),
            avatar: self.avatar.clone(),
        }
    }
}
